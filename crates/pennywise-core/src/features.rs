//! Feature engineering
//!
//! Every model input is a row in one fixed 21-column schema:
//!
//! | columns | source |
//! |---|---|
//! | `month, quarter, day_of_week, is_weekend` | time features |
//! | `user_income, user_age` | user features |
//! | `risk_high, risk_low, risk_medium` | one-hot risk tolerance |
//! | `cat_business` .. `cat_utilities` | one-hot category (alphabetical) |
//! | `prev_month_spending, avg_3month_spending` | rolling history |
//!
//! Unknown categories and risk levels encode to all-zero one-hot groups.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{quarter_of, Category, Expense, RiskTolerance, TrainingRecord, UserProfile};

/// Risk one-hot columns, alphabetical
const RISK_COLUMNS: [RiskTolerance; 3] =
    [RiskTolerance::High, RiskTolerance::Low, RiskTolerance::Medium];

/// Category one-hot columns, alphabetical
const CATEGORY_COLUMNS: [Category; 10] = [
    Category::Business,
    Category::Education,
    Category::Entertainment,
    Category::Food,
    Category::Healthcare,
    Category::Other,
    Category::Shopping,
    Category::Transport,
    Category::Travel,
    Category::Utilities,
];

/// Number of preceding months averaged into `avg_3month_spending`
const HISTORY_WINDOW: usize = 3;

/// Column names of the feature matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub names: Vec<String>,
}

impl FeatureSchema {
    pub fn standard() -> Self {
        let mut names: Vec<String> = [
            "month",
            "quarter",
            "day_of_week",
            "is_weekend",
            "user_income",
            "user_age",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        names.extend(RISK_COLUMNS.iter().map(|r| format!("risk_{}", r.as_str())));
        names.extend(CATEGORY_COLUMNS.iter().map(|c| format!("cat_{}", c.as_str())));
        names.push("prev_month_spending".to_string());
        names.push("avg_3month_spending".to_string());
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}

/// Raw values for one row before encoding
struct RowInputs<'a> {
    month: u32,
    quarter: u32,
    day_of_week: u32,
    is_weekend: bool,
    income: f64,
    age: f64,
    risk: Option<RiskTolerance>,
    category: &'a str,
    prev_month_spending: f64,
    avg_3month_spending: f64,
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn encode(inputs: &RowInputs<'_>) -> Vec<f64> {
    let category = inputs.category.parse::<Category>().ok();

    let mut row = Vec::with_capacity(21);
    row.push(inputs.month as f64);
    row.push(inputs.quarter as f64);
    row.push(inputs.day_of_week as f64);
    row.push(flag(inputs.is_weekend));
    row.push(inputs.income);
    row.push(inputs.age);
    row.extend(RISK_COLUMNS.iter().map(|r| flag(inputs.risk == Some(*r))));
    row.extend(CATEGORY_COLUMNS.iter().map(|c| flag(category == Some(*c))));
    row.push(inputs.prev_month_spending);
    row.push(inputs.avg_3month_spending);
    row
}

/// Build the training matrix and target vector
///
/// History columns are computed per `(user_id, category)` in date order:
/// `prev_month_spending` is the previous record's amount and
/// `avg_3month_spending` the mean of the three preceding amounts (0 until three exist).
/// The current amount never feeds its own row. Rows keep input order.
pub fn prepare_features(records: &[TrainingRecord]) -> Result<(Array2<f64>, Vec<f64>)> {
    if records.is_empty() {
        return Err(Error::Training("no training records".into()));
    }

    let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (i, r) in records.iter().enumerate() {
        groups
            .entry((r.user_id.as_str(), r.category.as_str()))
            .or_default()
            .push(i);
    }

    let mut history = vec![(0.0, 0.0); records.len()];
    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| records[i].date);
        for (pos, &i) in indices.iter().enumerate() {
            let prev = if pos > 0 {
                records[indices[pos - 1]].amount
            } else {
                0.0
            };
            let avg = if pos >= HISTORY_WINDOW {
                indices[pos - HISTORY_WINDOW..pos]
                    .iter()
                    .map(|&j| records[j].amount)
                    .sum::<f64>()
                    / HISTORY_WINDOW as f64
            } else {
                0.0
            };
            history[i] = (prev, avg);
        }
    }

    let schema_len = FeatureSchema::standard().len();
    let mut flat = Vec::with_capacity(records.len() * schema_len);
    for (r, (prev, avg)) in records.iter().zip(history) {
        flat.extend(encode(&RowInputs {
            month: r.month(),
            quarter: r.quarter(),
            day_of_week: r.day_of_week(),
            is_weekend: r.is_weekend(),
            income: r.user_income,
            age: r.user_age,
            risk: r.user_risk_tolerance.parse().ok(),
            category: &r.category,
            prev_month_spending: prev,
            avg_3month_spending: avg,
        }));
    }

    let x = Array2::from_shape_vec((records.len(), schema_len), flat)
        .map_err(|e| Error::Training(format!("feature matrix shape: {}", e)))?;
    let y = records.iter().map(|r| r.amount).collect();

    Ok((x, y))
}

/// Feature row for a prediction request
///
/// Missing time fields come from `today`; the quarter follows the month.
pub fn profile_features(profile: &UserProfile, today: NaiveDate) -> Vec<f64> {
    let month = profile.month.unwrap_or_else(|| today.month());
    let day_of_week = profile
        .day_of_week
        .unwrap_or_else(|| today.weekday().num_days_from_monday());

    encode(&RowInputs {
        month,
        quarter: profile.quarter.unwrap_or_else(|| quarter_of(month)),
        day_of_week,
        is_weekend: day_of_week >= 5,
        income: profile.user_income.unwrap_or(UserProfile::DEFAULT_INCOME),
        age: profile.user_age.unwrap_or(UserProfile::DEFAULT_AGE),
        risk: profile.risk_tolerance(),
        category: profile.category_or_default(),
        prev_month_spending: profile.prev_month_spending.unwrap_or(0.0),
        avg_3month_spending: profile.avg_3month_spending.unwrap_or(0.0),
    })
}

/// Feature row for an observed expense
///
/// Time features come from the expense date, user features from the profile.
pub fn expense_features(expense: &Expense, profile: &UserProfile) -> Vec<f64> {
    let month = expense.date.month();
    let day_of_week = expense.date.weekday().num_days_from_monday();

    encode(&RowInputs {
        month,
        quarter: quarter_of(month),
        day_of_week,
        is_weekend: day_of_week >= 5,
        income: profile.user_income.unwrap_or(UserProfile::DEFAULT_INCOME),
        age: profile.user_age.unwrap_or(UserProfile::DEFAULT_AGE),
        risk: profile.risk_tolerance(),
        category: &expense.category,
        prev_month_spending: profile.prev_month_spending.unwrap_or(0.0),
        avg_3month_spending: profile.avg_3month_spending.unwrap_or(0.0),
    })
}

/// Standardizes each column to zero mean and unit variance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Learn column means and population standard deviations
    ///
    /// Constant columns get a scale of 1 so they transform to 0.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::Training("cannot fit scaler on empty matrix".into()))?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });
        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(Error::Model(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        Ok((x - &self.mean) / &self.scale)
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(Error::Model(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect())
    }
}
