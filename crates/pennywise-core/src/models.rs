//! Data models for Pennywise
//!
//! Inputs to the budget manager: expenses, user profiles and training records.
//! Dates arrive in several ISO-8601 shapes and are normalized to calendar dates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Spending categories, in canonical iteration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Utilities,
    Healthcare,
    Education,
    Travel,
    Business,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Utilities,
        Category::Healthcare,
        Category::Education,
        Category::Travel,
        Category::Business,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Healthcare => "healthcare",
            Category::Education => "education",
            Category::Travel => "travel",
            Category::Business => "business",
            Category::Other => "other",
        }
    }

    /// Typical monthly spend for a median-income user, before seasonality
    pub fn base_amount(&self) -> f64 {
        match self {
            Category::Food => 400.0,
            Category::Transport => 200.0,
            Category::Shopping => 300.0,
            Category::Entertainment => 150.0,
            Category::Utilities => 200.0,
            Category::Healthcare => 100.0,
            Category::Education => 50.0,
            Category::Travel => 100.0,
            Category::Business => 75.0,
            Category::Other => 100.0,
        }
    }

    /// Category names in canonical order
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

/// How much financial risk a user is comfortable with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    pub const ALL: [RiskTolerance; 3] =
        [RiskTolerance::Low, RiskTolerance::Medium, RiskTolerance::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTolerance::Low => "low",
            RiskTolerance::Medium => "medium",
            RiskTolerance::High => "high",
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskTolerance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskTolerance::Low),
            "medium" => Ok(RiskTolerance::Medium),
            "high" => Ok(RiskTolerance::High),
            _ => Err(format!("Unknown risk tolerance: {}", s)),
        }
    }
}

/// Parse a date from `YYYY-MM-DD`, a naive ISO datetime, or RFC 3339
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    Err(Error::InvalidData(format!("Invalid date: {}", s)))
}

fn de_flexible_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(serde::de::Error::custom)
}

/// User ids arrive as numbers from generated data and as strings from clients
fn de_user_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

fn de_opt_user_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "de_user_id")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

/// Quarter (1-4) for a month (1-12)
pub fn quarter_of(month: u32) -> u32 {
    (month.saturating_sub(1)) / 3 + 1
}

/// A single expense as submitted by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(deserialize_with = "de_flexible_date")]
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    #[serde(
        default,
        deserialize_with = "de_opt_user_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
}

impl Expense {
    pub fn new(date: NaiveDate, category: &str, amount: f64) -> Self {
        Self {
            date,
            category: category.to_string(),
            amount,
            user_id: None,
        }
    }
}

/// What the models know about a user when predicting
///
/// Every field is optional on the wire; the feature builder fills gaps with
/// defaults (income 5000, age 30, medium risk, current month, category `other`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_risk_tolerance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_month_spending: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_3month_spending: Option<f64>,
}

impl UserProfile {
    pub const DEFAULT_INCOME: f64 = 5000.0;
    pub const DEFAULT_AGE: f64 = 30.0;

    /// Copy of this profile targeting another category
    pub fn with_category(&self, category: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            ..self.clone()
        }
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("other")
    }

    /// Parsed risk tolerance; `None` when the value is not a known level
    pub fn risk_tolerance(&self) -> Option<RiskTolerance> {
        match &self.user_risk_tolerance {
            None => Some(RiskTolerance::Medium),
            Some(s) => s.parse().ok(),
        }
    }

    /// Reject values that cannot describe a calendar or a person
    pub fn validate(&self) -> Result<()> {
        if let Some(m) = self.month {
            if !(1..=12).contains(&m) {
                return Err(Error::InvalidData(format!("month must be 1-12, got {}", m)));
            }
        }
        if let Some(q) = self.quarter {
            if !(1..=4).contains(&q) {
                return Err(Error::InvalidData(format!("quarter must be 1-4, got {}", q)));
            }
        }
        if let Some(d) = self.day_of_week {
            if d > 6 {
                return Err(Error::InvalidData(format!(
                    "day_of_week must be 0-6, got {}",
                    d
                )));
            }
        }
        for (name, value) in [
            ("user_income", self.user_income),
            ("user_age", self.user_age),
            ("prev_month_spending", self.prev_month_spending),
            ("avg_3month_spending", self.avg_3month_spending),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(Error::InvalidData(format!("{} must be a finite number", name)));
                }
            }
        }
        Ok(())
    }
}

fn default_num_transactions() -> u32 {
    1
}

fn default_risk() -> String {
    RiskTolerance::Medium.as_str().to_string()
}

/// One month of one user's spending in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(deserialize_with = "de_user_id")]
    pub user_id: String,
    #[serde(deserialize_with = "de_flexible_date")]
    pub date: NaiveDate,
    pub category: String,
    pub amount: f64,
    #[serde(default = "default_num_transactions")]
    pub num_transactions: u32,
    pub user_income: f64,
    pub user_age: f64,
    #[serde(default = "default_risk")]
    pub user_risk_tolerance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_weekend: Option<bool>,
}

impl TrainingRecord {
    pub fn month(&self) -> u32 {
        self.month.unwrap_or_else(|| self.date.month())
    }

    pub fn quarter(&self) -> u32 {
        self.quarter.unwrap_or_else(|| quarter_of(self.month()))
    }

    /// Monday = 0
    pub fn day_of_week(&self) -> u32 {
        self.day_of_week
            .unwrap_or_else(|| self.date.weekday().num_days_from_monday())
    }

    pub fn is_weekend(&self) -> bool {
        self.is_weekend.unwrap_or_else(|| self.day_of_week() >= 5)
    }

    /// Reject values the feature pipeline cannot use
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("amount", self.amount),
            ("user_income", self.user_income),
            ("user_age", self.user_age),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidData(format!("{} must be a finite number", name)));
            }
        }
        if self.amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "amount must not be negative, got {}",
                self.amount
            )));
        }
        if let Some(m) = self.month {
            if !(1..=12).contains(&m) {
                return Err(Error::InvalidData(format!("month must be 1-12, got {}", m)));
            }
        }
        if let Some(q) = self.quarter {
            if !(1..=4).contains(&q) {
                return Err(Error::InvalidData(format!("quarter must be 1-4, got {}", q)));
            }
        }
        if let Some(d) = self.day_of_week {
            if d > 6 {
                return Err(Error::InvalidData(format!(
                    "day_of_week must be 0-6, got {}",
                    d
                )));
            }
        }
        Ok(())
    }
}

/// Current UTC date, the default "today" for time features
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_date("2025-01-15").unwrap(), expected);
        assert_eq!(parse_date("2025-01-15T10:30:00").unwrap(), expected);
        assert_eq!(parse_date("2025-01-15T10:30:00.123").unwrap(), expected);
        assert_eq!(parse_date("2025-01-15T10:30:00Z").unwrap(), expected);
        assert_eq!(parse_date("2025-01-15 08:00:00").unwrap(), expected);
        assert!(parse_date("15/01/2025").is_err());
    }

    #[test]
    fn test_training_record_validation() {
        let record: TrainingRecord = serde_json::from_str(
            r#"{"user_id": 1, "date": "2025-03-01", "category": "food", "amount": 310.5,
                "user_income": 4800, "user_age": 29}"#,
        )
        .unwrap();
        assert!(record.validate().is_ok());

        let mut bad = record.clone();
        bad.amount = f64::NAN;
        assert!(bad.validate().is_err());

        let mut bad = record.clone();
        bad.amount = -5.0;
        assert!(bad.validate().is_err());

        let mut bad = record.clone();
        bad.user_age = f64::NEG_INFINITY;
        assert!(bad.validate().is_err());

        let mut bad = record;
        bad.month = Some(13);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_expense_accepts_numeric_user_id() {
        let e: Expense = serde_json::from_str(
            r#"{"date": "2025-01-15", "category": "food", "amount": 450, "user_id": 7}"#,
        )
        .unwrap();
        assert_eq!(e.user_id.as_deref(), Some("7"));
        assert_eq!(e.amount, 450.0);
    }

    #[test]
    fn test_expense_without_user_id() {
        let e: Expense =
            serde_json::from_str(r#"{"date": "2025-01-15", "category": "food", "amount": 1.5}"#)
                .unwrap();
        assert!(e.user_id.is_none());
    }

    #[test]
    fn test_training_record_derives_time_fields() {
        let r: TrainingRecord = serde_json::from_str(
            r#"{"user_id": 1, "date": "2025-11-15", "category": "food", "amount": 10,
                "user_income": 4000, "user_age": 35}"#,
        )
        .unwrap();

        assert_eq!(r.month(), 11);
        assert_eq!(r.quarter(), 4);
        // 2025-11-15 is a Saturday
        assert_eq!(r.day_of_week(), 5);
        assert!(r.is_weekend());
        assert_eq!(r.user_risk_tolerance, "medium");
        assert_eq!(r.num_transactions, 1);
    }

    #[test]
    fn test_profile_validation() {
        let mut p = UserProfile::default();
        assert!(p.validate().is_ok());
        p.month = Some(13);
        assert!(p.validate().is_err());
        p.month = Some(12);
        p.day_of_week = Some(7);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_unknown_risk_is_none() {
        let p = UserProfile {
            user_risk_tolerance: Some("reckless".into()),
            ..Default::default()
        };
        assert_eq!(p.risk_tolerance(), None);
        assert_eq!(
            UserProfile::default().risk_tolerance(),
            Some(RiskTolerance::Medium)
        );
    }

    #[test]
    fn test_quarter_of() {
        assert_eq!(quarter_of(1), 1);
        assert_eq!(quarter_of(3), 1);
        assert_eq!(quarter_of(4), 2);
        assert_eq!(quarter_of(12), 4);
    }
}
