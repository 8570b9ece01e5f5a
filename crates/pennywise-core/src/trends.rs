//! Spending trend analysis
//!
//! Expenses are bucketed by calendar month (year and month). A least-squares
//! line through the monthly totals gives the overall and per-category slopes.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ml::linear_slope;
use crate::models::Expense;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl TrendDirection {
    /// A flat slope counts as decreasing
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTrend {
    pub direction: TrendDirection,
    pub slope: f64,
    pub monthly_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub direction: TrendDirection,
    pub slope: f64,
    pub average_monthly: f64,
}

/// Spending in one calendar month across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStat {
    /// Mean amount of a single expense in this month
    pub average_spending: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingTrends {
    /// Present only when the expenses span more than one month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallTrend>,
    pub by_category: BTreeMap<String, CategoryTrend>,
    /// Keyed by month number; only months with expenses appear
    pub seasonal: BTreeMap<u32, MonthStat>,
}

type MonthKey = (i32, u32);

fn monthly_totals<'a>(expenses: impl Iterator<Item = &'a Expense>) -> BTreeMap<MonthKey, f64> {
    let mut totals = BTreeMap::new();
    for e in expenses {
        *totals.entry((e.date.year(), e.date.month())).or_insert(0.0) += e.amount;
    }
    totals
}

/// Analyze overall, per-category and seasonal spending patterns
pub fn analyze_spending_trends(expenses: &[Expense]) -> Result<SpendingTrends> {
    if expenses.is_empty() {
        return Err(Error::InvalidData("No expense data provided".into()));
    }

    let mut trends = SpendingTrends::default();

    let totals: Vec<f64> = monthly_totals(expenses.iter()).into_values().collect();
    if totals.len() > 1 {
        let slope = linear_slope(&totals);
        trends.overall = Some(OverallTrend {
            direction: TrendDirection::from_slope(slope),
            slope,
            monthly_change: slope,
        });
    }

    let mut by_category: BTreeMap<&str, Vec<&Expense>> = BTreeMap::new();
    for e in expenses {
        by_category.entry(e.category.as_str()).or_default().push(e);
    }
    for (category, items) in by_category {
        let cat_totals: Vec<f64> = monthly_totals(items.into_iter()).into_values().collect();
        if cat_totals.len() > 1 {
            let slope = linear_slope(&cat_totals);
            trends.by_category.insert(
                category.to_string(),
                CategoryTrend {
                    direction: TrendDirection::from_slope(slope),
                    slope,
                    average_monthly: cat_totals.iter().sum::<f64>() / cat_totals.len() as f64,
                },
            );
        }
    }

    let mut seasonal: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for e in expenses {
        let entry = seasonal.entry(e.date.month()).or_insert((0.0, 0));
        entry.0 += e.amount;
        entry.1 += 1;
    }
    trends.seasonal = seasonal
        .into_iter()
        .map(|(month, (sum, count))| {
            (
                month,
                MonthStat {
                    average_spending: sum / count as f64,
                    transaction_count: count,
                },
            )
        })
        .collect();

    Ok(trends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn e(date: &str, category: &str, amount: f64) -> Expense {
        Expense::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category,
            amount,
        )
    }

    #[test]
    fn test_empty_is_error() {
        let err = analyze_spending_trends(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid data: No expense data provided");
    }

    #[test]
    fn test_single_month_has_no_overall_trend() {
        let trends = analyze_spending_trends(&[
            e("2025-01-15", "food", 450.0),
            e("2025-01-16", "transport", 180.0),
        ])
        .unwrap();

        assert!(trends.overall.is_none());
        assert!(trends.by_category.is_empty());
        assert_eq!(trends.seasonal.len(), 1);
        assert_eq!(trends.seasonal[&1].transaction_count, 2);
        assert_eq!(trends.seasonal[&1].average_spending, 315.0);
    }

    #[test]
    fn test_increasing_trend() {
        let trends = analyze_spending_trends(&[
            e("2025-01-15", "food", 100.0),
            e("2025-02-15", "food", 200.0),
            e("2025-03-15", "food", 300.0),
            e("2025-03-20", "travel", 50.0),
        ])
        .unwrap();

        let overall = trends.overall.unwrap();
        assert_eq!(overall.direction, TrendDirection::Increasing);
        // Monthly totals 100, 200, 350
        assert!((overall.slope - 125.0).abs() < 1e-9);

        let food = &trends.by_category["food"];
        assert_eq!(food.direction, TrendDirection::Increasing);
        assert!((food.slope - 100.0).abs() < 1e-9);
        assert!((food.average_monthly - 200.0).abs() < 1e-9);
        // travel appears in one month only
        assert!(!trends.by_category.contains_key("travel"));
    }

    #[test]
    fn test_months_ordered_across_years() {
        let trends = analyze_spending_trends(&[
            e("2025-01-10", "food", 100.0),
            e("2024-12-10", "food", 300.0),
        ])
        .unwrap();

        // Dec 2024 (300) precedes Jan 2025 (100)
        assert_eq!(trends.overall.unwrap().direction, TrendDirection::Decreasing);
    }

    #[test]
    fn test_flat_counts_as_decreasing() {
        assert_eq!(TrendDirection::from_slope(0.0), TrendDirection::Decreasing);
    }
}
