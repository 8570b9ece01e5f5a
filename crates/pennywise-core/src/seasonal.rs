//! Seasonal spending patterns
//!
//! A fixed multiplier table drives synthetic data, and `analyze_seasonal`
//! derives the same kind of multipliers from a user's own expenses.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Expense;

/// Multiplier above which an upcoming month is called out
const HIGH_SEASON_THRESHOLD: f64 = 1.2;

/// How many months ahead (including the current one) to look for high seasons
const LOOKAHEAD_MONTHS: u32 = 3;

/// Expected spending relative to a March baseline, indexed by month (1-12)
pub fn seasonal_multiplier(month: u32) -> f64 {
    match month {
        1 => 0.9,   // post-holiday savings
        2 => 0.95,
        3 => 1.0,   // baseline
        4 => 1.05,  // spring activities
        5 => 1.1,   // outdoor activities
        6 => 1.15,  // summer start
        7 => 1.2,   // peak summer
        8 => 1.15,
        9 => 1.0,   // back to school
        10 => 1.05, // holiday prep
        11 => 1.3,  // Black Friday, Thanksgiving
        12 => 1.4,  // holidays
        _ => 1.0,
    }
}

/// The full multiplier table keyed by month
pub fn seasonal_multipliers() -> BTreeMap<u32, f64> {
    (1..=12).map(|m| (m, seasonal_multiplier(m))).collect()
}

/// English month name for 1-12
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

/// Spending in one calendar month compared to the user's average month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSeason {
    pub month_name: String,
    pub actual_spending: f64,
    pub seasonal_multiplier: f64,
    /// Percent above (+) or below (-) the average month
    pub vs_average: f64,
}

/// Heads-up for an expensive month coming soon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRecommendation {
    pub month: String,
    pub message: String,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAnalysis {
    /// Keyed by month number; empty when there are no expenses
    pub seasonal_data: BTreeMap<u32, MonthSeason>,
    pub recommendations: Vec<SeasonalRecommendation>,
    pub average_monthly_spending: f64,
}

/// Derive per-month multipliers from expenses and flag expensive months ahead
///
/// Expenses from different years that share a calendar month are pooled.
/// The lookahead stops at December rather than wrapping into January.
pub fn analyze_seasonal(expenses: &[Expense], today: NaiveDate) -> SeasonalAnalysis {
    let mut monthly_totals: BTreeMap<u32, f64> = BTreeMap::new();
    for expense in expenses {
        *monthly_totals.entry(expense.date.month()).or_insert(0.0) += expense.amount;
    }

    if monthly_totals.is_empty() {
        return SeasonalAnalysis::default();
    }

    let average = monthly_totals.values().sum::<f64>() / monthly_totals.len() as f64;

    let seasonal_data: BTreeMap<u32, MonthSeason> = (1..=12)
        .map(|month| {
            let actual = monthly_totals.get(&month).copied().unwrap_or(0.0);
            let (multiplier, vs_average) = if average > 0.0 {
                (actual / average, (actual - average) / average * 100.0)
            } else {
                (1.0, 0.0)
            };
            (
                month,
                MonthSeason {
                    month_name: month_name(month).to_string(),
                    actual_spending: actual,
                    seasonal_multiplier: multiplier,
                    vs_average,
                },
            )
        })
        .collect();

    let current = today.month();
    let last = (current + LOOKAHEAD_MONTHS - 1).min(12);
    let recommendations = (current..=last)
        .filter_map(|month| seasonal_data.get(&month))
        .filter(|season| season.seasonal_multiplier > HIGH_SEASON_THRESHOLD)
        .map(|season| SeasonalRecommendation {
            month: season.month_name.clone(),
            message: format!(
                "Higher spending expected in {}. Consider saving extra in advance.",
                season.month_name
            ),
            multiplier: season.seasonal_multiplier,
        })
        .collect();

    SeasonalAnalysis {
        seasonal_data,
        recommendations,
        average_monthly_spending: average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(date: &str, amount: f64) -> Expense {
        Expense::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), "food", amount)
    }

    #[test]
    fn test_multiplier_table() {
        let table = seasonal_multipliers();
        assert_eq!(table.len(), 12);
        assert_eq!(table[&1], 0.9);
        assert_eq!(table[&12], 1.4);
        assert_eq!(seasonal_multiplier(13), 1.0);
    }

    #[test]
    fn test_empty_expenses() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let analysis = analyze_seasonal(&[], today);
        assert!(analysis.seasonal_data.is_empty());
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.average_monthly_spending, 0.0);
    }

    #[test]
    fn test_multipliers_relative_to_present_months() {
        let expenses = vec![
            expense("2025-01-10", 100.0),
            expense("2025-02-10", 300.0),
            // Same calendar month in a different year is pooled
            expense("2024-02-03", 100.0),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let analysis = analyze_seasonal(&expenses, today);

        // Average over the two months present: (100 + 400) / 2
        assert_eq!(analysis.average_monthly_spending, 250.0);
        assert_eq!(analysis.seasonal_data.len(), 12);
        assert!((analysis.seasonal_data[&1].seasonal_multiplier - 0.4).abs() < 1e-9);
        assert!((analysis.seasonal_data[&2].seasonal_multiplier - 1.6).abs() < 1e-9);
        assert!((analysis.seasonal_data[&2].vs_average - 60.0).abs() < 1e-9);
        assert_eq!(analysis.seasonal_data[&3].actual_spending, 0.0);
        assert_eq!(analysis.seasonal_data[&3].month_name, "March");
    }

    #[test]
    fn test_recommendations_look_ahead_three_months() {
        let expenses = vec![
            expense("2025-05-10", 100.0),
            expense("2025-07-10", 500.0),
            expense("2025-09-10", 600.0),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let analysis = analyze_seasonal(&expenses, today);

        // May, June, July are in range; only July is above 1.2x the average (400)
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].month, "July");
        assert!(analysis.recommendations[0]
            .message
            .starts_with("Higher spending expected in July"));
    }

    #[test]
    fn test_lookahead_does_not_wrap_year() {
        let expenses = vec![expense("2025-01-10", 1000.0), expense("2025-12-10", 10.0)];
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let analysis = analyze_seasonal(&expenses, today);
        assert!(analysis.recommendations.is_empty());
    }
}
