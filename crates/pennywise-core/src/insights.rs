//! Derived insights
//!
//! Output types returned by the budget manager, plus the rule-based heuristics
//! that turn predictions and raw expenses into recommendations, alerts,
//! optimization tips and budget allocations. Nothing here touches a model;
//! the manager supplies predictions.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Expense;
use crate::trends::{SpendingTrends, TrendDirection};

/// Predicted spend above this multiple of history suggests cutting back
const REDUCE_RATIO: f64 = 1.2;
/// Predicted spend below this multiple of history leaves room to grow
const INCREASE_RATIO: f64 = 0.8;

/// Share of the budget past which an alert becomes critical
const BUDGET_EXCEEDED_PCT: f64 = 90.0;
/// Share of the budget past which a warning is raised
const BUDGET_WARNING_PCT: f64 = 75.0;

/// Assumed savings potential for a category trending upward
const TIP_SAVINGS_RATE: f64 = 0.1;
/// Number of top-spending categories considered for tips
const TIP_TOP_CATEGORIES: usize = 3;

/// A budget above this multiple of the prediction is oversized
const OVERSIZED_BUDGET_RATIO: f64 = 1.2;
/// Headroom kept above the prediction in a recommended budget
const BUDGET_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPrediction {
    pub predicted_amount: f64,
    /// 0 - 100; drops as the trees disagree
    pub confidence: f64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub expense: Expense,
    pub anomaly_score: f64,
    pub reason: String,
}

/// Explain an anomaly from its decision-function score
pub fn anomaly_reason(score: f64) -> &'static str {
    if score < -0.5 {
        "Unusually high spending amount for this category"
    } else if score < -0.3 {
        "Spending pattern different from historical behavior"
    } else {
        "Minor deviation from typical spending"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Reduce,
    Increase,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far a prediction strays from history
///
/// A non-positive history counts as a ratio of 1.
pub fn priority_for(predicted: f64, historical: f64) -> Priority {
    let ratio = if historical > 0.0 {
        predicted / historical
    } else {
        1.0
    };

    if !(0.5..=1.5).contains(&ratio) {
        Priority::High
    } else if !(INCREASE_RATIO..=REDUCE_RATIO).contains(&ratio) {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    #[serde(rename = "type")]
    pub rec_type: RecommendationType,
    pub message: String,
    pub predicted_amount: f64,
    pub historical_average: f64,
    pub confidence: f64,
    pub priority: Priority,
}

/// Compare a category's prediction against its historical average
pub fn recommend(
    category: &str,
    prediction: &SpendingPrediction,
    historical_avg: f64,
) -> Recommendation {
    let predicted = prediction.predicted_amount;

    let (rec_type, message) = if predicted > historical_avg * REDUCE_RATIO {
        (
            RecommendationType::Reduce,
            format!(
                "Consider reducing {} spending. Predicted: ${:.2}, Historical: ${:.2}",
                category, predicted, historical_avg
            ),
        )
    } else if predicted < historical_avg * INCREASE_RATIO {
        (
            RecommendationType::Increase,
            format!(
                "You might have room to increase {} budget. Predicted: ${:.2}",
                category, predicted
            ),
        )
    } else {
        (
            RecommendationType::Maintain,
            format!(
                "Your {} budget looks well-balanced. Predicted: ${:.2}",
                category, predicted
            ),
        )
    };

    Recommendation {
        category: category.to_string(),
        rec_type,
        message,
        predicted_amount: predicted,
        historical_average: historical_avg,
        confidence: prediction.confidence,
        priority: priority_for(predicted, historical_avg),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    BudgetExceeded,
    BudgetWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub category: String,
    pub message: String,
    pub severity: Priority,
}

/// Compare this month's spending against per-category budgets
///
/// Only expenses in `today`'s year and month count. A budget of zero or less
/// never alerts.
pub fn generate_alerts(
    expenses: &[Expense],
    budget_goals: &BTreeMap<String, f64>,
    today: NaiveDate,
) -> Vec<Alert> {
    if expenses.is_empty() || budget_goals.is_empty() {
        return Vec::new();
    }

    let mut spent: BTreeMap<&str, f64> = BTreeMap::new();
    for e in expenses
        .iter()
        .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
    {
        *spent.entry(e.category.as_str()).or_insert(0.0) += e.amount;
    }

    budget_goals
        .iter()
        .filter_map(|(category, &budget)| {
            let amount = spent.get(category.as_str()).copied().unwrap_or(0.0);
            let pct = if budget > 0.0 {
                amount / budget * 100.0
            } else {
                0.0
            };

            let (alert_type, severity) = if pct > BUDGET_EXCEEDED_PCT {
                (AlertType::BudgetExceeded, Priority::High)
            } else if pct > BUDGET_WARNING_PCT {
                (AlertType::BudgetWarning, Priority::Medium)
            } else {
                return None;
            };

            Some(Alert {
                alert_type,
                category: category.clone(),
                message: format!("You've spent {:.1}% of your {} budget", pct, category),
                severity,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTip {
    pub category: String,
    pub tip: String,
    pub potential_savings: f64,
}

/// Suggest limits for top-spending categories whose trend is rising
pub fn generate_optimization_tips(
    expenses: &[Expense],
    trends: &SpendingTrends,
) -> Vec<OptimizationTip> {
    if expenses.is_empty() || trends.by_category.is_empty() {
        return Vec::new();
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for e in expenses {
        *totals.entry(e.category.as_str()).or_insert(0.0) += e.amount;
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(TIP_TOP_CATEGORIES)
        .filter(|(category, _)| {
            trends
                .by_category
                .get(*category)
                .is_some_and(|t| t.direction == TrendDirection::Increasing)
        })
        .map(|(category, total)| OptimizationTip {
            category: category.to_string(),
            tip: format!(
                "Your {} spending is trending upward. Consider setting a monthly limit.",
                category
            ),
            potential_savings: total * TIP_SAVINGS_RATE,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartInsights {
    pub predictions: BTreeMap<String, SpendingPrediction>,
    pub anomalies: Vec<Anomaly>,
    pub recommendations: Vec<Recommendation>,
    pub trends: SpendingTrends,
    pub alerts: Vec<Alert>,
    pub optimization_tips: Vec<OptimizationTip>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub category: String,
    pub current_budget: f64,
    pub recommended_budget: f64,
    pub potential_savings: f64,
    pub confidence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetOptimization {
    pub optimized_budget: BTreeMap<String, f64>,
    pub predictions: BTreeMap<String, f64>,
    pub savings_opportunities: Vec<SavingsOpportunity>,
    pub total_savings: f64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Split `total_budget` across categories in proportion to predicted spend,
/// and flag current budgets that are well above the prediction
///
/// Categories in `current_budget` without a prediction are compared against
/// themselves and so never flagged.
pub fn optimize_budget(
    predictions: BTreeMap<String, f64>,
    current_budget: &BTreeMap<String, f64>,
    total_budget: f64,
) -> BudgetOptimization {
    let total_predicted: f64 = predictions.values().sum();

    let optimized_budget = if total_predicted > 0.0 {
        predictions
            .iter()
            .map(|(category, predicted)| {
                (
                    category.clone(),
                    round2(total_budget * predicted / total_predicted),
                )
            })
            .collect()
    } else {
        BTreeMap::new()
    };

    let savings_opportunities: Vec<SavingsOpportunity> = current_budget
        .iter()
        .filter_map(|(category, &current)| {
            let predicted = predictions.get(category).copied().unwrap_or(current);
            if current <= predicted * OVERSIZED_BUDGET_RATIO {
                return None;
            }
            let recommended = predicted * BUDGET_HEADROOM;
            Some(SavingsOpportunity {
                category: category.clone(),
                current_budget: current,
                recommended_budget: recommended,
                potential_savings: current - recommended,
                confidence: "medium".to_string(),
            })
        })
        .collect();

    let total_savings = savings_opportunities
        .iter()
        .map(|s| s.potential_savings)
        .sum();

    BudgetOptimization {
        optimized_budget,
        predictions,
        savings_opportunities,
        total_savings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::CategoryTrend;

    fn e(date: &str, category: &str, amount: f64) -> Expense {
        Expense::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category,
            amount,
        )
    }

    fn prediction(amount: f64) -> SpendingPrediction {
        SpendingPrediction {
            predicted_amount: amount,
            confidence: 80.0,
            category: "food".into(),
        }
    }

    #[test]
    fn test_anomaly_reasons() {
        assert_eq!(
            anomaly_reason(-0.6),
            "Unusually high spending amount for this category"
        );
        assert_eq!(
            anomaly_reason(-0.4),
            "Spending pattern different from historical behavior"
        );
        assert_eq!(anomaly_reason(-0.01), "Minor deviation from typical spending");
    }

    #[test]
    fn test_priority_bands() {
        assert_eq!(priority_for(160.0, 100.0), Priority::High);
        assert_eq!(priority_for(40.0, 100.0), Priority::High);
        assert_eq!(priority_for(130.0, 100.0), Priority::Medium);
        assert_eq!(priority_for(75.0, 100.0), Priority::Medium);
        assert_eq!(priority_for(100.0, 100.0), Priority::Low);
        assert_eq!(priority_for(500.0, 0.0), Priority::Low);
    }

    #[test]
    fn test_recommendation_types() {
        let reduce = recommend("food", &prediction(130.0), 100.0);
        assert_eq!(reduce.rec_type, RecommendationType::Reduce);
        assert_eq!(
            reduce.message,
            "Consider reducing food spending. Predicted: $130.00, Historical: $100.00"
        );

        let increase = recommend("food", &prediction(70.0), 100.0);
        assert_eq!(increase.rec_type, RecommendationType::Increase);
        assert_eq!(
            increase.message,
            "You might have room to increase food budget. Predicted: $70.00"
        );

        let maintain = recommend("food", &prediction(100.0), 100.0);
        assert_eq!(maintain.rec_type, RecommendationType::Maintain);
        assert_eq!(maintain.priority, Priority::Low);
        assert_eq!(maintain.confidence, 80.0);
    }

    #[test]
    fn test_recommendation_serializes_type_field() {
        let json = serde_json::to_value(recommend("food", &prediction(130.0), 100.0)).unwrap();
        assert_eq!(json["type"], "reduce");
        assert_eq!(json["priority"], "medium");
    }

    #[test]
    fn test_alerts_use_current_month_only() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let expenses = vec![
            e("2025-01-15", "food", 460.0),
            e("2025-01-16", "transport", 160.0),
            e("2025-01-17", "shopping", 100.0),
            // Last year's January does not count
            e("2024-01-17", "shopping", 1000.0),
        ];
        let goals: BTreeMap<String, f64> = [
            ("food".to_string(), 500.0),
            ("transport".to_string(), 200.0),
            ("shopping".to_string(), 300.0),
            ("travel".to_string(), 0.0),
        ]
        .into_iter()
        .collect();

        let alerts = generate_alerts(&expenses, &goals, today);
        assert_eq!(alerts.len(), 2);

        let food = alerts.iter().find(|a| a.category == "food").unwrap();
        assert_eq!(food.alert_type, AlertType::BudgetExceeded);
        assert_eq!(food.severity, Priority::High);
        assert_eq!(food.message, "You've spent 92.0% of your food budget");

        let transport = alerts.iter().find(|a| a.category == "transport").unwrap();
        assert_eq!(transport.alert_type, AlertType::BudgetWarning);
        assert_eq!(transport.severity, Priority::Medium);
    }

    #[test]
    fn test_no_alerts_without_goals() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let no_goals = BTreeMap::new();
        assert!(generate_alerts(&[e("2025-01-15", "food", 1.0)], &no_goals, today).is_empty());
    }

    #[test]
    fn test_tips_for_rising_top_categories() {
        let expenses = vec![
            e("2025-01-15", "food", 500.0),
            e("2025-01-15", "shopping", 400.0),
            e("2025-01-15", "travel", 300.0),
            e("2025-01-15", "other", 10.0),
        ];
        let mut trends = SpendingTrends::default();
        for (cat, dir) in [
            ("food", TrendDirection::Increasing),
            ("shopping", TrendDirection::Decreasing),
            ("other", TrendDirection::Increasing),
        ] {
            trends.by_category.insert(
                cat.to_string(),
                CategoryTrend {
                    direction: dir,
                    slope: 1.0,
                    average_monthly: 1.0,
                },
            );
        }

        let tips = generate_optimization_tips(&expenses, &trends);
        // "other" is rising but not in the top three
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].category, "food");
        assert!((tips[0].potential_savings - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_optimize_budget() {
        let predictions: BTreeMap<String, f64> =
            [("food".to_string(), 300.0), ("transport".to_string(), 100.0)]
                .into_iter()
                .collect();
        let current: BTreeMap<String, f64> = [
            ("food".to_string(), 500.0),
            ("transport".to_string(), 110.0),
            ("pets".to_string(), 80.0),
        ]
        .into_iter()
        .collect();

        let result = optimize_budget(predictions, &current, 1000.0);

        assert_eq!(result.optimized_budget["food"], 750.0);
        assert_eq!(result.optimized_budget["transport"], 250.0);
        assert_eq!(result.savings_opportunities.len(), 1);

        let food = &result.savings_opportunities[0];
        assert_eq!(food.category, "food");
        assert!((food.recommended_budget - 330.0).abs() < 1e-9);
        assert!((food.potential_savings - 170.0).abs() < 1e-9);
        assert_eq!(food.confidence, "medium");
        assert!((result.total_savings - 170.0).abs() < 1e-9);
    }

    #[test]
    fn test_optimize_budget_zero_predictions() {
        let predictions: BTreeMap<String, f64> = [("food".to_string(), 0.0)].into_iter().collect();
        let result = optimize_budget(predictions, &BTreeMap::new(), 1000.0);
        assert!(result.optimized_budget.is_empty());
        assert_eq!(result.total_savings, 0.0);
    }
}
