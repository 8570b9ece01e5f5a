//! Demo command implementation
//!
//! Trains on synthetic data, then runs every kind of insight over a small
//! set of expenses dated in the current month so budget alerts fire.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use pennywise_core::models::today;
use pennywise_core::{BudgetManager, Expense, PennywiseConfig, UserProfile};

use super::{print_report, title_case};

/// (day of month, category, amount); the shopping entry is deliberately large
const SAMPLE_EXPENSES: [(u32, &str, f64); 5] = [
    (1, "food", 450.0),
    (2, "transport", 180.0),
    (3, "shopping", 850.0),
    (4, "entertainment", 120.0),
    (5, "utilities", 200.0),
];

const BUDGET_GOALS: [(&str, f64); 5] = [
    ("food", 500.0),
    ("transport", 200.0),
    ("shopping", 300.0),
    ("entertainment", 150.0),
    ("utilities", 250.0),
];

pub fn sample_expenses(month_of: NaiveDate) -> Result<Vec<Expense>> {
    SAMPLE_EXPENSES
        .iter()
        .map(|&(day, category, amount)| {
            let date = month_of
                .with_day(day)
                .with_context(|| format!("Invalid demo day {}", day))?;
            Ok(Expense::new(date, category, amount))
        })
        .collect()
}

pub fn budget_goals() -> BTreeMap<String, f64> {
    BUDGET_GOALS
        .iter()
        .map(|&(category, amount)| (category.to_string(), amount))
        .collect()
}

pub fn cmd_demo(config: PennywiseConfig, save: Option<&Path>) -> Result<()> {
    println!("🤖 Pennywise Demo");
    println!("{}", "=".repeat(50));

    let mut manager = BudgetManager::new(config);
    let report = manager.train(None).context("Training failed")?;
    print_report(&report);

    let now = today();
    let profile = UserProfile {
        user_income: Some(6000.0),
        user_age: Some(28.0),
        user_risk_tolerance: Some("medium".to_string()),
        month: Some(now.month()),
        ..UserProfile::default()
    };
    let expenses = sample_expenses(now)?;
    let goals = budget_goals();

    println!();
    println!("🔮 Spending Predictions:");
    for category in ["food", "transport", "shopping"] {
        let prediction = manager.predict_spending(&profile.with_category(category))?;
        println!(
            "   • {}: ${:.2} (confidence: {:.1}%)",
            title_case(category),
            prediction.predicted_amount,
            prediction.confidence
        );
    }

    println!();
    println!("🚨 Anomaly Detection:");
    let anomalies = manager.detect_anomalies(&expenses, Some(&profile))?;
    if anomalies.is_empty() {
        println!("   • No unusual spending detected");
    }
    for anomaly in &anomalies {
        println!(
            "   • Unusual spending detected: ${:.2} in {}",
            anomaly.expense.amount, anomaly.expense.category
        );
        println!("     Reason: {}", anomaly.reason);
    }

    println!();
    println!("💡 Smart Recommendations:");
    let recommendations = manager.generate_budget_recommendations(&profile, &expenses)?;
    for rec in recommendations.iter().take(3) {
        println!(
            "   • {}: {} (Priority: {})",
            title_case(&rec.category),
            rec.message,
            rec.priority
        );
    }

    println!();
    println!("📈 Comprehensive Insights:");
    let insights = manager.get_smart_insights(&profile, &expenses, &goals)?;

    if !insights.alerts.is_empty() {
        println!("   Alerts:");
        for alert in &insights.alerts {
            println!("     • {} ({} priority)", alert.message, alert.severity);
        }
    }

    if !insights.optimization_tips.is_empty() {
        println!("   Optimization Tips:");
        for tip in &insights.optimization_tips {
            println!(
                "     • {} (Potential savings: ${:.2})",
                tip.tip, tip.potential_savings
            );
        }
    }

    if let Some(path) = save {
        let fingerprint = manager
            .save(path)
            .with_context(|| format!("Failed to save model to {}", path.display()))?;
        println!();
        println!("💾 Saved model to {} ({})", path.display(), fingerprint);
    }

    println!();
    println!("✅ Demo complete!");
    Ok(())
}
