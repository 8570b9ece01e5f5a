//! Training command implementation

use std::path::Path;

use anyhow::{Context, Result};

use pennywise_core::import::load_training_data;
use pennywise_core::{BudgetManager, PennywiseConfig, TrainingReport};

use super::model_path;

/// Importances shown after training
const TOP_FEATURES: usize = 5;

pub fn cmd_train(
    mut config: PennywiseConfig,
    data: Option<&Path>,
    users: Option<usize>,
    months: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    if let Some(n) = users {
        config.synthetic.num_users = n;
    }
    if let Some(n) = months {
        config.synthetic.num_months = n;
    }
    config.validate().context("Invalid training options")?;

    let records = match data {
        Some(path) => {
            let records = load_training_data(path)
                .with_context(|| format!("Failed to read training data {}", path.display()))?;
            println!("📥 Loaded {} records from {}", records.len(), path.display());
            Some(records)
        }
        None => {
            println!(
                "🎲 Generating synthetic data: {} users x {} months",
                config.synthetic.num_users, config.synthetic.num_months
            );
            None
        }
    };

    let path = model_path(&config, output);
    let mut manager = BudgetManager::new(config);

    println!("🧠 Training models...");
    let report = manager.train(records).context("Training failed")?;
    print_report(&report);

    let fingerprint = manager
        .save(&path)
        .with_context(|| format!("Failed to save model to {}", path.display()))?;

    println!();
    println!("💾 Saved model to {}", path.display());
    println!("   SHA-256: {}", fingerprint);
    Ok(())
}

pub fn print_report(report: &TrainingReport) {
    println!();
    println!("📊 Training Results:");
    println!("   • Train rows: {}", report.n_train);
    println!("   • Test rows:  {}", report.n_test);
    println!("   • MAE:  {:.2}", report.mae);
    println!("   • RMSE: {:.2}", report.rmse);
    println!("   • R²:   {:.3}", report.r2);
    match report.trend_r2 {
        Some(r2) => println!("   • Trend R²: {:.3}", r2),
        None => println!("   • Trend R²: (trend model not fitted)"),
    }

    let top = report.top_features(TOP_FEATURES);
    if !top.is_empty() {
        println!();
        println!("   Top features:");
        for (name, importance) in top {
            println!("     {:<22} {:>5.1}%", name, importance * 100.0);
        }
    }
}
