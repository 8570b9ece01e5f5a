//! Model info command implementation

use std::path::Path;

use anyhow::Result;

use pennywise_core::PennywiseConfig;

use super::{model_path, open_model, print_report};

pub fn cmd_info(config: PennywiseConfig, model: Option<&Path>, json: bool) -> Result<()> {
    let path = model_path(&config, model);
    let manager = open_model(config, &path)?;
    let info = manager.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("📦 Pennywise Model");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   File: {}", path.display());
    if let Some(fingerprint) = &info.fingerprint {
        println!("   SHA-256: {}", fingerprint);
    }
    if let Some(trained_at) = info.trained_at {
        println!("   Trained: {}", trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("   Type: {} ({} trees)", info.model_type, info.n_estimators);
    println!("   Features: {}", info.features.len());
    println!("   Categories: {}", info.categories.join(", "));

    if let Some(report) = &info.training {
        print_report(report);
    }

    println!();
    Ok(())
}
