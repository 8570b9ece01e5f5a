//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use pennywise_core::{BudgetManager, PennywiseConfig};

use super::model_path;

/// Split a comma-separated environment variable into trimmed, non-empty values
pub fn env_list(name: &str) -> Vec<String> {
    parse_list(&std::env::var(name).unwrap_or_default())
}

pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn cmd_serve(
    config: PennywiseConfig,
    host: &str,
    port: u16,
    no_auth: bool,
    model: Option<&Path>,
) -> Result<()> {
    let path = model_path(&config, model);

    println!("🚀 Starting Pennywise API server...");
    println!("   Model: {}", path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = env_list("PENNYWISE_API_KEYS");
    let allowed_origins = env_list("PENNYWISE_ALLOWED_ORIGINS");

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   🔒 Authentication: required, but PENNYWISE_API_KEYS is empty");
        println!("      Every /api request will be rejected; use --no-auth for local dev");
    } else {
        println!(
            "   🔑 API keys: {} configured (PENNYWISE_API_KEYS)",
            api_keys.len()
        );
    }
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 CORS origins: {} (PENNYWISE_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }

    let mut manager = BudgetManager::new(config);
    if path.exists() {
        manager
            .load(&path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;
        println!("   📦 Loaded saved model");
    } else {
        println!("   🧠 No saved model - training on synthetic data...");
        manager = tokio::task::spawn_blocking(move || -> Result<BudgetManager> {
            let report = manager.train(None).context("Failed to train model")?;
            info!(r2 = report.r2, mae = report.mae, "Startup training complete");
            Ok(manager)
        })
        .await??;
        let fingerprint = manager
            .save(&path)
            .with_context(|| format!("Failed to save model to {}", path.display()))?;
        println!("   ✅ Model trained and saved ({})", &fingerprint[..12]);
    }

    println!();
    println!("   Press Ctrl+C to stop");

    let server_config = pennywise_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
        model_path: path,
    };

    pennywise_server::serve_with_config(manager, host, port, server_config).await?;

    Ok(())
}
