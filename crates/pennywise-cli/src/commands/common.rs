//! Shared command utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pennywise_core::{BudgetManager, PennywiseConfig};

pub fn load_config(path: Option<&Path>) -> Result<PennywiseConfig> {
    PennywiseConfig::load(path).context("Failed to load configuration")
}

/// The explicit model path, or the configured one
pub fn model_path(config: &PennywiseConfig, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.model_path.clone())
}

/// Load a saved model, pointing at `pennywise train` when there is none
pub fn open_model(config: PennywiseConfig, path: &Path) -> Result<BudgetManager> {
    if !path.exists() {
        anyhow::bail!(
            "No model at {} - run `pennywise train` first",
            path.display()
        );
    }

    let mut manager = BudgetManager::new(config);
    manager
        .load(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    Ok(manager)
}
