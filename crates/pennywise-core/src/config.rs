//! Configuration for model training and storage
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/pennywise/config/pennywise.toml)
//! 2. Embedded defaults (compiled into binary)
//!
//! Keys missing from an override file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pennywise.toml");

/// Hyperparameters for the learning algorithms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Trees in the spending forest and the isolation forest
    pub n_estimators: usize,
    /// Expected share of anomalies in training data (0.0 - 0.5)
    pub contamination: f64,
    /// Seed for every random choice made during training
    pub seed: u64,
    /// Held-out share for evaluation
    pub test_size: f64,
    /// Depth cap for regression trees
    pub max_depth: Option<u16>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            contamination: 0.1,
            seed: 42,
            test_size: 0.2,
            max_depth: None,
        }
    }
}

/// Shape of generated sample data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub num_users: usize,
    pub num_months: usize,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            num_users: 100,
            num_months: 12,
        }
    }
}

/// Where the trained model lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub model_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("pennywise_model.json.gz"),
        }
    }
}

/// Full Pennywise configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PennywiseConfig {
    pub model: ModelConfig,
    pub synthetic: SyntheticConfig,
    pub storage: StorageConfig,
}

impl PennywiseConfig {
    /// Load configuration, preferring `path`, then the data-dir override, then defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(p) => fs::read_to_string(p).map_err(|e| {
                Error::InvalidData(format!("Failed to read config {}: {}", p.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(p) => {
                    debug!(path = %p.display(), "Using config override");
                    fs::read_to_string(&p)
                        .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let config = parse_config(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the trainers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.model.n_estimators == 0 {
            return Err(Error::InvalidData("n_estimators must be at least 1".into()));
        }
        if !(0.0..=0.5).contains(&self.model.contamination) {
            return Err(Error::InvalidData(
                "contamination must be between 0.0 and 0.5".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.model.test_size) {
            return Err(Error::InvalidData(
                "test_size must be in [0.0, 1.0)".into(),
            ));
        }
        if self.synthetic.num_users == 0 || self.synthetic.num_months == 0 {
            return Err(Error::InvalidData(
                "synthetic data needs at least one user and one month".into(),
            ));
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pennywise").join("config").join("pennywise.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    model: Option<RawModel>,
    synthetic: Option<RawSynthetic>,
    storage: Option<RawStorage>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    n_estimators: Option<usize>,
    contamination: Option<f64>,
    seed: Option<u64>,
    test_size: Option<f64>,
    max_depth: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct RawSynthetic {
    num_users: Option<usize>,
    num_months: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    model_path: Option<PathBuf>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<PennywiseConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = PennywiseConfig::default();

    if let Some(model) = raw.model {
        if let Some(n) = model.n_estimators {
            config.model.n_estimators = n;
        }
        if let Some(c) = model.contamination {
            config.model.contamination = c;
        }
        if let Some(seed) = model.seed {
            config.model.seed = seed;
        }
        if let Some(t) = model.test_size {
            config.model.test_size = t;
        }
        if model.max_depth.is_some() {
            config.model.max_depth = model.max_depth;
        }
    }

    if let Some(synthetic) = raw.synthetic {
        if let Some(users) = synthetic.num_users {
            config.synthetic.num_users = users;
        }
        if let Some(months) = synthetic.num_months {
            config.synthetic.num_months = months;
        }
    }

    if let Some(storage) = raw.storage {
        if let Some(path) = storage.model_path {
            config.storage.model_path = path;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, PennywiseConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [model]
            n_estimators = 10
            max_depth = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.model.n_estimators, 10);
        assert_eq!(config.model.max_depth, Some(6));
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.synthetic.num_users, 100);
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse_config("[model\nseed = ").unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_validate_rejects_bad_contamination() {
        let mut config = PennywiseConfig::default();
        config.model.contamination = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[storage]\nmodel_path = \"/tmp/m.json.gz\"\n").unwrap();

        let config = PennywiseConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage.model_path, PathBuf::from("/tmp/m.json.gz"));
    }
}
