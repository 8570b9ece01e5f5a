//! Pennywise Core Library
//!
//! Shared functionality for the Pennywise spending prediction service:
//! - Expense, profile and training record types
//! - Synthetic training data generation
//! - Feature engineering (one-hot encoding, time features, rolling history)
//! - Learning algorithms (random forest, isolation forest, linear trend)
//! - The budget manager that trains the models and derives insights
//! - Seasonal analysis and budget heuristics
//! - Configuration loading and model persistence

pub mod config;
pub mod error;
pub mod features;
pub mod import;
pub mod insights;
pub mod manager;
pub mod ml;
pub mod models;
pub mod seasonal;
pub mod synthetic;
pub mod trends;

pub use config::{ModelConfig, PennywiseConfig, StorageConfig, SyntheticConfig};
pub use error::{Error, Result};
pub use features::{FeatureSchema, StandardScaler};
pub use manager::{BudgetManager, ModelInfo, TrainingReport};
pub use models::{Category, Expense, RiskTolerance, TrainingRecord, UserProfile};
