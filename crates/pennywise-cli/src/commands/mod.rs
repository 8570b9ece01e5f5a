//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Shared utilities (config loading, model path resolution)
//! - `demo` - End-to-end walkthrough on sample data
//! - `info` - Model statistics
//! - `predict` - Single-category spending prediction
//! - `serve` - Web server command
//! - `train` - Model training command

pub mod common;
pub mod demo;
pub mod info;
pub mod predict;
pub mod serve;
pub mod train;

// Re-export command functions for main.rs
pub use common::*;
pub use demo::*;
pub use info::*;
pub use predict::*;
pub use serve::*;
pub use train::*;

/// Title-case a category name for display
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
