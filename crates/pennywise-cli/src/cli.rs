//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pennywise - Predict spending and spot unusual expenses
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Spending prediction and budget insight service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (trains a model first if none is saved)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,

        /// Model file (defaults to storage.model_path from config)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Train the models and save them
    Train {
        /// Training records (.csv or .json); synthetic data when omitted
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Synthetic users to generate
        #[arg(long)]
        users: Option<usize>,

        /// Synthetic months per user
        #[arg(long)]
        months: Option<usize>,

        /// Where to save the model (defaults to storage.model_path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict spending for one category
    Predict {
        /// Monthly income
        #[arg(long)]
        income: f64,

        /// Age in years
        #[arg(long)]
        age: f64,

        /// Spending category (food, transport, shopping, ...)
        #[arg(short, long)]
        category: String,

        /// Risk tolerance: low, medium, high
        #[arg(long, default_value = "medium")]
        risk: String,

        /// Month to predict (1-12, defaults to the current month)
        #[arg(long)]
        month: Option<u32>,

        /// Model file (defaults to storage.model_path from config)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Train on synthetic data and walk through every kind of insight
    Demo {
        /// Save the demo model to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Show model statistics
    Info {
        /// Model file (defaults to storage.model_path from config)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
