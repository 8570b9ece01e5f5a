//! Pennywise CLI - Spending prediction and budget insights
//!
//! Usage:
//!   pennywise train                  Train on synthetic data and save the model
//!   pennywise train --data FILE      Train on CSV/JSON records
//!   pennywise predict --income 5000 --age 30 --category food
//!   pennywise serve --port 5000      Start the REST API
//!   pennywise demo                   End-to-end walkthrough

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_auth,
            model,
        } => commands::cmd_serve(config, &host, port, no_auth, model.as_deref()).await,
        Commands::Train {
            data,
            users,
            months,
            output,
        } => commands::cmd_train(config, data.as_deref(), users, months, output.as_deref()),
        Commands::Predict {
            income,
            age,
            category,
            risk,
            month,
            model,
        } => commands::cmd_predict(
            config,
            commands::PredictArgs {
                income,
                age,
                category,
                risk,
                month,
            },
            model.as_deref(),
        ),
        Commands::Demo { save } => commands::cmd_demo(config, save.as_deref()),
        Commands::Info { model, json } => commands::cmd_info(config, model.as_deref(), json),
    }
}
