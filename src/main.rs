//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `user_stream` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::process;

use user_stream::initialization::{init_logger_with, install_drivers};
use user_stream::{run, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting USER_STREAM_PASSWORD in .env without exporting it manually
    let _ = dotenvy::dotenv();

    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    install_drivers();

    // Records go to stdout, so the summary is logged to stderr instead
    match run(config).await {
        Ok(report) => {
            if let Some(imported) = &report.imported {
                info!("Imported CSV: {imported}");
            }
            info!(
                "{:?} finished: {} record{} in {:.2}s",
                report.command,
                report.records_emitted,
                if report.records_emitted == 1 { "" } else { "s" },
                report.elapsed_seconds
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("user_stream error: {:#}", e);
            process::exit(1);
        }
    }
}
