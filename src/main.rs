//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `curlkit` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - Mapping the outcome to a process exit code
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use curlkit::config::Opt;
use curlkit::initialization::{init_crypto_provider, init_logger_with};
use curlkit::{execute, ExitSignal};

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let reports_errors = opt.reports_errors();
    let config = opt.into_request_configuration();

    match execute(&config).await {
        Ok(ExitSignal::Success) => Ok(()),
        Ok(signal) => process::exit(signal.code()),
        Err(e) => {
            if reports_errors {
                eprintln!("curlkit: {}", e);
            }
            log::debug!("Failure category {:?} at stage {}", e.category(), e.stage());
            process::exit(ExitSignal::failure_code());
        }
    }
}
