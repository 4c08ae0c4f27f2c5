//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, wire literals, exit codes)
//! - The `RequestConfiguration` value consumed by the pipeline
//! - CLI option parsing for the binary

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::Opt;
pub use constants::*;
pub use types::{AddressFamily, LogFormat, LogLevel, RequestConfiguration};
