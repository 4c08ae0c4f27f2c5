//! Error handling.
//!
//! This module provides:
//! - The `CurlError` taxonomy returned by the pipeline
//! - Stage and category classification
//! - Categorization of transport errors from `reqwest`
//!
//! Errors are categorized into:
//! - **Configuration**: local inputs that cannot be used (files, URL, TLS material)
//! - **Network**: transport failures, timeouts and the redirect limit
//! - **Output**: the rendered response could not be written

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, error_chain};
pub use types::{CurlError, ErrorCategory, InitializationError, NetworkErrorKind, Stage};
