//! Transport and process-level initialization.
//!
//! This module provides:
//! - [`TransportConfig`]: connection settings derived from a configuration
//! - [`init_client`]: the `reqwest::Client` for one exchange
//! - [`FamilyResolver`]: address-family filtering DNS resolution
//! - Logger and crypto provider setup for the binary

mod client;
mod logger;
mod resolver;
mod transport;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::FamilyResolver;
pub use transport::{ProxyRoute, ProxyScheme, ProxySettings, TransportConfig};

/// Installs the process-wide rustls crypto provider.
///
/// The TLS trust builder passes its provider explicitly, so this only matters
/// for code paths that fall back to the process default.
pub fn init_crypto_provider() {
    // Reinstalling fails harmlessly when a provider is already set
    let _ = CryptoProvider::install_default(default_provider());
}
