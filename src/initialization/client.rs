//! HTTP client initialization.
//!
//! Builds the `reqwest::Client` for one exchange from a [`TransportConfig`]
//! and the rustls configuration produced by the TLS trust builder.

use std::sync::Arc;

use reqwest::ClientBuilder;

use super::resolver::FamilyResolver;
use super::transport::TransportConfig;
use crate::config::AddressFamily;
use crate::error_handling::{CurlError, Stage};

/// Initializes the HTTP client for a single exchange.
///
/// Redirects are disabled so the redirect policy can inspect every hop, and
/// no default headers are set: the request carries its own. The client does
/// not keep a cookie store; cookies are read from each response instead.
///
/// # Errors
///
/// Returns a configuration error if the proxy is invalid, or a network error
/// if reqwest rejects the assembled settings.
pub fn init_client(
    transport: &TransportConfig,
    tls: rustls::ClientConfig,
) -> Result<reqwest::Client, CurlError> {
    let mut builder = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .use_preconfigured_tls(tls)
        .http1_only();

    if let Some(connect_timeout) = transport.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(socket) = &transport.unix_socket {
        builder = with_unix_socket(builder, socket)?;
    }

    if transport.address_family != AddressFamily::Any {
        builder = builder.dns_resolver(Arc::new(FamilyResolver::new(transport.address_family)));
    }

    let proxies = transport.build_proxies()?;
    if !proxies.is_empty() {
        log::debug!("Using proxy {:?}", transport.proxy);
    } else if transport.unix_socket.is_some() {
        builder = builder.no_proxy();
    }
    // An explicit proxy replaces reqwest's own environment lookup.
    for proxy in proxies {
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| CurlError::network(Stage::Transport, e))
}

#[cfg(unix)]
fn with_unix_socket(
    builder: ClientBuilder,
    socket: &std::path::Path,
) -> Result<ClientBuilder, CurlError> {
    Ok(builder.unix_socket(socket.to_path_buf()))
}

#[cfg(not(unix))]
fn with_unix_socket(
    _builder: ClientBuilder,
    socket: &std::path::Path,
) -> Result<ClientBuilder, CurlError> {
    Err(CurlError::configuration(
        Stage::Transport,
        format!(
            "Unix sockets are not supported on this platform: {}",
            socket.display()
        ),
    ))
}
