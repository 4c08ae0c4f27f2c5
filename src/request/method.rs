//! HTTP method selection.

use reqwest::Method;

use crate::config::RequestConfiguration;
use crate::error_handling::{CurlError, Stage};

/// Returns the method to use for a configuration.
///
/// An explicit method is used verbatim. Otherwise, in priority order:
/// headers-only → `HEAD`, upload file → `PUT`, data → `POST`, else `GET`.
///
/// # Errors
///
/// Returns a configuration error if the explicit method is not a valid HTTP
/// token.
pub fn select_method(config: &RequestConfiguration) -> Result<Method, CurlError> {
    match config.method.as_deref().filter(|m| !m.is_empty()) {
        Some(explicit) => Method::from_bytes(explicit.as_bytes()).map_err(|_| {
            CurlError::configuration(
                Stage::RequestBuild,
                format!("invalid HTTP method: {:?}", explicit),
            )
        }),
        None => Ok(infer_method(config)),
    }
}

fn infer_method(config: &RequestConfiguration) -> Method {
    if config.headers_only {
        Method::HEAD
    } else if config.upload_file.is_some() {
        Method::PUT
    } else if config.data().is_some() {
        Method::POST
    } else {
        Method::GET
    }
}
