//! Outbound request assembly.
//!
//! Resolves method, body source and header set from a [`RequestConfiguration`]
//! into a [`RequestSpec`], the immutable descriptor handed to the execution
//! engine.

mod body;
mod headers;
mod method;

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};

use crate::config::RequestConfiguration;
use crate::error_handling::{CurlError, Stage};

pub use body::{resolve_body_source, BodySource, RequestBody};
pub use headers::{build_headers, parse_header_line};
pub use method::select_method;

/// Fully resolved outbound request.
#[derive(Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RequestSpec {
    /// Assembles the request for `target_url`.
    ///
    /// `target_url` is the URL after transport-level rewriting (see
    /// [`crate::initialization::TransportConfig::target_url`]).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL cannot be parsed, the method is
    /// invalid, a header is malformed, or a referenced file cannot be read.
    pub async fn assemble(
        config: &RequestConfiguration,
        target_url: &str,
    ) -> Result<Self, CurlError> {
        let url = parse_target(target_url)?;
        let method = select_method(config)?;
        let source = resolve_body_source(config);
        let headers = build_headers(config, source.is_present()).await?;
        let body = RequestBody::load(&source).await?;

        log::debug!("Assembled {} {} with body {:?}", method, url, body);

        Ok(RequestSpec {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Parses the request target, accepting only http and https URLs.
pub fn parse_target(target: &str) -> Result<Url, CurlError> {
    let url = Url::parse(target).map_err(|e| {
        CurlError::configuration(
            Stage::RequestBuild,
            format!("failed to parse URL {:?}: {}", target, e),
        )
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CurlError::configuration(
            Stage::RequestBuild,
            format!("unsupported URL scheme {:?} in {}", other, target),
        )),
    }
}
