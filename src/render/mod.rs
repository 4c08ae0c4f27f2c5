//! Response rendering.
//!
//! Turns the final response of an exchange into output:
//! - status line and headers on the primary stream when requested
//! - the body, streamed verbatim to the primary stream or a file
//! - the cookie jar, after the body
//! - the [`ExitSignal`] derived from the status under fail-on-error

mod cookies;
mod output;
mod trace;

use std::io::Write;

use crate::config::{RequestConfiguration, GENERIC_FAILURE_EXIT_CODE, HTTP_ERROR_EXIT_CODE};
use crate::error_handling::{CurlError, Stage};
use crate::fetch::Exchange;

pub use cookies::{collect_cookies, serialize_cookie, write_cookie_jar};
pub use output::OutputSink;
pub use trace::{canonical_name, version_label, write_request_trace, write_status_block, RequestTrace};

/// Outcome of an exchange that completed without a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSignal {
    Success,
    /// Fail-on-error was set and the final status was >= 400.
    HttpError,
}

impl ExitSignal {
    pub fn code(&self) -> i32 {
        match self {
            ExitSignal::Success => 0,
            ExitSignal::HttpError => HTTP_ERROR_EXIT_CODE,
        }
    }

    /// Exit code for a pipeline error.
    pub fn failure_code() -> i32 {
        GENERIC_FAILURE_EXIT_CODE
    }
}

/// Renders the final response.
///
/// The body is not read at all in headers-only or silent mode. A failed body
/// write aborts before the cookie jar is touched.
///
/// # Errors
///
/// Returns [`CurlError::Output`] if writing the headers, body or jar fails and
/// [`CurlError::Network`] if reading the body fails.
pub async fn render_response(
    config: &RequestConfiguration,
    exchange: Exchange,
    primary: &mut (dyn Write + Send),
) -> Result<ExitSignal, CurlError> {
    let mut response = exchange.response;
    let status = response.status();
    let jar_entries = match &config.cookie_jar {
        Some(_) => collect_cookies(&response),
        None => Vec::new(),
    };

    if config.verbose || config.include_headers || config.headers_only {
        write_status_block(&mut *primary, response.version(), status, response.headers()).map_err(
            |e| CurlError::output(Stage::Rendering, "failed to write response headers", e),
        )?;
    }

    if !config.silent && !config.headers_only {
        let mut sink = OutputSink::open(config.output_file.as_deref(), primary)?;
        let mut total = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CurlError::network(Stage::Rendering, e))?
        {
            total += chunk.len();
            sink.write_chunk(&chunk)?;
        }
        sink.finish()?;
        log::debug!("Rendered {} body bytes from {}", total, exchange.request.url);
    } else {
        primary
            .flush()
            .map_err(|e| CurlError::output(Stage::Rendering, "failed to flush output", e))?;
    }

    if let Some(jar) = &config.cookie_jar {
        write_cookie_jar(jar, &jar_entries)?;
    }

    if config.fail_on_error && status.as_u16() >= 400 {
        log::debug!("Status {} with fail-on-error set", status);
        Ok(ExitSignal::HttpError)
    } else {
        Ok(ExitSignal::Success)
    }
}
