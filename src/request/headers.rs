//! Request header assembly.
//!
//! Caller-supplied headers are added first, in order. Each default (User-Agent,
//! Referer, Cookie, Range, Content-Type, Accept-Encoding) is applied only when
//! the caller did not supply a header of the same name.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, COOKIE, RANGE, REFERER,
    USER_AGENT,
};

use crate::config::{
    RequestConfiguration, COMPRESSED_ACCEPT_ENCODING, DEFAULT_CONTENT_TYPE, DEFAULT_USER_AGENT,
    FILE_REFERENCE_PREFIX, RANGE_UNIT_PREFIX,
};
use crate::error_handling::{CurlError, Stage};

/// Splits a `Name: Value` line on its first colon and trims both halves.
///
/// Returns `None` for lines without a colon or with an empty name.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// Builds the outbound header set.
///
/// `has_body` controls the Content-Type default.
///
/// # Errors
///
/// Returns a configuration error if a header name or value is not valid HTTP,
/// or if the `@file` cookie source cannot be read.
pub async fn build_headers(
    config: &RequestConfiguration,
    has_body: bool,
) -> Result<HeaderMap, CurlError> {
    let mut headers = HeaderMap::new();

    for line in &config.headers {
        let Some((name, value)) = parse_header_line(line) else {
            log::warn!("Ignoring malformed header (expected \"Name: Value\"): {}", line);
            continue;
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            CurlError::configuration(
                Stage::RequestBuild,
                format!("invalid header name in {:?}", line),
            )
        })?;
        headers.append(name, header_value(value, line)?);
    }

    let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
    set_default(&mut headers, USER_AGENT, user_agent)?;

    if let Some(referer) = &config.referer {
        set_default(&mut headers, REFERER, referer)?;
    }

    if let Some(cookie) = &config.cookie {
        if !headers.contains_key(COOKIE) {
            let value = resolve_cookie(cookie).await?;
            set_default(&mut headers, COOKIE, &value)?;
        }
    }

    if let Some(range) = &config.range {
        set_default(&mut headers, RANGE, &format!("{}{}", RANGE_UNIT_PREFIX, range))?;
    }

    if has_body {
        set_default(&mut headers, CONTENT_TYPE, DEFAULT_CONTENT_TYPE)?;
    }

    if config.compressed {
        set_default(&mut headers, ACCEPT_ENCODING, COMPRESSED_ACCEPT_ENCODING)?;
    }

    Ok(headers)
}

/// Resolves a cookie value, reading `@path` from disk.
///
/// Trailing line breaks in the file are stripped; they are not valid inside a
/// header value.
async fn resolve_cookie(cookie: &str) -> Result<String, CurlError> {
    match cookie.strip_prefix(FILE_REFERENCE_PREFIX) {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                CurlError::configuration(
                    Stage::RequestBuild,
                    format!("failed to read cookie file {}: {}", path, e),
                )
            })?;
            Ok(contents.trim_end_matches(['\r', '\n']).to_string())
        }
        None => Ok(cookie.to_string()),
    }
}

fn set_default(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), CurlError> {
    if !headers.contains_key(&name) {
        let value = header_value(value, name.as_str())?;
        headers.insert(name, value);
    }
    Ok(())
}

/// Non-ASCII (obs-text) bytes are accepted; control characters are not.
fn header_value(value: &str, origin: &str) -> Result<HeaderValue, CurlError> {
    HeaderValue::from_bytes(value.as_bytes()).map_err(|_| {
        CurlError::configuration(
            Stage::RequestBuild,
            format!("invalid header value for {:?}", origin),
        )
    })
}
