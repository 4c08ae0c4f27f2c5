//! Request trace and response header blocks.

use std::io::Write;

use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};

use crate::error_handling::{CurlError, Stage};
use crate::fetch::{ExchangeObserver, HopRequest};

/// Writes `> ` request lines (and `< ` lines for followed redirects) to the
/// trace stream.
pub struct RequestTrace<'a> {
    out: &'a mut (dyn Write + Send),
}

impl<'a> RequestTrace<'a> {
    pub fn new(out: &'a mut (dyn Write + Send)) -> Self {
        RequestTrace { out }
    }
}

impl ExchangeObserver for RequestTrace<'_> {
    fn before_send(&mut self, hop: &HopRequest) -> Result<(), CurlError> {
        write_request_trace(&mut *self.out, hop).map_err(trace_error)
    }

    fn on_redirect(&mut self, status: StatusCode, headers: &HeaderMap) -> Result<(), CurlError> {
        write_redirect_trace(&mut *self.out, status, headers).map_err(trace_error)
    }
}

fn trace_error(e: std::io::Error) -> CurlError {
    CurlError::output(Stage::Execution, "failed to write request trace", e)
}

/// `> METHOD /path HTTP/1.1`, `> Host:`, one line per header, then `>`.
pub fn write_request_trace(out: &mut dyn Write, hop: &HopRequest) -> std::io::Result<()> {
    let mut target = hop.url.path().to_string();
    if let Some(query) = hop.url.query() {
        target.push('?');
        target.push_str(query);
    }
    writeln!(out, "> {} {} HTTP/1.1", hop.method, target)?;
    writeln!(out, "> Host: {}", host_header(&hop.url))?;
    for (name, value) in &hop.headers {
        write!(out, "> {}: ", canonical_name(name.as_str()))?;
        out.write_all(value.as_bytes())?;
        writeln!(out)?;
    }
    writeln!(out, ">")?;
    out.flush()
}

fn write_redirect_trace(
    out: &mut dyn Write,
    status: StatusCode,
    headers: &HeaderMap,
) -> std::io::Result<()> {
    writeln!(out, "< HTTP/1.1 {}", status_text(status))?;
    for (name, value) in headers {
        write!(out, "< {}: ", canonical_name(name.as_str()))?;
        out.write_all(value.as_bytes())?;
        writeln!(out)?;
    }
    writeln!(out, "<")?;
    out.flush()
}

/// Status line and headers, followed by an empty line.
///
/// Names appear in the order first received; repeated values of one name are
/// grouped under its first occurrence, as `HeaderMap` stores them.
pub fn write_status_block(
    out: &mut dyn Write,
    version: Version,
    status: StatusCode,
    headers: &HeaderMap,
) -> std::io::Result<()> {
    writeln!(out, "{} {}", version_label(version), status_text(status))?;
    for (name, value) in headers {
        write!(out, "{}: ", canonical_name(name.as_str()))?;
        out.write_all(value.as_bytes())?;
        writeln!(out)?;
    }
    writeln!(out)
}

fn host_header(url: &reqwest::Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

pub fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_2 => "HTTP/2.0",
        Version::HTTP_3 => "HTTP/3.0",
        _ => "HTTP/1.1",
    }
}

/// `content-type` -> `Content-Type`.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}
