//! Configuration types.
//!
//! `RequestConfiguration` is the single value handed to the pipeline. It can be
//! built programmatically without any CLI dependency.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::DEFAULT_MAX_REDIRECTS;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Address family the transport may connect over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressFamily {
    /// Whatever the resolver returns
    #[default]
    Any,
    /// IPv4 addresses only
    V4Only,
    /// IPv6 addresses only
    V6Only,
}

/// Everything needed to perform one HTTP exchange.
///
/// Built once per invocation and passed by reference into the pipeline, which
/// never mutates it. `data` set to an empty string counts as "no data".
///
/// # Examples
///
/// ```no_run
/// use curlkit::RequestConfiguration;
///
/// let config = RequestConfiguration {
///     url: "https://example.com/api".to_string(),
///     headers: vec!["Authorization: Bearer token".to_string()],
///     data: Some(r#"{"name":"value"}"#.to_string()),
///     follow_redirects: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct RequestConfiguration {
    /// Target URL (or a bare path when `unix_socket` is set)
    pub url: String,

    /// Explicit HTTP method; inferred when `None`
    pub method: Option<String>,

    /// Extra request headers in `Name: Value` form
    pub headers: Vec<String>,

    /// Inline body, `@path` for a file, or `@` for standard input
    pub data: Option<String>,

    /// File streamed as the request body (takes precedence over `data`)
    pub upload_file: Option<PathBuf>,

    /// Skip server certificate verification
    pub insecure: bool,

    /// PEM bundle of trusted root certificates
    pub cacert: Option<PathBuf>,

    /// PEM client certificate (used together with `key`)
    pub cert: Option<PathBuf>,

    /// PEM private key for `cert`
    pub key: Option<PathBuf>,

    /// Trace the request and response headers
    pub verbose: bool,

    /// Do not render the response body
    pub silent: bool,

    /// Render the status line and headers ahead of the body
    pub include_headers: bool,

    /// Send a HEAD-style request and render only the status line and headers
    pub headers_only: bool,

    /// Write the body to this file instead of standard output (`-` = stdout)
    pub output_file: Option<PathBuf>,

    /// User-Agent override
    pub user_agent: Option<String>,

    /// Referer header value
    pub referer: Option<String>,

    /// Bound on connection establishment
    pub connect_timeout: Option<Duration>,

    /// Bound on the whole exchange, redirects and body included
    pub max_time: Option<Duration>,

    /// Send every connection to this Unix domain socket
    pub unix_socket: Option<PathBuf>,

    /// Follow redirect responses
    pub follow_redirects: bool,

    /// Maximum number of redirect hops to follow
    pub max_redirects: usize,

    /// Re-send the original Authorization header on every redirect hop
    pub location_trusted: bool,

    /// Advertise gzip/deflate support
    pub compressed: bool,

    /// Report HTTP status >= 400 as a distinct exit signal
    pub fail_on_error: bool,

    /// Proxy URL for all outbound connections
    pub proxy: Option<String>,

    /// Comma separated hosts that bypass the proxy
    pub no_proxy: Option<String>,

    /// Cookie header value, or `@path` to read it from a file
    pub cookie: Option<String>,

    /// File receiving the cookies set by the response
    pub cookie_jar: Option<PathBuf>,

    /// Byte range, sent as `Range: bytes=<range>`
    pub range: Option<String>,

    /// Address family restriction
    pub address_family: AddressFamily,
}

impl RequestConfiguration {
    /// Returns the inline data value, treating an empty string as absent.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }
}

impl Default for RequestConfiguration {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: None,
            headers: Vec::new(),
            data: None,
            upload_file: None,
            insecure: false,
            cacert: None,
            cert: None,
            key: None,
            verbose: false,
            silent: false,
            include_headers: false,
            headers_only: false,
            output_file: None,
            user_agent: None,
            referer: None,
            connect_timeout: None,
            max_time: None,
            unix_socket: None,
            follow_redirects: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            location_trusted: false,
            compressed: false,
            fail_on_error: false,
            proxy: None,
            no_proxy: None,
            cookie: None,
            cookie_jar: None,
            range: None,
            address_family: AddressFamily::Any,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = RequestConfiguration::default();
        assert_eq!(config.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(config.address_family, AddressFamily::Any);
        assert!(!config.follow_redirects);
        assert!(!config.insecure);
        assert!(config.method.is_none());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_empty_data_is_absent() {
        let config = RequestConfiguration {
            data: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.data(), None);

        let config = RequestConfiguration {
            data: Some("x=1".to_string()),
            ..Default::default()
        };
        assert_eq!(config.data(), Some("x=1"));
    }
}
