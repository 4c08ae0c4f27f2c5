//! Command-line options.
//!
//! `Opt` mirrors curl's flag names. It is only used by the binary; the library
//! works on [`RequestConfiguration`] directly.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::config::constants::{DEFAULT_MAX_REDIRECTS, DEFAULT_SCHEME_PREFIX};
use crate::config::types::{AddressFamily, LogFormat, LogLevel, RequestConfiguration};

/// Command-line options for the `curlkit` binary.
///
/// # Examples
///
/// ```bash
/// # Simple GET
/// curlkit https://example.com
///
/// # POST a JSON file, follow redirects, fail on HTTP errors
/// curlkit -L -f -d @payload.json https://api.example.com/items
///
/// # Talk to a local daemon over its Unix socket
/// curlkit --unix-socket /var/run/docker.sock /containers/json
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "curlkit",
    version,
    about = "Performs a single HTTP/HTTPS request, curl style."
)]
pub struct Opt {
    /// Target URL (scheme defaults to https://), or a request path with --unix-socket
    #[arg(value_name = "URL")]
    pub url: String,

    /// HTTP method to use instead of the inferred one
    #[arg(short = 'X', long = "request")]
    pub method: Option<String>,

    /// Extra header, "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Request body: literal text, @file, or @ for stdin
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Stream this file as the request body (implies PUT)
    #[arg(short = 'T', long)]
    pub upload_file: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// PEM bundle of trusted CA certificates
    #[arg(long)]
    pub cacert: Option<PathBuf>,

    /// PEM client certificate
    #[arg(short = 'E', long)]
    pub cert: Option<PathBuf>,

    /// PEM private key for --cert
    #[arg(long)]
    pub key: Option<PathBuf>,

    /// Verbose tracing (repeat for more)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not print the response body
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Print errors even when --silent is set
    #[arg(short = 'S', long)]
    pub show_error: bool,

    /// Print the status line and response headers
    #[arg(short = 'i', long = "include")]
    pub include_headers: bool,

    /// Fetch headers only
    #[arg(short = 'I', long = "head")]
    pub headers_only: bool,

    /// Write the body to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,

    /// User-Agent to send
    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// Referer to send
    #[arg(short = 'e', long)]
    pub referer: Option<String>,

    /// Maximum seconds allowed for connecting
    #[arg(long, value_name = "SECONDS")]
    pub connect_timeout: Option<f64>,

    /// Maximum seconds allowed for the whole exchange
    #[arg(short = 'm', long, value_name = "SECONDS")]
    pub max_time: Option<f64>,

    /// Connect through this Unix domain socket
    #[arg(long, value_name = "PATH")]
    pub unix_socket: Option<PathBuf>,

    /// Follow redirects
    #[arg(short = 'L', long)]
    pub location: bool,

    /// Maximum number of redirects to follow
    #[arg(long = "max-redirs", default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Follow redirects and resend Authorization to every hop
    #[arg(long)]
    pub location_trusted: bool,

    /// Advertise gzip/deflate support
    #[arg(long)]
    pub compressed: bool,

    /// Exit with code 22 on HTTP status >= 400
    #[arg(short = 'f', long = "fail")]
    pub fail_on_error: bool,

    /// Proxy URL, e.g. http://proxy:3128
    #[arg(short = 'x', long)]
    pub proxy: Option<String>,

    /// Comma separated hosts that bypass the proxy
    #[arg(long = "noproxy")]
    pub no_proxy: Option<String>,

    /// Cookie header value, or @file
    #[arg(short = 'b', long)]
    pub cookie: Option<String>,

    /// Write received cookies to this file
    #[arg(short = 'c', long)]
    pub cookie_jar: Option<PathBuf>,

    /// Byte range to request, e.g. 0-499
    #[arg(short = 'r', long)]
    pub range: Option<String>,

    /// Resolve names to IPv4 addresses only
    #[arg(short = '4', long)]
    pub ipv4: bool,

    /// Resolve names to IPv6 addresses only
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Diagnostic log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Diagnostic log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Opt {
    /// Converts parsed flags into a [`RequestConfiguration`].
    ///
    /// Applies the CLI-level defaulting: scheme-less URLs get `https://`
    /// (request paths in Unix-socket mode are kept as paths),
    /// `--location-trusted` implies `--location`, and fractional second values
    /// become durations (non-positive values mean "no limit").
    pub fn into_request_configuration(self) -> RequestConfiguration {
        let url = normalize_target(&self.url, self.unix_socket.is_some());
        let address_family = if self.ipv4 {
            AddressFamily::V4Only
        } else if self.ipv6 {
            AddressFamily::V6Only
        } else {
            AddressFamily::Any
        };

        RequestConfiguration {
            url,
            method: self.method,
            headers: self.headers,
            data: self.data,
            upload_file: self.upload_file,
            insecure: self.insecure,
            cacert: self.cacert,
            cert: self.cert,
            key: self.key,
            verbose: self.verbose > 0,
            silent: self.silent,
            include_headers: self.include_headers,
            headers_only: self.headers_only,
            output_file: self.output_file,
            user_agent: self.user_agent,
            referer: self.referer,
            connect_timeout: self.connect_timeout.and_then(seconds),
            max_time: self.max_time.and_then(seconds),
            unix_socket: self.unix_socket,
            follow_redirects: self.location || self.location_trusted,
            max_redirects: self.max_redirects,
            location_trusted: self.location_trusted,
            compressed: self.compressed,
            fail_on_error: self.fail_on_error,
            proxy: self.proxy,
            no_proxy: self.no_proxy,
            cookie: self.cookie,
            cookie_jar: self.cookie_jar,
            range: self.range,
            address_family,
        }
    }

    /// Whether pipeline errors should be printed to stderr.
    pub fn reports_errors(&self) -> bool {
        !self.silent || self.show_error
    }
}

fn has_http_scheme(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

fn normalize_target(target: &str, unix_socket: bool) -> String {
    if has_http_scheme(target) {
        return target.to_string();
    }
    if unix_socket {
        if target.starts_with('/') {
            target.to_string()
        } else {
            format!("/{}", target)
        }
    } else {
        format!("{}{}", DEFAULT_SCHEME_PREFIX, target)
    }
}

fn seconds(value: f64) -> Option<Duration> {
    if value > 0.0 {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}
