//! Configuration constants.
//!
//! Defaults and wire-level literals shared by the request assembler, the
//! transport and the renderer.

/// Default User-Agent string for HTTP requests.
///
/// Sent unless the caller supplies `user_agent` or an explicit `User-Agent`
/// header.
pub const DEFAULT_USER_AGENT: &str = concat!("curlkit/", env!("CARGO_PKG_VERSION"), " (HTTP mode)");

/// Maximum number of redirect hops followed when none is configured.
pub const DEFAULT_MAX_REDIRECTS: usize = 50;

/// Content-Type applied to requests that carry `data` without an explicit one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Accept-Encoding advertised when compression is requested.
pub const COMPRESSED_ACCEPT_ENCODING: &str = "gzip, deflate";

/// Unit prefix for the Range header.
pub const RANGE_UNIT_PREFIX: &str = "bytes=";

/// Prefix marking a value as "read from this file" (`@path`).
/// On its own it means standard input.
pub const FILE_REFERENCE_PREFIX: char = '@';

/// Base URL used when a Unix socket target is addressed by path only.
pub const UNIX_SOCKET_BASE_URL: &str = "http://localhost";

/// Scheme assumed by the CLI for targets given without one.
pub const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Process exit code for an HTTP status >= 400 under fail-on-error.
///
/// Same value curl uses for `--fail`.
pub const HTTP_ERROR_EXIT_CODE: i32 = 22;

/// Process exit code for configuration or network failures.
pub const GENERIC_FAILURE_EXIT_CODE: i32 = 1;

/// Status codes treated as redirects.
pub const REDIRECT_STATUS_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// Read buffer size used when streaming an upload file.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Output file name meaning "standard output".
pub const STDOUT_OUTPUT_MARKER: &str = "-";

/// `Expires` attribute format for cookie jar entries (RFC 1123, always GMT).
pub const COOKIE_EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
