//! curlkit library: curl-style HTTP/HTTPS request execution
//!
//! This library performs one HTTP exchange described by a
//! [`RequestConfiguration`]: it assembles the request, derives TLS trust and
//! transport settings, follows redirects under an explicit policy and renders
//! the response the way curl does.
//!
//! # Example
//!
//! ```no_run
//! use curlkit::{execute, ExitSignal, RequestConfiguration};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RequestConfiguration {
//!     url: "https://example.com/".to_string(),
//!     follow_redirects: true,
//!     fail_on_error: true,
//!     ..Default::default()
//! };
//!
//! match execute(&config).await? {
//!     ExitSignal::Success => {}
//!     ExitSignal::HttpError => eprintln!("server returned an error status"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. It never installs a logger and never
//! exits the process; both are left to the caller.

pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod render;
pub mod request;
pub mod tls;

// Re-export public API
pub use config::{AddressFamily, LogFormat, LogLevel, RequestConfiguration};
pub use error_handling::{CurlError, ErrorCategory, Stage};
pub use render::ExitSignal;
pub use run::{execute, execute_with};

// Internal run module (wires the pipeline stages together)
mod run {
    use std::io::Write;

    use log::debug;

    use crate::config::RequestConfiguration;
    use crate::error_handling::CurlError;
    use crate::fetch::{execute_exchange, ExchangeObserver, HopRequest, RedirectPolicy, Silent};
    use crate::initialization::{init_client, TransportConfig};
    use crate::render::{render_response, ExitSignal, RequestTrace};
    use crate::request::RequestSpec;
    use crate::tls::TlsTrustConfig;

    /// Performs the exchange, rendering to standard output and tracing to
    /// standard error.
    ///
    /// # Errors
    ///
    /// See [`execute_with`].
    pub async fn execute(config: &RequestConfiguration) -> Result<ExitSignal, CurlError> {
        let mut stdout = std::io::stdout();
        let mut stderr = std::io::stderr();
        execute_with(config, &mut stdout, &mut stderr).await
    }

    /// Performs the exchange with caller-supplied output streams.
    ///
    /// `primary` receives response headers and body, `trace` the verbose
    /// request trace. Both are `Send`, so the returned future can be spawned. Stages run in order and the first failure aborts the
    /// rest:
    ///
    /// 1. transport settings (Unix-socket rewrite, proxy, address family)
    /// 2. request assembly (method, headers, body)
    /// 3. TLS trust and client construction
    /// 4. execution under the redirect policy
    /// 5. rendering
    ///
    /// An HTTP error status is not a failure: it yields
    /// [`ExitSignal::HttpError`] when fail-on-error is set.
    ///
    /// # Errors
    ///
    /// Returns the [`CurlError`] of the stage that failed.
    pub async fn execute_with(
        config: &RequestConfiguration,
        primary: &mut (dyn Write + Send),
        trace: &mut (dyn Write + Send),
    ) -> Result<ExitSignal, CurlError> {
        let transport = TransportConfig::from_configuration(config)?;
        let spec = RequestSpec::assemble(config, &transport.target_url).await?;
        debug!("Request assembled for {}", spec.url);

        let tls = TlsTrustConfig::from_configuration(config)?;
        if tls.is_insecure() {
            debug!("TLS certificate verification disabled");
        }
        let client = init_client(&transport, tls.into_client_config()?)?;

        let (first, body) = HopRequest::from_spec(spec);
        let policy = RedirectPolicy::new(config, &first);

        let mut request_trace = RequestTrace::new(trace);
        let mut silent = Silent;
        let observer: &mut dyn ExchangeObserver = if config.verbose {
            &mut request_trace
        } else {
            &mut silent
        };

        let exchange = execute_exchange(&client, &transport, first, body, policy, observer).await?;
        debug!(
            "Exchange finished with {} after {} redirect(s)",
            exchange.response.status(),
            exchange.redirects
        );

        render_response(config, exchange, primary).await
    }
}
