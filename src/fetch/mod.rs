//! Execution engine.
//!
//! Sends one logical exchange, which may span several physical hops when
//! redirects are followed. Failures are reported once and never retried.

mod redirects;

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};

use crate::error_handling::{CurlError, Stage};
use crate::initialization::TransportConfig;
use crate::request::RequestBody;

pub use redirects::{is_redirect, HopRequest, RedirectDecision, RedirectPolicy};

/// Hooks invoked around every physical request.
///
/// Used by the verbose trace; the default methods do nothing. Observers are
/// held across awaits, hence `Send`.
pub trait ExchangeObserver: Send {
    /// Called right before `hop` is sent.
    fn before_send(&mut self, _hop: &HopRequest) -> Result<(), CurlError> {
        Ok(())
    }

    /// Called for each redirect response that is about to be followed.
    fn on_redirect(&mut self, _status: StatusCode, _headers: &HeaderMap) -> Result<(), CurlError> {
        Ok(())
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default)]
pub struct Silent;

impl ExchangeObserver for Silent {}

/// Final response of an exchange and the request that produced it.
#[derive(Debug)]
pub struct Exchange {
    pub response: reqwest::Response,
    pub request: HopRequest,
    pub redirects: usize,
}

/// Runs the exchange starting at `first`.
///
/// The transport's deadline bounds every hop together: each request gets the
/// time left in the budget, which also covers reading its body.
///
/// # Errors
///
/// - [`CurlError::Network`] for DNS, connect, TLS and timeout failures
/// - [`CurlError::TooManyRedirects`] when the policy's hop limit is hit
/// - [`CurlError::Deadline`] when the budget ran out between hops
/// - [`CurlError::Configuration`] when a redirect targets an IP literal of the
///   wrong address family
pub async fn execute_exchange(
    client: &Client,
    transport: &TransportConfig,
    first: HopRequest,
    body: RequestBody,
    mut policy: RedirectPolicy,
    observer: &mut dyn ExchangeObserver,
) -> Result<Exchange, CurlError> {
    let started = Instant::now();
    let mut hop = first;
    let mut body = body;

    loop {
        if transport.unix_socket.is_none() {
            transport.check_address_family(&hop.url)?;
        }
        let timeout = remaining_budget(transport.deadline, started)?;
        let replay = body.replay();

        observer.before_send(&hop)?;
        log::debug!("Sending {} {} (hop {})", hop.method, hop.url, policy.hops());

        let mut builder = client
            .request(hop.method.clone(), hop.url.clone())
            .headers(hop.headers.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(payload) = body.into_reqwest() {
            builder = builder.body(payload);
        }

        let response = builder.send().await.map_err(|e| {
            let err = CurlError::network(Stage::Execution, e);
            log::debug!("{} {} failed: {}", hop.method, hop.url, err);
            err
        })?;

        let status = response.status();
        log::debug!("{} {} -> {}", hop.method, hop.url, status);

        // The policy only needs to know whether the sent body could be re-sent.
        let sent_body = replay.unwrap_or_else(streamed_marker);
        match policy.decide(&hop, &sent_body, status, response.headers()) {
            RedirectDecision::Follow { next, keep_body } => {
                observer.on_redirect(status, response.headers())?;
                body = if keep_body { sent_body } else { RequestBody::Empty };
                hop = next;
            }
            RedirectDecision::StopWithError { max } => {
                log::debug!("Redirect limit of {} reached at {}", max, hop.url);
                return Err(CurlError::TooManyRedirects { max });
            }
            RedirectDecision::StopSilently => {
                return Ok(Exchange {
                    response,
                    request: hop,
                    redirects: policy.hops(),
                });
            }
        }
    }
}

fn remaining_budget(
    deadline: Option<Duration>,
    started: Instant,
) -> Result<Option<Duration>, CurlError> {
    let Some(budget) = deadline else {
        return Ok(None);
    };
    let remaining = budget.saturating_sub(started.elapsed());
    if remaining.is_zero() {
        return Err(CurlError::Deadline { budget });
    }
    Ok(Some(remaining))
}

/// Stand-in for a body that was already streamed out.
fn streamed_marker() -> RequestBody {
    RequestBody::Streamed {
        origin: "consumed stream".to_string(),
        reader: Box::new(tokio::io::empty()),
    }
}
