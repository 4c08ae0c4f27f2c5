//! Error type definitions.
//!
//! `CurlError` is the single failure type returned by the pipeline. Every
//! variant records the [`Stage`] that failed so callers can report where the
//! exchange stopped.

use std::fmt;
use std::io;
use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use super::categorization::{categorize_reqwest_error, error_chain};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Pipeline stage in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum Stage {
    RequestBuild,
    TlsSetup,
    Transport,
    Execution,
    Rendering,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RequestBuild => "request build",
            Stage::TlsSetup => "TLS setup",
            Stage::Transport => "transport setup",
            Stage::Execution => "request execution",
            Stage::Rendering => "response rendering",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad or unreadable local input, unparsable URL, malformed TLS material.
    Configuration,
    /// DNS, connect, TLS handshake, timeout, redirect limit.
    Network,
    /// Writing the rendered response failed.
    Output,
}

/// Kind of transport failure, derived from `reqwest::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum NetworkErrorKind {
    Builder,
    Redirect,
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Other,
}

impl NetworkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkErrorKind::Builder => "HTTP request builder error",
            NetworkErrorKind::Redirect => "HTTP request redirect error",
            NetworkErrorKind::Timeout => "HTTP request timeout error",
            NetworkErrorKind::Connect => "HTTP request connect error",
            NetworkErrorKind::Request => "HTTP request error",
            NetworkErrorKind::Body => "HTTP request body error",
            NetworkErrorKind::Decode => "HTTP request decode error",
            NetworkErrorKind::Other => "HTTP request other error",
        }
    }
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one exchange.
#[derive(Error, Debug)]
pub enum CurlError {
    /// Local input could not be used.
    #[error("{stage} failed: {message}")]
    Configuration { stage: Stage, message: String },

    /// The transport reported a failure.
    #[error("{stage} failed: {kind}: {detail}")]
    Network {
        stage: Stage,
        kind: NetworkErrorKind,
        detail: String,
        #[source]
        source: reqwest::Error,
    },

    /// The redirect limit was reached.
    #[error("request execution failed: stopped after {max} redirects")]
    TooManyRedirects { max: usize },

    /// The overall time budget ran out.
    #[error("request execution failed: operation timed out after {budget:?}")]
    Deadline { budget: Duration },

    /// Writing output failed.
    #[error("{stage} failed: {context}: {source}")]
    Output {
        stage: Stage,
        context: String,
        #[source]
        source: io::Error,
    },
}

impl CurlError {
    pub fn configuration(stage: Stage, message: impl Into<String>) -> Self {
        CurlError::Configuration {
            stage,
            message: message.into(),
        }
    }

    pub fn network(stage: Stage, source: reqwest::Error) -> Self {
        CurlError::Network {
            stage,
            kind: categorize_reqwest_error(&source),
            detail: error_chain(&source),
            source,
        }
    }

    pub fn output(stage: Stage, context: impl Into<String>, source: io::Error) -> Self {
        CurlError::Output {
            stage,
            context: context.into(),
            source,
        }
    }

    /// Stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            CurlError::Configuration { stage, .. }
            | CurlError::Network { stage, .. }
            | CurlError::Output { stage, .. } => *stage,
            CurlError::TooManyRedirects { .. } | CurlError::Deadline { .. } => Stage::Execution,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CurlError::Configuration { .. } => ErrorCategory::Configuration,
            CurlError::Network { .. }
            | CurlError::TooManyRedirects { .. }
            | CurlError::Deadline { .. } => ErrorCategory::Network,
            CurlError::Output { .. } => ErrorCategory::Output,
        }
    }

    /// Transport failure kind, if this is a network error.
    pub fn network_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            CurlError::Network { kind, .. } => Some(*kind),
            CurlError::TooManyRedirects { .. } => Some(NetworkErrorKind::Redirect),
            CurlError::Deadline { .. } => Some(NetworkErrorKind::Timeout),
            _ => None,
        }
    }
}
