//! TLS trust configuration.
//!
//! Derives the TLS trust and identity settings for an exchange from file-based
//! inputs:
//! - Verification mode (strict, or insecure when explicitly requested)
//! - Root CA set (PEM bundle, or the Mozilla roots from `webpki-roots`)
//! - Optional client identity (PEM certificate chain + private key)
//!
//! The result converts into a `rustls::ClientConfig` that the transport hands
//! to `reqwest` as a preconfigured TLS backend.

mod trust;
mod verifier;

pub use trust::{ClientIdentity, TlsTrustConfig, Verification};
pub use verifier::NoVerifier;
