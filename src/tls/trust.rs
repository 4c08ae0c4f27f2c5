//! TLS trust and identity assembly from PEM files.

use std::path::Path;
use std::sync::Arc;

use rustls::crypto::{ring::default_provider, CryptoProvider};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};

use super::verifier::NoVerifier;
use crate::config::RequestConfiguration;
use crate::error_handling::{CurlError, Stage};

/// Whether the server certificate is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Strict,
    Insecure,
}

/// Client certificate chain and its private key.
#[derive(Debug)]
pub struct ClientIdentity {
    pub certs: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

/// Trust and identity inputs for the TLS layer.
///
/// `roots` is `None` when the built-in Mozilla root set applies. In insecure
/// mode `roots` is always `None`: the CA bundle is never read.
#[derive(Debug)]
pub struct TlsTrustConfig {
    pub verification: Verification,
    pub roots: Option<Vec<CertificateDer<'static>>>,
    pub identity: Option<ClientIdentity>,
}

impl TlsTrustConfig {
    /// Reads the TLS inputs named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the file if the CA bundle is
    /// unreadable or holds no certificate, or if the client certificate/key
    /// pair cannot be loaded.
    pub fn from_configuration(config: &RequestConfiguration) -> Result<Self, CurlError> {
        let verification = if config.insecure {
            Verification::Insecure
        } else {
            Verification::Strict
        };

        let roots = match (&config.cacert, verification) {
            (Some(path), Verification::Strict) => Some(load_ca_bundle(path)?),
            (Some(path), Verification::Insecure) => {
                log::debug!(
                    "Insecure mode: not loading CA bundle {}",
                    path.display()
                );
                None
            }
            (None, _) => None,
        };

        let identity = match (&config.cert, &config.key) {
            (Some(cert), Some(key)) => Some(load_identity(cert, key)?),
            (Some(_), None) | (None, Some(_)) => {
                log::warn!("Client certificate and key must both be given; ignoring the one supplied");
                None
            }
            (None, None) => None,
        };

        Ok(TlsTrustConfig {
            verification,
            roots,
            identity,
        })
    }

    pub fn is_insecure(&self) -> bool {
        self.verification == Verification::Insecure
    }

    /// Builds the rustls client configuration (ring provider, HTTP/1.1 ALPN).
    ///
    /// # Errors
    ///
    /// Returns a configuration error if rustls rejects the root set or the
    /// client identity (e.g. the key does not match the certificate).
    pub fn into_client_config(self) -> Result<ClientConfig, CurlError> {
        let provider: Arc<CryptoProvider> = Arc::new(default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .map_err(|e| tls_error(format!("unsupported TLS protocol versions: {}", e)))?;

        let builder = match self.verification {
            Verification::Insecure => builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier::new(&provider))),
            Verification::Strict => {
                let mut store = RootCertStore::empty();
                match self.roots {
                    Some(roots) => {
                        let (added, ignored) = store.add_parsable_certificates(roots);
                        if ignored > 0 {
                            log::warn!("Ignored {} unusable certificate(s) in CA bundle", ignored);
                        }
                        if added == 0 {
                            return Err(tls_error("CA bundle contains no usable certificates"));
                        }
                    }
                    None => store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned()),
                }
                builder.with_root_certificates(store)
            }
        };

        let mut client_config = match self.identity {
            Some(identity) => builder
                .with_client_auth_cert(identity.certs, identity.key)
                .map_err(|e| tls_error(format!("failed to load client certificate: {}", e)))?,
            None => builder.with_no_client_auth(),
        };
        client_config.alpn_protocols = vec![b"http/1.1".to_vec()];

        Ok(client_config)
    }
}

fn tls_error(message: impl Into<String>) -> CurlError {
    CurlError::configuration(Stage::TlsSetup, message)
}

/// Parses every PEM certificate in the bundle.
///
/// Blocks that fail to decode are skipped; the bundle is rejected only when no
/// certificate at all could be read.
fn load_ca_bundle(path: &Path) -> Result<Vec<CertificateDer<'static>>, CurlError> {
    let pem = std::fs::read(path).map_err(|e| {
        tls_error(format!(
            "failed to read CA certificate {}: {}",
            path.display(),
            e
        ))
    })?;

    let certs: Vec<CertificateDer<'static>> = CertificateDer::pem_slice_iter(&pem)
        .filter_map(|cert| match cert {
            Ok(cert) => Some(cert),
            Err(e) => {
                log::debug!("Skipping undecodable block in {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    if certs.is_empty() {
        return Err(tls_error(format!(
            "failed to parse CA certificate {}: no valid certificates found",
            path.display()
        )));
    }
    log::debug!("Loaded {} CA certificate(s) from {}", certs.len(), path.display());
    Ok(certs)
}

fn load_identity(cert_path: &Path, key_path: &Path) -> Result<ClientIdentity, CurlError> {
    let certs = CertificateDer::pem_file_iter(cert_path)
        .and_then(|iter| iter.collect::<Result<Vec<_>, _>>())
        .map_err(|e| {
            tls_error(format!(
                "failed to load client certificate {}: {}",
                cert_path.display(),
                e
            ))
        })?;
    if certs.is_empty() {
        return Err(tls_error(format!(
            "failed to load client certificate {}: no certificate found",
            cert_path.display()
        )));
    }

    let key = PrivateKeyDer::from_pem_file(key_path).map_err(|e| {
        tls_error(format!(
            "failed to load client key {}: {}",
            key_path.display(),
            e
        ))
    })?;

    Ok(ClientIdentity { certs, key })
}
