//! Request body sourcing.
//!
//! Exactly one body source is active per request. Precedence, highest first:
//! upload file, `@` (standard input), `@path` (file read into memory), literal
//! text, no body.

use std::path::PathBuf;

use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::config::{RequestConfiguration, FILE_REFERENCE_PREFIX, UPLOAD_CHUNK_SIZE};
use crate::error_handling::{CurlError, Stage};

/// Where the request payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    None,
    Literal(String),
    File(PathBuf),
    Stdin,
    Upload(PathBuf),
}

impl BodySource {
    pub fn is_present(&self) -> bool {
        !matches!(self, BodySource::None)
    }
}

/// Picks the active body source for a configuration.
pub fn resolve_body_source(config: &RequestConfiguration) -> BodySource {
    if let Some(path) = &config.upload_file {
        return BodySource::Upload(path.clone());
    }
    match config.data() {
        None => BodySource::None,
        Some(data) => match data.strip_prefix(FILE_REFERENCE_PREFIX) {
            Some("") => BodySource::Stdin,
            Some(path) => BodySource::File(PathBuf::from(path)),
            None => BodySource::Literal(data.to_string()),
        },
    }
}

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// A payload ready to be sent.
///
/// Buffered payloads can be re-sent on a redirect; streamed ones (upload file,
/// standard input) are consumed by the first send.
pub enum RequestBody {
    Empty,
    Buffered(Vec<u8>),
    Streamed { origin: String, reader: BoxedReader },
}

impl RequestBody {
    /// Opens or reads the given source.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the path if the upload file cannot
    /// be opened or the data file cannot be read.
    pub async fn load(source: &BodySource) -> Result<Self, CurlError> {
        match source {
            BodySource::None => Ok(RequestBody::Empty),
            BodySource::Literal(text) => Ok(RequestBody::Buffered(text.clone().into_bytes())),
            BodySource::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    CurlError::configuration(
                        Stage::RequestBuild,
                        format!("failed to read data file {}: {}", path.display(), e),
                    )
                })?;
                Ok(RequestBody::Buffered(bytes))
            }
            BodySource::Stdin => Ok(RequestBody::Streamed {
                origin: "standard input".to_string(),
                reader: Box::new(tokio::io::stdin()),
            }),
            BodySource::Upload(path) => {
                let file = tokio::fs::File::open(path).await.map_err(|e| {
                    CurlError::configuration(
                        Stage::RequestBuild,
                        format!("failed to open upload file {}: {}", path.display(), e),
                    )
                })?;
                Ok(RequestBody::Streamed {
                    origin: path.display().to_string(),
                    reader: Box::new(file),
                })
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    pub fn is_replayable(&self) -> bool {
        !matches!(self, RequestBody::Streamed { .. })
    }

    /// Returns a copy for re-sending, or `None` for streamed bodies.
    pub fn replay(&self) -> Option<RequestBody> {
        match self {
            RequestBody::Empty => Some(RequestBody::Empty),
            RequestBody::Buffered(bytes) => Some(RequestBody::Buffered(bytes.clone())),
            RequestBody::Streamed { .. } => None,
        }
    }

    /// Buffered bytes, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RequestBody::Buffered(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_reqwest(self) -> Option<reqwest::Body> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Buffered(bytes) => Some(reqwest::Body::from(bytes)),
            RequestBody::Streamed { origin, reader } => {
                log::debug!("Streaming request body from {}", origin);
                Some(reqwest::Body::wrap_stream(ReaderStream::with_capacity(
                    reader,
                    UPLOAD_CHUNK_SIZE,
                )))
            }
        }
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Buffered(bytes) => write!(f, "Buffered({} bytes)", bytes.len()),
            RequestBody::Streamed { origin, .. } => write!(f, "Streamed({})", origin),
        }
    }
}
