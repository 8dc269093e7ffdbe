use std::path::PathBuf;
use thiserror::Error;

/// The main error type for spritesort operations.
#[derive(Debug, Error)]
pub enum SpritesortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no API key found; tried {tried}")]
    MissingCredential { tried: String },

    #[error("source folder not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    #[error("classification service returned an empty reply")]
    EmptyResponse,

    #[error("{message}")]
    TransientService {
        /// Set when the service reported its rate limit was hit (HTTP 429).
        quota_exceeded: bool,
        /// Server-suggested wait in seconds, from the `retry-after` header.
        retry_after: Option<f64>,
        message: String,
    },

    #[error("transport error: {message}")]
    UnexpectedTransport { message: String },

    #[error("classification failed after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<SpritesortError>,
    },

    #[error("no free name for '{stem}' in {} after 98 numbered alternatives", dir.display())]
    NameSpaceExhausted { stem: String, dir: PathBuf },
}

impl SpritesortError {
    /// Whether the retry policy should treat this failure as a quota signal.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(
            self,
            SpritesortError::TransientService {
                quota_exceeded: true,
                ..
            }
        )
    }

    /// Server-suggested retry delay in seconds, when one was provided.
    pub fn suggested_retry_after(&self) -> Option<f64> {
        match self {
            SpritesortError::TransientService { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
