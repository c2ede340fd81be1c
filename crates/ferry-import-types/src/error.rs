//! Error types for the import system

use thiserror::Error;

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors an importer can surface.
///
/// The job runner treats every variant the same way; the split only matters
/// to the HTTP layer, which maps a few of them to friendlier messages.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The remote service rejected the request (bad OAuth code, unknown project)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// OAuth exchange returned something that is not a usable token
    #[error("Invalid authorization result: {0}")]
    InvalidAuthResult(String),

    /// The remote call itself failed (network, 5xx, malformed payload)
    #[error("Request failed: {0}")]
    FailedRequest(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No importer is registered for the requested source
    #[error("Import source not available: {0}")]
    SourceNotAvailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// Display plus the chain of underlying causes, for diagnostics
    pub fn detail(&self) -> String {
        match self {
            ImportError::Other(inner) => format!("{:#}", inner),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::FailedRequest(format!("Malformed remote data: {}", err))
    }
}
