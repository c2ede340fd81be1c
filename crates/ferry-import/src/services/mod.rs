//! Import job services

mod executor;
mod notifier;
mod outcome;
mod registry;
mod runner;
mod worker;

pub use executor::{ImportExecutor, Submission};
pub use notifier::{EmailImportNotifier, ImportNotifier};
pub use outcome::{ImportFailure, ImportOutcome, ImportSuccess};
pub use registry::ImporterRegistry;
pub use runner::ImportJobRunner;
pub use worker::ImportWorker;

use axum::http::StatusCode;
use ferry_core::problemdetails::{self, Problem};
use ferry_core::{ImportSource, QueueError};
use ferry_import_types::ImportError;
use thiserror::Error;

/// Import service errors
#[derive(Error, Debug)]
pub enum ImportServiceError {
    #[error("{0} param needed")]
    MissingParameter(&'static str),

    #[error("Import source not available: {0}")]
    SourceNotAvailable(ImportSource),

    #[error("Invalid {0} api request")]
    InvalidApiRequest(ImportSource),

    #[error("{service} request failed: {message}")]
    Remote {
        service: ImportSource,
        message: String,
    },

    #[error("{message}: {reason}")]
    ImportFailed { message: String, reason: String },

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

impl ImportServiceError {
    /// Classify an importer error raised while serving an HTTP request
    pub fn from_remote(source: ImportSource, error: ImportError) -> Self {
        match error {
            ImportError::InvalidRequest(_) | ImportError::InvalidAuthResult(_) => {
                ImportServiceError::InvalidApiRequest(source)
            }
            ImportError::SourceNotAvailable(_) => ImportServiceError::SourceNotAvailable(source),
            other => ImportServiceError::Remote {
                service: source,
                message: other.to_string(),
            },
        }
    }
}

impl From<ImportFailure> for ImportServiceError {
    fn from(failure: ImportFailure) -> Self {
        ImportServiceError::ImportFailed {
            message: failure.message,
            reason: failure.error.to_string(),
        }
    }
}

/// Result type for import services
pub type ImportServiceResult<T> = Result<T, ImportServiceError>;

impl From<ImportServiceError> for Problem {
    fn from(error: ImportServiceError) -> Self {
        let detail = error.to_string();
        match error {
            ImportServiceError::MissingParameter(_) => problemdetails::new(StatusCode::BAD_REQUEST)
                .with_title("Missing Parameter")
                .with_detail(detail),
            ImportServiceError::SourceNotAvailable(_) => {
                problemdetails::new(StatusCode::BAD_REQUEST)
                    .with_title("Source Not Available")
                    .with_detail(detail)
            }
            ImportServiceError::InvalidApiRequest(_) => {
                problemdetails::new(StatusCode::BAD_REQUEST)
                    .with_title("Invalid Request")
                    .with_detail(detail)
            }
            ImportServiceError::Remote { .. } => problemdetails::new(StatusCode::BAD_REQUEST)
                .with_title("Remote Service Error")
                .with_detail(detail),
            ImportServiceError::ImportFailed { message, reason } => {
                problemdetails::new(StatusCode::BAD_REQUEST)
                    .with_title(message)
                    .with_detail(reason)
            }
            ImportServiceError::Queue(_) => {
                problemdetails::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .with_title("Queue Error")
                    .with_detail(detail)
            }
        }
    }
}
