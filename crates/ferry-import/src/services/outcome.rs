//! Terminal values of an import job

use ferry_core::{ImportJobStatus, ImportRequest, ImportSource, UserRef};
use ferry_import_types::{ImportError, ImportedProject};

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSuccess {
    pub source: ImportSource,
    pub local_project: ImportedProject,
    pub requesting_user: UserRef,
}

/// Result of a failed run, carrying the original error
#[derive(Debug)]
pub struct ImportFailure {
    pub source: ImportSource,
    pub requesting_user: UserRef,
    pub external_project_id: String,
    pub error: ImportError,
    /// User-facing summary, e.g. "Error importing GitHub project"
    pub message: String,
}

impl ImportFailure {
    pub fn new(request: ImportRequest, error: ImportError) -> Self {
        Self {
            source: request.source,
            message: format!("Error importing {} project", request.source.display_name()),
            requesting_user: request.requesting_user,
            external_project_id: request.external_project_id,
            error,
        }
    }
}

/// Exactly one of these comes out of every job
#[derive(Debug)]
pub enum ImportOutcome {
    Succeeded(ImportSuccess),
    Failed(ImportFailure),
}

impl ImportOutcome {
    pub fn status(&self) -> ImportJobStatus {
        match self {
            ImportOutcome::Succeeded(_) => ImportJobStatus::Succeeded,
            ImportOutcome::Failed(_) => ImportJobStatus::Failed,
        }
    }

    pub fn requesting_user(&self) -> &UserRef {
        match self {
            ImportOutcome::Succeeded(success) => &success.requesting_user,
            ImportOutcome::Failed(failure) => &failure.requesting_user,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Succeeded(_))
    }

    /// The imported project, turning a failure back into its error
    pub fn into_result(self) -> Result<ImportSuccess, ImportFailure> {
        match self {
            ImportOutcome::Succeeded(success) => Ok(success),
            ImportOutcome::Failed(failure) => Err(failure),
        }
    }
}
