use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ImportRequest;

/// One execution attempt of an import request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportProjectJob {
    pub job_id: Uuid,
    pub request: ImportRequest,
}

impl ImportProjectJob {
    pub fn new(request: ImportRequest) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            request,
        }
    }
}

/// Lifecycle of an import job: `Pending -> Running -> Succeeded | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportJobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl ImportJobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportJobStatus::Succeeded | ImportJobStatus::Failed)
    }
}

impl fmt::Display for ImportJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ImportJobStatus::Pending => "pending",
            ImportJobStatus::Running => "running",
            ImportJobStatus::Succeeded => "succeeded",
            ImportJobStatus::Failed => "failed",
        };
        f.write_str(status)
    }
}

/// Core job enum containing all possible job types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Job {
    ImportProject(ImportProjectJob),
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::ImportProject(job) => write!(
                f,
                "ImportProject(job_id: {}, source: {}, project: {}, user: {})",
                job.job_id,
                job.request.source,
                job.request.external_project_id,
                job.request.requesting_user.id
            ),
        }
    }
}

// Core queue abstraction - ferry-queue implements this
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to send job: {0}")]
    SendError(String),
    #[error("Queue channel closed")]
    ChannelClosed,
}

/// Core trait for job queue operations
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Send a job to the queue, waiting for room when it is full
    async fn send(&self, job: Job) -> Result<(), QueueError>;
}

/// Core trait for receiving jobs
#[async_trait]
pub trait JobReceiver: Send {
    /// Receive the next job; `ChannelClosed` once every sender is gone and
    /// the buffered jobs have been handed out
    async fn recv(&mut self) -> Result<Job, QueueError>;
}
