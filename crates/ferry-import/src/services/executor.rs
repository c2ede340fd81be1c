//! Inline vs. queued execution of import jobs

use std::sync::Arc;

use ferry_core::{
    ExecutionMode, ImportJobStatus, ImportProjectJob, ImportRequest, Job, JobQueue, QueueError,
};
use tracing::debug;
use uuid::Uuid;

use super::outcome::ImportOutcome;
use super::runner::ImportJobRunner;

/// What the caller gets back from a submission
#[derive(Debug)]
pub enum Submission {
    /// The job ran on the caller's task
    Completed(ImportOutcome),
    /// The job is waiting for a worker
    Enqueued { job_id: Uuid },
}

/// Strategy for running submitted import jobs
#[derive(Clone)]
pub enum ImportExecutor {
    Inline(Arc<ImportJobRunner>),
    Queued(Arc<dyn JobQueue>),
}

impl ImportExecutor {
    pub fn inline(runner: Arc<ImportJobRunner>) -> Self {
        ImportExecutor::Inline(runner)
    }

    pub fn queued(queue: Arc<dyn JobQueue>) -> Self {
        ImportExecutor::Queued(queue)
    }

    pub fn mode(&self) -> ExecutionMode {
        match self {
            ImportExecutor::Inline(_) => ExecutionMode::Inline,
            ImportExecutor::Queued(_) => ExecutionMode::Queued,
        }
    }

    /// Run the request now or hand it to the queue, depending on the strategy.
    ///
    /// Inline submissions never fail here: import errors come back inside
    /// `Submission::Completed`. Queued submissions fail only when the job
    /// cannot be enqueued.
    pub async fn submit(&self, request: ImportRequest) -> Result<Submission, QueueError> {
        let job = ImportProjectJob::new(request);
        debug!(
            job_id = %job.job_id,
            mode = %self.mode(),
            status = %ImportJobStatus::Pending,
            "Import job submitted"
        );

        match self {
            ImportExecutor::Inline(runner) => Ok(Submission::Completed(runner.run(job).await)),
            ImportExecutor::Queued(queue) => {
                let job_id = job.job_id;
                queue.send(Job::ImportProject(job)).await?;
                Ok(Submission::Enqueued { job_id })
            }
        }
    }
}
