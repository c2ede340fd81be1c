//! Import job runner
//!
//! Runs one import attempt and makes sure the requesting user hears about it,
//! whichever way it ends. Failures are reported and logged here and never
//! travel further up: queued jobs run on a worker with nobody waiting on them.

use std::sync::Arc;

use ferry_core::{ImportJobStatus, ImportProjectJob, ImportRequest};
use ferry_import_types::{ImportResult, ImportedProject};
use tracing::{debug, error, warn};

use super::notifier::ImportNotifier;
use super::outcome::{ImportFailure, ImportOutcome, ImportSuccess};
use super::registry::ImporterRegistry;

pub struct ImportJobRunner {
    registry: Arc<ImporterRegistry>,
    notifier: Arc<dyn ImportNotifier>,
    notification_retries: u32,
}

impl ImportJobRunner {
    pub fn new(registry: Arc<ImporterRegistry>, notifier: Arc<dyn ImportNotifier>) -> Self {
        Self {
            registry,
            notifier,
            notification_retries: 0,
        }
    }

    /// Extra delivery attempts when sending the outcome notification fails
    pub fn with_notification_retries(mut self, retries: u32) -> Self {
        self.notification_retries = retries;
        self
    }

    pub fn registry(&self) -> &Arc<ImporterRegistry> {
        &self.registry
    }

    /// Run a request under a fresh job id
    pub async fn run_request(&self, request: ImportRequest) -> ImportOutcome {
        self.run(ImportProjectJob::new(request)).await
    }

    /// Run one job to its terminal outcome and notify the requesting user.
    ///
    /// Every call performs a fresh import; nothing is remembered between runs.
    pub async fn run(&self, job: ImportProjectJob) -> ImportOutcome {
        let ImportProjectJob { job_id, request } = job;
        debug!(
            job_id = %job_id,
            source = %request.source,
            status = %ImportJobStatus::Running,
            "Running import job"
        );

        let outcome = match self.import(&request).await {
            Ok(project) => ImportOutcome::Succeeded(ImportSuccess {
                source: request.source,
                local_project: project,
                requesting_user: request.requesting_user,
            }),
            Err(e) => {
                error!(
                    job_id = %job_id,
                    project_id = %request.external_project_id,
                    user_id = request.requesting_user.id,
                    username = %request.requesting_user.username,
                    error = %e,
                    error_detail = ?e,
                    "Error importing {} project {} (by {}): {}",
                    request.source,
                    request.external_project_id,
                    request.requesting_user,
                    e.detail()
                );
                ImportOutcome::Failed(ImportFailure::new(request, e))
            }
        };

        self.dispatch(&outcome).await;

        debug!(job_id = %job_id, status = %outcome.status(), "Import job finished");
        outcome
    }

    async fn import(&self, request: &ImportRequest) -> ImportResult<ImportedProject> {
        let provider = self.registry.provider(request.source)?;
        let importer = provider.importer(&request.requesting_user, &request.access_token);
        importer
            .import_project(&request.external_project_id, &request.options)
            .await
    }

    /// Best-effort delivery: a notification that cannot be sent never changes the outcome
    async fn dispatch(&self, outcome: &ImportOutcome) {
        let mut attempt = 0;
        loop {
            let result = match outcome {
                ImportOutcome::Succeeded(success) => self.notifier.notify_success(success).await,
                ImportOutcome::Failed(failure) => self.notifier.notify_failure(failure).await,
            };

            match result {
                Ok(()) => return,
                Err(e) if attempt < self.notification_retries => {
                    attempt += 1;
                    debug!(
                        user_id = outcome.requesting_user().id,
                        attempt,
                        "Retrying import notification after error: {}",
                        e
                    );
                }
                Err(e) => {
                    warn!(
                        user_id = outcome.requesting_user().id,
                        status = %outcome.status(),
                        "Failed to deliver import notification: {}",
                        e
                    );
                    return;
                }
            }
        }
    }
}
