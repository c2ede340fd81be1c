//! Wiring for the import subsystem

use std::sync::Arc;

use axum::Router;
use ferry_core::{ConfigError, ExecutionMode, ImportSettings};
use ferry_queue::QueueService;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use utoipa::OpenApi;

use crate::handlers::{self, types::AppState, ImportApiDoc};
use crate::services::{
    ImportExecutor, ImportJobRunner, ImportNotifier, ImportWorker, ImporterRegistry,
};

/// Running import subsystem: handler state plus the background worker, if any
pub struct ImportPlugin {
    state: Arc<AppState>,
    worker: Option<JoinHandle<()>>,
}

impl ImportPlugin {
    /// Build the runner and executor for `settings`, spawning the queue worker
    /// in queued mode. Must be called inside a tokio runtime.
    pub fn start(
        settings: &ImportSettings,
        registry: ImporterRegistry,
        notifier: Arc<dyn ImportNotifier>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let registry = Arc::new(registry);
        let runner = Arc::new(
            ImportJobRunner::new(registry.clone(), notifier)
                .with_notification_retries(settings.notification_retries),
        );

        let (executor, worker) = match settings.execution_mode {
            ExecutionMode::Inline => (ImportExecutor::inline(runner), None),
            ExecutionMode::Queued => {
                let (queue, receiver) =
                    QueueService::create_job_queue_arc_with_receiver(settings.queue_capacity);
                let worker =
                    ImportWorker::new(runner, settings.worker_concurrency).spawn(receiver);
                debug!("Import worker spawned");

                (ImportExecutor::queued(queue), Some(worker))
            }
        };

        info!(
            "Import plugin started (mode: {}, sources: {:?})",
            settings.execution_mode,
            registry.sources()
        );

        Ok(Self {
            state: Arc::new(AppState { registry, executor }),
            worker,
        })
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn mode(&self) -> ExecutionMode {
        self.state.executor.mode()
    }

    /// Importer routes bound to this plugin's state
    pub fn router(&self) -> Router {
        handlers::configure_routes().with_state(self.state.clone())
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        ImportApiDoc::openapi()
    }

    /// Stop accepting queued jobs and wait for the worker to finish what it has.
    ///
    /// The queue closes when its last sender drops, so routers built from this
    /// plugin must be dropped first or this never returns.
    pub async fn shutdown(self) {
        let Self { state, worker } = self;
        drop(state);

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Import worker panicked: {}", e);
            }
        }
    }
}
