//! Queue consumer that runs import jobs in the background

use std::sync::Arc;

use ferry_core::{Job, JobReceiver, QueueError};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info};

use super::runner::ImportJobRunner;

/// Pulls import jobs off the queue and runs up to `concurrency` of them at once.
///
/// While every slot is busy the worker stops pulling, so the bounded queue
/// fills up and pushes back on submitters. Jobs carry no ordering guarantee
/// relative to each other, even for the same user.
pub struct ImportWorker {
    runner: Arc<ImportJobRunner>,
    concurrency: usize,
}

impl ImportWorker {
    pub fn new(runner: Arc<ImportJobRunner>, concurrency: usize) -> Self {
        Self {
            runner,
            concurrency: concurrency.max(1),
        }
    }

    pub fn spawn(self, receiver: Box<dyn JobReceiver>) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver))
    }

    /// Consume jobs until the queue closes, then wait for in-flight imports
    pub async fn run(self, mut receiver: Box<dyn JobReceiver>) {
        info!(
            "Import worker started (concurrency: {})",
            self.concurrency
        );
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        loop {
            match receiver.recv().await {
                Ok(Job::ImportProject(job)) => {
                    let Ok(permit) = permits.clone().acquire_owned().await else {
                        break;
                    };
                    debug!("Import worker picked up job {}", job.job_id);

                    let runner = self.runner.clone();
                    tasks.spawn(async move {
                        let _permit = permit;
                        runner.run(job).await;
                    });

                    while let Some(finished) = tasks.try_join_next() {
                        if let Err(e) = finished {
                            error!("Import task aborted: {}", e);
                        }
                    }
                }
                Err(QueueError::ChannelClosed) => {
                    info!("Import queue closed, stopping worker");
                    break;
                }
                Err(e) => {
                    error!("Import worker failed to receive job: {}", e);
                }
            }
        }

        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                error!("Import task aborted: {}", e);
            }
        }
    }
}
