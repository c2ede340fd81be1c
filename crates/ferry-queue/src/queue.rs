use std::sync::Arc;

use ferry_core::async_trait::async_trait;
use ferry_core::{Job, JobQueue, JobReceiver, QueueError};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Bounded job queue with a single consumer.
///
/// `send` waits while the buffer is full, so an accepted job is never dropped
/// to make room for a newer one.
#[derive(Clone)]
pub struct QueueService {
    job_sender: mpsc::Sender<Job>,
}

// Wrapper for mpsc::Receiver to implement JobReceiver trait
pub struct QueueJobReceiver {
    receiver: mpsc::Receiver<Job>,
}

#[async_trait]
impl JobReceiver for QueueJobReceiver {
    async fn recv(&mut self) -> Result<Job, QueueError> {
        match self.receiver.recv().await {
            Some(job) => {
                debug!("📨 Received job: {}", job);
                Ok(job)
            }
            None => {
                debug!("Job channel closed");
                Err(QueueError::ChannelClosed)
            }
        }
    }
}

#[async_trait]
impl JobQueue for QueueService {
    async fn send(&self, job: Job) -> Result<(), QueueError> {
        debug!(
            "🚀 JobQueue::send - queueing job {} ({} slots free)",
            job,
            self.job_sender.capacity()
        );

        let description = job.to_string();
        self.job_sender.send(job).await.map_err(|e| {
            error!("❌ Failed to queue job {}: receiver is gone", description);
            QueueError::SendError(e.to_string())
        })
    }
}

impl QueueService {
    pub fn new(job_sender: mpsc::Sender<Job>) -> Self {
        Self { job_sender }
    }

    /// Panics if `buffer_size` is zero
    pub fn create_channel(buffer_size: usize) -> (QueueService, QueueJobReceiver) {
        debug!("🔧 Creating job channel with buffer size: {}", buffer_size);
        let (sender, receiver) = mpsc::channel(buffer_size);
        (QueueService::new(sender), QueueJobReceiver { receiver })
    }

    /// Queue as a `JobQueue` trait object plus the receiver for its one worker
    pub fn create_job_queue_arc_with_receiver(
        buffer_size: usize,
    ) -> (Arc<dyn JobQueue>, Box<dyn JobReceiver>) {
        let (queue, receiver) = Self::create_channel(buffer_size);
        (Arc::new(queue), Box::new(receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::{AccessToken, ImportOptions, ImportProjectJob, ImportRequest, ImportSource, UserRef};
    use tokio::time::{timeout, Duration};

    fn import_job(project_id: &str) -> Job {
        Job::ImportProject(ImportProjectJob::new(ImportRequest {
            source: ImportSource::Asana,
            requesting_user: UserRef::new(1, "bob", "bob@example.com"),
            access_token: AccessToken::new("token"),
            external_project_id: project_id.to_string(),
            options: ImportOptions::new(),
        }))
    }

    fn project_of(job: Job) -> String {
        match job {
            Job::ImportProject(data) => data.request.external_project_id,
        }
    }

    #[tokio::test]
    async fn test_trait_based_usage() {
        let (queue, mut receiver) = QueueService::create_job_queue_arc_with_receiver(10);

        queue.send(import_job("42")).await.unwrap();

        let job = timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("Should receive job within timeout")
            .expect("Should receive a job");
        assert_eq!(project_of(job), "42");
    }

    #[tokio::test]
    async fn test_send_waits_for_room_instead_of_dropping() {
        let (queue, mut receiver) = QueueService::create_channel(1);
        queue.send(import_job("1")).await.unwrap();

        // Buffer is full: the second send parks until the first job is taken
        let blocked = timeout(Duration::from_millis(50), queue.send(import_job("2"))).await;
        assert!(blocked.is_err());

        let sender = queue.clone();
        let pending = tokio::spawn(async move { sender.send(import_job("2")).await });
        assert_eq!(project_of(receiver.recv().await.unwrap()), "1");
        pending.await.unwrap().unwrap();
        assert_eq!(project_of(receiver.recv().await.unwrap()), "2");
    }

    #[tokio::test]
    async fn test_send_without_receiver_fails() {
        let (queue, receiver) = QueueService::create_channel(10);
        drop(receiver);

        let result = queue.send(import_job("42")).await;
        assert!(matches!(result, Err(QueueError::SendError(_))));
    }

    #[test]
    fn test_buffered_jobs_drain_before_close() {
        let (queue, mut receiver) = QueueService::create_channel(4);
        tokio_test::block_on(queue.send(import_job("1"))).unwrap();
        tokio_test::block_on(queue.send(import_job("2"))).unwrap();
        drop(queue);

        assert_eq!(project_of(tokio_test::block_on(receiver.recv()).unwrap()), "1");
        assert_eq!(project_of(tokio_test::block_on(receiver.recv()).unwrap()), "2");
        assert!(matches!(
            tokio_test::block_on(receiver.recv()),
            Err(QueueError::ChannelClosed)
        ));
    }
}
