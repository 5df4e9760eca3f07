use std::sync::Arc;

use ravenq_core::async_trait::async_trait;
use ravenq_core::{EventEnvelope, Job, JobQueue, JobReceiver, QueueError};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum QueueServiceError {
    #[error("Failed to send job to queue: {details}")]
    QueueSendError { details: String, job_type: String },

    #[error("Queue channel closed")]
    QueueChannelClosed { job_type: String },
}

impl<T> From<mpsc::error::SendError<T>> for QueueServiceError {
    fn from(_err: mpsc::error::SendError<T>) -> Self {
        QueueServiceError::QueueChannelClosed {
            job_type: "unknown".to_string(),
        }
    }
}

/// Single-consumer queue backed by an mpsc channel.
#[derive(Clone)]
pub struct QueueService {
    job_sender: mpsc::Sender<Job>,
}

/// Multi-consumer queue backed by a broadcast channel.
#[derive(Clone)]
pub struct BroadcastQueueService {
    broadcast_sender: broadcast::Sender<Job>,
}

// Wrapper for broadcast::Receiver to implement the JobReceiver trait
pub struct BroadcastJobReceiver {
    receiver: broadcast::Receiver<Job>,
}

#[async_trait]
impl JobReceiver for BroadcastJobReceiver {
    async fn recv(&mut self) -> Result<Job, QueueError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => {
                error!("Broadcast channel closed");
                QueueError::ChannelClosed
            }
            broadcast::error::RecvError::Lagged(n) => {
                error!("Receiver lagged by {} jobs", n);
                QueueError::ReceiveError(format!("Receiver lagged by {} jobs", n))
            }
        })
    }
}

#[async_trait]
impl JobQueue for BroadcastQueueService {
    async fn send(&self, job: Job) -> Result<(), QueueError> {
        debug!("Broadcasting job: {}", job);

        if self.broadcast_sender.receiver_count() == 0 {
            error!("No subscribers on the broadcast channel, job will be lost: {}", job);
        }

        self.broadcast_sender.send(job).map_err(|e| {
            error!("Failed to broadcast job: {}", e);
            QueueError::SendError(format!("Broadcast send failed: {}", e))
        })?;
        Ok(())
    }

    fn subscribe(&self) -> Box<dyn JobReceiver> {
        Box::new(BroadcastJobReceiver {
            receiver: self.broadcast_sender.subscribe(),
        })
    }
}

impl QueueService {
    pub fn new(job_sender: mpsc::Sender<Job>) -> Self {
        Self { job_sender }
    }

    pub fn create_channel(buffer_size: usize) -> (QueueService, mpsc::Receiver<Job>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (QueueService::new(sender), receiver)
    }

    /// Enqueue a delivery envelope.
    pub async fn publish_delivery(
        &self,
        envelope: EventEnvelope,
    ) -> Result<(), QueueServiceError> {
        debug!("Queueing delivery job for {}", envelope.url());
        self.job_sender
            .send(Job::DeliverEvent(envelope))
            .await
            .map_err(|e| {
                error!("Failed to queue delivery job: {}", e);
                QueueServiceError::QueueSendError {
                    details: e.to_string(),
                    job_type: "deliver_event".to_string(),
                }
            })?;
        Ok(())
    }
}

impl BroadcastQueueService {
    pub fn new(broadcast_sender: broadcast::Sender<Job>) -> Self {
        Self { broadcast_sender }
    }

    pub fn create_broadcast_channel(
        buffer_size: usize,
    ) -> (BroadcastQueueService, broadcast::Receiver<Job>) {
        let (sender, receiver) = broadcast::channel(buffer_size);
        (BroadcastQueueService::new(sender), receiver)
    }

    /// Create a new broadcast queue that implements the JobQueue trait
    /// Returns (queue, keep_alive_receiver) - the receiver must be kept alive!
    pub fn create_job_queue_with_receiver(
        buffer_size: usize,
    ) -> (Box<dyn JobQueue>, broadcast::Receiver<Job>) {
        let (sender, receiver) = broadcast::channel(buffer_size);
        (Box::new(BroadcastQueueService::new(sender)), receiver)
    }

    /// Create a new broadcast queue that implements the JobQueue trait
    /// Returns (queue, keep_alive_receiver) - the receiver must be kept alive!
    pub fn create_job_queue_arc_with_receiver(
        buffer_size: usize,
    ) -> (Arc<dyn JobQueue>, broadcast::Receiver<Job>) {
        let (sender, receiver) = broadcast::channel(buffer_size);
        (Arc::new(BroadcastQueueService::new(sender)), receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Job> {
        self.broadcast_sender.subscribe()
    }

    /// Broadcast a delivery envelope to all subscribers.
    pub async fn publish_delivery(
        &self,
        envelope: EventEnvelope,
    ) -> Result<(), QueueServiceError> {
        debug!("Broadcasting delivery job for {}", envelope.url());
        self.broadcast_sender
            .send(Job::DeliverEvent(envelope))
            .map_err(|e| {
                error!("Failed to broadcast delivery job: {}", e);
                QueueServiceError::QueueSendError {
                    details: e.to_string(),
                    job_type: "deliver_event".to_string(),
                }
            })?;
        Ok(())
    }
}
