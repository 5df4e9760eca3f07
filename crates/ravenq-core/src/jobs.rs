use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EventEnvelope;

/// Core job enum containing all job types carried by the queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Job {
    /// Deliver a captured event envelope to the tracking backend
    DeliverEvent(EventEnvelope),
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::DeliverEvent(envelope) => write!(
                f,
                "DeliverEvent(method: {}, url: {})",
                envelope.method(),
                envelope.url()
            ),
        }
    }
}

// Core queue abstraction - ravenq-queue implements this
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to send job: {0}")]
    SendError(String),
    #[error("Failed to receive job: {0}")]
    ReceiveError(String),
    #[error("Queue channel closed")]
    ChannelClosed,
    #[error("Invalid job data: {0}")]
    InvalidData(String),
}

/// Core trait for job queue operations
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Send a job to the queue
    async fn send(&self, job: Job) -> Result<(), QueueError>;

    /// Create a new receiver for jobs
    fn subscribe(&self) -> Box<dyn JobReceiver>;
}

/// Core trait for receiving jobs
#[async_trait]
pub trait JobReceiver: Send {
    /// Receive the next job
    async fn recv(&mut self) -> Result<Job, QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn job_display_formatting() {
        let envelope = EventEnvelope::post(
            "https://sentry.example.com/api/42/store/",
            BTreeMap::new(),
            b"body",
        );
        let job = Job::DeliverEvent(envelope);
        assert_eq!(
            format!("{}", job),
            "DeliverEvent(method: POST, url: https://sentry.example.com/api/42/store/)"
        );
    }
}
