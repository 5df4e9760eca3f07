//! Queue-consumer loop for embedding hosts that run an in-process
//! `JobQueue`.

use ravenq_core::{Job, JobQueue, QueueError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::deliver::{build_client, deliver, DeliveryOutcome, RelayError};

/// Replay every envelope published to `queue`. Transport failures loop
/// the envelope back into the queue after `retry_delay` (Failed-Retryable
/// → Pending); non-200 rejections are terminal and not retried. Returns
/// when the queue is closed.
pub async fn run_consumer(
    queue: Arc<dyn JobQueue>,
    retry_delay: Duration,
) -> Result<(), RelayError> {
    let client = build_client()?;
    let mut receiver = queue.subscribe();

    loop {
        match receiver.recv().await {
            Ok(Job::DeliverEvent(envelope)) => match deliver(&client, &envelope).await {
                Ok(DeliveryOutcome::Delivered) => {
                    info!(url = envelope.url(), "Envelope delivered");
                }
                Ok(DeliveryOutcome::DuplicateIgnored) => {
                    info!(url = envelope.url(), "Envelope already recorded, ignored");
                }
                Ok(DeliveryOutcome::Rejected(status)) => {
                    warn!(
                        url = envelope.url(),
                        status, "Backend rejected envelope, not retrying"
                    );
                }
                Err(err) => {
                    error!(url = envelope.url(), "Delivery failed, re-queueing: {}", err);
                    tokio::time::sleep(retry_delay).await;
                    if let Err(send_err) = queue.send(Job::DeliverEvent(envelope)).await {
                        error!("Failed to re-publish envelope: {}", send_err);
                    }
                }
            },
            Err(QueueError::ChannelClosed) => {
                info!("Queue closed, consumer stopping");
                return Ok(());
            }
            Err(err) => {
                warn!("Failed to receive job: {}", err);
            }
        }
    }
}
