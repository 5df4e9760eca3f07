use clap::Args;
use ravenq_core::EventEnvelope;
use ravenq_relay::{build_client, deliver, DeliveryOutcome};
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Long-running queue consumer fed job bodies on stdin, one JSON object
/// per line in the queue job contract (`url`, `-X`, `headers`,
/// `payload`). Runs until the stream is exhausted.
#[derive(Args)]
pub struct WorkerCommand {
    /// Delivery attempts per job before giving up
    #[arg(long, default_value_t = 5, env = "RAVENQ_MAX_ATTEMPTS")]
    pub max_attempts: u32,

    /// Seconds to wait between attempts on a failed delivery
    #[arg(long, default_value_t = 5, env = "RAVENQ_RETRY_DELAY_SECS")]
    pub retry_delay_secs: u64,
}

impl WorkerCommand {
    pub async fn execute(self) -> anyhow::Result<i32> {
        info!("Delivery worker started, reading job bodies from stdin");
        run_from_reader(
            BufReader::new(tokio::io::stdin()),
            self.max_attempts,
            Duration::from_secs(self.retry_delay_secs),
        )
        .await?;
        Ok(0)
    }
}

/// Process newline-delimited job bodies until the reader is exhausted.
/// Malformed lines are logged and skipped so one bad job cannot stall
/// the stream.
pub async fn run_from_reader<R: AsyncBufRead + Unpin>(
    reader: R,
    max_attempts: u32,
    retry_delay: Duration,
) -> anyhow::Result<()> {
    let client = build_client()?;
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let body: BTreeMap<String, String> = match serde_json::from_str(line) {
            Ok(body) => body,
            Err(err) => {
                error!("Skipping malformed job body: {}", err);
                continue;
            }
        };
        let envelope = match EventEnvelope::from_job_body(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!("Skipping undecodable job: {}", err);
                continue;
            }
        };

        deliver_with_retry(&client, &envelope, max_attempts, retry_delay).await;
    }

    info!("Job stream exhausted, worker stopping");
    Ok(())
}

/// One job's delivery policy: transport failures are retried up to
/// `max_attempts` (Failed-Retryable → Pending); non-200 rejections are
/// terminal and not retried.
async fn deliver_with_retry(
    client: &Client,
    envelope: &EventEnvelope,
    max_attempts: u32,
    retry_delay: Duration,
) {
    for attempt in 1..=max_attempts {
        match deliver(client, envelope).await {
            Ok(DeliveryOutcome::Delivered) => {
                info!(url = envelope.url(), "Envelope delivered");
                return;
            }
            Ok(DeliveryOutcome::DuplicateIgnored) => {
                info!(url = envelope.url(), "Envelope already recorded, ignored");
                return;
            }
            Ok(DeliveryOutcome::Rejected(status)) => {
                warn!(
                    url = envelope.url(),
                    status, "Backend rejected envelope, not retrying"
                );
                return;
            }
            Err(err) => {
                error!(url = envelope.url(), attempt, "Delivery failed: {}", err);
                if attempt < max_attempts {
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
    error!(
        url = envelope.url(),
        "Giving up after {} failed attempts", max_attempts
    );
}
