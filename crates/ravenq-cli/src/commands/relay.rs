use clap::Args;
use ravenq_core::EventEnvelope;
use ravenq_relay::{build_client, deliver, RelayError};
use std::collections::BTreeMap;
use tracing::{debug, error};

/// Exit code signalling a retryable transport failure, distinct from the
/// terminal non-200 rejection (1) so a queue consumer watching exit codes
/// can tell the two apart.
pub const EXIT_RETRYABLE: i32 = 2;

/// One-shot delivery of a captured envelope.
///
/// Exit code 0: delivered (status 200) or duplicate-ignored. Exit code 1:
/// backend answered with a non-200 status (terminal). Exit code 2:
/// transport-level failure; the invoking queue consumer should apply its
/// retry policy.
#[derive(Args)]
pub struct RelayCommand {
    /// Destination URL
    pub url: String,

    /// JSON-encoded header mapping
    pub headers: String,

    /// Base64-encoded payload
    pub payload: String,

    /// HTTP method
    #[arg(short = 'X', long = "method", default_value = "POST")]
    pub method: String,
}

impl RelayCommand {
    pub async fn execute(self) -> anyhow::Result<i32> {
        let mut body = BTreeMap::new();
        body.insert("url".to_string(), self.url);
        body.insert("-X".to_string(), self.method);
        body.insert("headers".to_string(), self.headers);
        body.insert("payload".to_string(), self.payload);

        let envelope = EventEnvelope::from_job_body(&body)?;
        debug!("Replaying envelope to {}", envelope.url());

        let client = build_client()?;
        match deliver(&client, &envelope).await {
            Ok(outcome) => Ok(outcome.exit_code()),
            Err(RelayError::Transport(err)) => {
                error!(url = envelope.url(), "Transport failure: {}", err);
                Ok(EXIT_RETRYABLE)
            }
            Err(err) => Err(err.into()),
        }
    }
}
