use ravenq_core::{EnvelopeError, EventEnvelope};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Bound on a single delivery attempt so one stuck request cannot stall
/// the worker indefinitely. A timeout surfaces as a transport error and is
/// therefore retryable.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Substring of the backend's duplicate-event rejection message. Matched
/// case-insensitively.
const DUPLICATE_EVENT_MARKER: &str = "an event with the same id";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Terminal classification of one delivery attempt.
///
/// Transport-level failures are not represented here: they propagate as
/// [`RelayError`] so the queue's retry policy engages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Backend acknowledged the event (status 200)
    Delivered,
    /// Backend already recorded an event with this id; replay is a no-op
    DuplicateIgnored,
    /// Backend answered with a non-200 status
    Rejected(u16),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            DeliveryOutcome::Delivered | DeliveryOutcome::DuplicateIgnored
        )
    }

    /// Exit code reported to the invoking queue consumer.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Build the HTTP client used for deliveries, with the bounded timeout
/// applied.
pub fn build_client() -> Result<Client, RelayError> {
    Ok(Client::builder().timeout(DELIVERY_TIMEOUT).build()?)
}

/// Replay one envelope against the tracking backend.
pub async fn deliver(
    client: &Client,
    envelope: &EventEnvelope,
) -> Result<DeliveryOutcome, RelayError> {
    let method = Method::from_bytes(envelope.method().as_bytes())
        .map_err(|_| RelayError::InvalidMethod(envelope.method().to_string()))?;
    let payload = envelope.payload()?;

    debug!(
        method = envelope.method(),
        url = envelope.url(),
        bytes = payload.len(),
        "Delivering event envelope"
    );

    let mut request = client.request(method, envelope.url());
    for (name, value) in envelope.headers() {
        request = request.header(name, value);
    }

    let response = request.body(payload).send().await?;
    let status = response.status();

    if status == StatusCode::OK {
        info!(url = envelope.url(), "Event delivered");
        return Ok(DeliveryOutcome::Delivered);
    }

    // The backend rejects replays of an already-recorded event id. The
    // queue's at-least-once semantics make that an expected outcome, not
    // a failure.
    let body = response.text().await.unwrap_or_default();
    if body.to_lowercase().contains(DUPLICATE_EVENT_MARKER) {
        info!(url = envelope.url(), "Backend already recorded this event, ignoring");
        return Ok(DeliveryOutcome::DuplicateIgnored);
    }

    warn!(
        url = envelope.url(),
        status = status.as_u16(),
        "Backend rejected event"
    );
    Ok(DeliveryOutcome::Rejected(status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use std::collections::BTreeMap;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn envelope_for(base: &str, body: &[u8]) -> EventEnvelope {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Encoding".to_string(), "gzip".to_string());
        headers.insert("X-Sentry-Auth".to_string(), "Sentry sentry_key=k".to_string());
        EventEnvelope::post(format!("{}/api/1/store/", base), headers, body)
    }

    #[tokio::test]
    async fn status_200_is_delivered() {
        let base = spawn_server(
            Router::new().route("/api/1/store/", post(|| async { StatusCode::OK })),
        )
        .await;

        let client = build_client().unwrap();
        let outcome = deliver(&client, &envelope_for(&base, b"body")).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn non_200_status_is_rejected() {
        let base = spawn_server(Router::new().route(
            "/api/1/store/",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let client = build_client().unwrap();
        let outcome = deliver(&client, &envelope_for(&base, b"body")).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::Rejected(500));
        assert_eq!(outcome.exit_code(), 1);
    }

    #[tokio::test]
    async fn duplicate_event_rejection_counts_as_success() {
        let base = spawn_server(Router::new().route(
            "/api/1/store/",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    "An event with the same ID already exists (abc123)",
                )
            }),
        ))
        .await;

        let client = build_client().unwrap();
        let outcome = deliver(&client, &envelope_for(&base, b"body")).await.unwrap();
        assert_eq!(outcome, DeliveryOutcome::DuplicateIgnored);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn connection_refused_propagates() {
        // Bind and immediately drop to find a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = build_client().unwrap();
        let result = deliver(
            &client,
            &envelope_for(&format!("http://{}", addr), b"body"),
        )
        .await;
        assert!(matches!(result, Err(RelayError::Transport(_))));
    }

    #[tokio::test]
    async fn request_carries_headers_and_raw_payload() {
        let base = spawn_server(Router::new().route(
            "/api/1/store/",
            post(|headers: HeaderMap, body: Bytes| async move {
                let authed = headers
                    .get("X-Sentry-Auth")
                    .map(|v| v.to_str().unwrap_or_default().starts_with("Sentry"))
                    .unwrap_or(false);
                if authed && body.as_ref() == b"compressed-bytes" {
                    StatusCode::OK
                } else {
                    StatusCode::BAD_REQUEST
                }
            }),
        ))
        .await;

        let client = build_client().unwrap();
        let outcome = deliver(&client, &envelope_for(&base, b"compressed-bytes"))
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Delivered);
    }

    #[tokio::test]
    async fn unknown_method_is_an_envelope_error() {
        let envelope = EventEnvelope::new(
            "NOT A METHOD",
            "http://127.0.0.1:1/",
            BTreeMap::new(),
            b"x",
        );
        let client = build_client().unwrap();
        let result = deliver(&client, &envelope).await;
        assert!(matches!(result, Err(RelayError::InvalidMethod(_))));
    }
}
