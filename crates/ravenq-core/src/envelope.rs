//! Self-contained delivery instruction for one captured event.
//!
//! An [`EventEnvelope`] carries everything the relay needs to replay the
//! HTTP delivery in a different process: method, target URL, headers and
//! the compressed body. The payload is held base64-encoded so the envelope
//! survives any string-only queue backend verbatim.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// HTTP method used when the producer does not override it.
pub const DEFAULT_METHOD: &str = "POST";

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Invalid payload encoding: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("Invalid headers encoding: {0}")]
    InvalidHeaders(#[source] serde_json::Error),

    #[error("Missing job body field: {0}")]
    MissingField(&'static str),
}

/// Immutable description of one outbound delivery.
///
/// Once constructed an envelope is never mutated; the relay that replays it
/// needs no access to the capture-side state that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    method: String,
    url: String,
    headers: BTreeMap<String, String>,
    payload: String,
}

impl EventEnvelope {
    /// Build an envelope from raw body bytes (already compressed by the
    /// capture side).
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: BTreeMap<String, String>,
        body: &[u8],
    ) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers,
            payload: BASE64.encode(body),
        }
    }

    /// Build a POST envelope, the common case.
    pub fn post(url: impl Into<String>, headers: BTreeMap<String, String>, body: &[u8]) -> Self {
        Self::new(DEFAULT_METHOD, url, headers, body)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// The payload in its transport-safe encoded form.
    pub fn encoded_payload(&self) -> &str {
        &self.payload
    }

    /// Decode the payload back to the exact bytes the producer compressed.
    pub fn payload(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(BASE64.decode(&self.payload)?)
    }

    /// Flatten into the string-keyed job body used by generic queue
    /// infrastructure and the relay command line: `url`, `-X` (method
    /// override), JSON-encoded `headers`, encoded `payload`.
    pub fn to_job_body(&self) -> BTreeMap<String, String> {
        let mut body = BTreeMap::new();
        body.insert("url".to_string(), self.url.clone());
        body.insert("-X".to_string(), self.method.clone());
        body.insert(
            "headers".to_string(),
            serde_json::to_string(&self.headers).unwrap_or_else(|_| "{}".to_string()),
        );
        body.insert("payload".to_string(), self.payload.clone());
        body
    }

    /// Rebuild an envelope from a string-keyed job body. The method field
    /// is optional and defaults to POST.
    pub fn from_job_body(body: &BTreeMap<String, String>) -> Result<Self, EnvelopeError> {
        let url = body
            .get("url")
            .ok_or(EnvelopeError::MissingField("url"))?
            .clone();
        let method = body
            .get("-X")
            .cloned()
            .unwrap_or_else(|| DEFAULT_METHOD.to_string());
        let headers: BTreeMap<String, String> = match body.get("headers") {
            Some(raw) => serde_json::from_str(raw).map_err(EnvelopeError::InvalidHeaders)?,
            None => BTreeMap::new(),
        };
        let payload = body
            .get("payload")
            .ok_or(EnvelopeError::MissingField("payload"))?
            .clone();

        // Validate the encoding up front so a malformed job fails here
        // rather than at delivery time.
        BASE64.decode(&payload)?;

        Ok(Self {
            method,
            url,
            headers,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_headers() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Encoding".to_string(), "gzip".to_string());
        headers.insert(
            "Content-Type".to_string(),
            "application/octet-stream".to_string(),
        );
        headers
    }

    #[test]
    fn payload_round_trips_byte_identical() {
        let body = vec![0u8, 1, 2, 255, 254, 31, 139];
        let envelope = EventEnvelope::post("https://sentry.example.com/api/1/store/", sample_headers(), &body);
        assert_eq!(envelope.payload().unwrap(), body);
    }

    #[test]
    fn job_body_round_trip() {
        let envelope = EventEnvelope::post(
            "https://sentry.example.com/api/1/store/",
            sample_headers(),
            b"compressed bytes",
        );
        let body = envelope.to_job_body();
        assert_eq!(body.get("-X").map(String::as_str), Some("POST"));
        assert_eq!(
            body.get("url").map(String::as_str),
            Some("https://sentry.example.com/api/1/store/")
        );

        let rebuilt = EventEnvelope::from_job_body(&body).unwrap();
        assert_eq!(rebuilt, envelope);
    }

    #[test]
    fn job_body_without_method_defaults_to_post() {
        let envelope = EventEnvelope::post("https://example.com/", BTreeMap::new(), b"x");
        let mut body = envelope.to_job_body();
        body.remove("-X");

        let rebuilt = EventEnvelope::from_job_body(&body).unwrap();
        assert_eq!(rebuilt.method(), "POST");
    }

    #[test]
    fn job_body_missing_url_is_an_error() {
        let mut body = BTreeMap::new();
        body.insert("payload".to_string(), BASE64.encode(b"x"));
        let err = EventEnvelope::from_job_body(&body).unwrap_err();
        assert!(matches!(err, EnvelopeError::MissingField("url")));
    }

    #[test]
    fn job_body_with_bad_payload_encoding_is_an_error() {
        let mut body = BTreeMap::new();
        body.insert("url".to_string(), "https://example.com/".to_string());
        body.insert("payload".to_string(), "not base64 !!!".to_string());
        let err = EventEnvelope::from_job_body(&body).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidPayload(_)));
    }
}
