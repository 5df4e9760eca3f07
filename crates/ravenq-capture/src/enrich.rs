//! Context enrichment: read-only queries against host-application state,
//! folded into the user/extra maps attached to the next captured event.
//!
//! Enrichment never fails. Any collaborator lookup that is unavailable
//! (no active session, no matched route) is simply omitted from the
//! result.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::HandlerDescriptor;

/// Session key reserved for request-profiling metadata, excluded from the
/// shipped snapshot.
const PROFILER_SESSION_KEY: &str = "clockwork";

/// Read-only view of the request being served.
pub trait RequestProbe {
    /// Network address of the caller
    fn client_ip(&self) -> Option<String>;

    /// Timestamp recorded at request entry
    fn started_at(&self) -> Option<DateTime<Utc>>;

    /// Outbound response headers accumulated so far
    fn response_headers(&self) -> BTreeMap<String, String>;
}

/// Read-only view of the router state.
pub trait RouteProbe {
    /// Handler the router resolved for the current request, if any
    fn current_handler(&self) -> Option<HandlerDescriptor>;
}

/// Read-only view of the session key-value store.
pub trait SessionProbe {
    fn is_started(&self) -> bool;

    fn data(&self) -> BTreeMap<String, Value>;
}

/// Gathers process-local context at the moment of capture.
pub struct ContextEnricher<'a> {
    request: &'a dyn RequestProbe,
    route: &'a dyn RouteProbe,
    session: &'a dyn SessionProbe,
}

impl<'a> ContextEnricher<'a> {
    pub fn new(
        request: &'a dyn RequestProbe,
        route: &'a dyn RouteProbe,
        session: &'a dyn SessionProbe,
    ) -> Self {
        Self {
            request,
            route,
            session,
        }
    }

    /// User context: at minimum the caller's network address.
    pub fn user(&self) -> BTreeMap<String, Value> {
        let mut data = BTreeMap::new();
        if let Some(ip) = self.request.client_ip() {
            data.insert("ip_address".to_string(), Value::String(ip));
        }
        data
    }

    /// Extra context: request duration, resolved handler, response headers
    /// and a transport-safe session snapshot.
    pub fn extra(&self) -> BTreeMap<String, Value> {
        let mut data = BTreeMap::new();

        if let Some(start) = self.request.started_at() {
            let duration_ms = (Utc::now() - start).num_milliseconds().max(0);
            data.insert("Duration".to_string(), Value::from(duration_ms));
        }

        if let Some(handler) = self.route.current_handler() {
            data.insert("Controller".to_string(), Value::String(handler.describe()));
        }

        let headers: serde_json::Map<String, Value> = self
            .request
            .response_headers()
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();
        data.insert("Response Header".to_string(), Value::Object(headers));

        if self.session.is_started() {
            let mut snapshot = serde_json::Map::new();
            for (key, value) in self.session.data() {
                if key == PROFILER_SESSION_KEY {
                    continue;
                }
                snapshot.insert(key, flatten_session_value(value));
            }
            data.insert("Session".to_string(), Value::Object(snapshot));
        }

        data
    }
}

/// Non-primitive session values are carried as their serialized string
/// form so the resulting structure stays transport-safe.
fn flatten_session_value(value: Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => {
            Value::String(serde_json::to_string(&value).unwrap_or_default())
        }
        primitive => primitive,
    }
}
