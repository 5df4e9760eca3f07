//! Transient diagnostic trail entries attached to the next captured error.

use chrono::{DateTime, Utc};
use ravenq_core::Severity;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Breadcrumbs kept per session; older entries are evicted.
pub const MAX_BREADCRUMBS: usize = 20;

/// Internal diagnostic event as emitted by the host application's event
/// system (timers, queries, cache hits...).
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    pub namespace: String,
    pub kind: String,
    pub data: BTreeMap<String, Value>,
}

impl DiagnosticEvent {
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        data: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            data,
        }
    }
}

/// One entry of the diagnostic trail, in wire form.
#[derive(Debug, Clone, Serialize)]
pub struct Breadcrumb {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub level: Severity,
    pub data: BTreeMap<String, Value>,
}

impl Breadcrumb {
    /// Build an info-level breadcrumb from an internal event, categorized
    /// `namespace.kind`.
    pub fn from_event(event: &DiagnosticEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            category: format!("{}.{}", event.namespace, event.kind),
            level: Severity::Info,
            data: event.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn breadcrumb_category_joins_namespace_and_kind() {
        let mut data = BTreeMap::new();
        data.insert("query".to_string(), json!("SELECT 1"));
        let event = DiagnosticEvent::new("db", "query", data);

        let crumb = Breadcrumb::from_event(&event);
        assert_eq!(crumb.category, "db.query");
        assert_eq!(crumb.level, Severity::Info);
        assert_eq!(crumb.data.get("query"), Some(&json!("SELECT 1")));
    }
}
