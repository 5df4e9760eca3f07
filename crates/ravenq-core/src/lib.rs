//! Core types shared across all RavenQ crates

pub mod envelope;
pub mod jobs;
pub mod severity;

// Re-export commonly used types
pub use envelope::*;
pub use jobs::*;
pub use severity::*;

// Re-export external dependencies
pub use async_trait;
pub use serde;
pub use serde_json;
pub use thiserror;
