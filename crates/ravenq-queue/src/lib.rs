//! In-process implementations of the core `JobQueue` contract.
//!
//! The capture side never performs network I/O: it publishes a delivery
//! job here and returns. Consumers subscribe and replay the envelopes out
//! of band. Durability and retry scheduling belong to the surrounding
//! infrastructure; this crate only provides the handoff primitives.

pub mod queue;

pub use queue::*;
