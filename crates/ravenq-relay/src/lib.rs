//! Deferred delivery of captured event envelopes.
//!
//! A relay invocation consumes exactly one envelope: it rebuilds the
//! outbound HTTP request, performs the delivery with a bounded timeout and
//! classifies the result. Duplicate-event rejections count as success so
//! that at-least-once replay from the queue never produces a failure loop
//! for an event the backend already recorded.

pub mod consumer;
pub mod deliver;

pub use consumer::*;
pub use deliver::*;
