//! telemetry/mod.rs
//! Per-call counters, stage timers and the immutable report built from them.
//!
//! The engine never publishes these anywhere; callers that want them ask for a
//! `CallReport` explicitly.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
