//! Periodic and on-demand price check cycles.
//!
//! At most one cycle runs at a time. Triggers that arrive while a cycle is
//! active are dropped, not queued.

mod service;

pub use service::{CycleOutcome, PipelineScheduler, TriggerOutcome};
