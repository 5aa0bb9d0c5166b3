//! # ruffles-telemetry
//!
//! Event bus for ruffle diagnostics. Emits structured events (solve
//! timing, solver steps, air-mesh flips, topology edits) that are
//! consumed by pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, RuffleEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
