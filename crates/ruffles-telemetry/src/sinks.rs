//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (collect in memory, forward to `tracing`, ...).

use std::sync::{Arc, Mutex};

use crate::events::RuffleEvent;

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &RuffleEvent);

    /// Called when the bus finishes. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in a shared `Vec` for testing and inspection.
///
/// Clones share the same buffer, so a clone kept outside the bus sees
/// everything the boxed sink receives.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<RuffleEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected events.
    pub fn events(&self) -> Vec<RuffleEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &RuffleEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Solver steps go out at `debug`, everything else at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &RuffleEvent) {
        use crate::events::EventKind;
        match &event.kind {
            EventKind::SolverStep {
                step,
                energy,
                converged,
            } => tracing::debug!(solve = event.solve, step, energy, converged, "solver step"),
            EventKind::SolveEnd {
                steps,
                converged,
                wall_time,
            } => tracing::info!(solve = event.solve, steps, converged, wall_time, "solve finished"),
            kind => tracing::info!(solve = event.solve, event = ?kind, "ruffle event"),
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
