//! Ruffle event types.
//!
//! Structured events emitted around physics solves and topology edits.
//! Events are lightweight value types that carry just enough data to be
//! useful for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// An event emitted by a ruffle.
///
/// Events are tagged with the index of the solve they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuffleEvent {
    /// Solve number (0-indexed) at the time of the event.
    pub solve: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Physics solve started.
    SolveBegin {
        /// Degrees of freedom of the simulation mesh.
        dof: usize,
        /// Name of the active solver.
        solver: String,
    },

    /// One solver step completed.
    SolverStep {
        /// Step number within the solve.
        step: u32,
        /// Energy reported by the solver.
        energy: f64,
        /// Whether the step reported convergence.
        converged: bool,
    },

    /// Physics solve completed.
    SolveEnd {
        /// Steps taken.
        steps: u32,
        /// Whether the solver converged before the step cap.
        converged: bool,
        /// Wall-clock time for the solve (seconds).
        wall_time: f64,
    },

    /// The air mesh was relaxed outside a solver step.
    AirMeshRelaxed {
        /// Whether any edge flipped.
        flipped: bool,
    },

    /// A topology edit completed.
    TopologyEdit {
        /// Name of the operation (`subdivide`, `densify`, ...).
        operation: String,
        /// Section count after the edit.
        sections: usize,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl RuffleEvent {
    /// Creates a new event for the given solve.
    pub fn new(solve: u32, kind: EventKind) -> Self {
        Self { solve, kind }
    }
}
