//! Error types for the ruffles engine.
//!
//! All crates return `RuffleResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the ruffles engine.
#[derive(Debug, Error)]
pub enum RuffleError {
    /// A topology edit was requested on a structure that does not satisfy
    /// its preconditions. The structure is left unmodified.
    #[error("Invalid topology operation: {0}")]
    InvalidTopologyOperation(String),

    /// The apex search of a densify found zero or several candidates.
    #[error("Ambiguous apex: found {candidates} candidate connection points, expected exactly one")]
    AmbiguousApex { candidates: usize },

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Constructor or query input is unusable (empty polyline, non-finite widths, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A structural invariant does not hold (reported by `verify`).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl RuffleError {
    /// Shorthand for [`RuffleError::InvalidTopologyOperation`].
    pub fn topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopologyOperation(msg.into())
    }

    /// Shorthand for [`RuffleError::InvariantViolation`].
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

/// Convenience alias for `Result<T, RuffleError>`.
pub type RuffleResult<T> = Result<T, RuffleError>;
