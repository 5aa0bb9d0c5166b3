//! Scalar type alias for the simulation.
//!
//! The energy terms combine stiffnesses around 1e9 with lengths around
//! 1e-1, so everything runs in double precision.

/// The floating-point type used throughout the simulation.
pub type Real = f64;
