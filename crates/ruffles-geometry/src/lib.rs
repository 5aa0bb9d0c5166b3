//! # ruffles-geometry
//!
//! 2D geometry kernel for the ruffles engine.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec2`, `DVec3`)
//! - Turn angle at a polyline vertex with its analytic gradient
//! - Robust orientation and in-circle predicates, segment/ray intersection
//! - Polygon area, containment, centroid and boolean intersection area (via `geo`)
//! - Cubic Bézier curves with an arclength lookup table

pub mod angle;
pub mod bezier;
pub mod polygon;
pub mod predicates;

pub use angle::{turn_angle, turn_angle_with_gradient};
pub use bezier::{ArcLengthTable, CubicBezier};
pub use predicates::Orientation;

// Re-export glam types as the canonical math types for ruffles.
pub use glam::{DVec2, DVec3};
