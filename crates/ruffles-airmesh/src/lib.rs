//! # ruffles-airmesh
//!
//! Self-intersection guard for a ruffle strip.
//!
//! The air mesh triangulates the strip vertices together with the empty
//! space between them, using the strip segments as constraint edges:
//! 1. **Build**: constrained triangulation of the current layout
//! 2. **Relax**: quality-driven edge flips as vertices move
//! 3. **Penalty / project**: discourage or repair inverted triangles
//!
//! ## Key Types
//!
//! - [`AirMesh`]: the triangulation plus its vertex payloads
//! - [`AirVertex`]: fixed position or DOF index of an air-mesh vertex
//! - [`Triangulation`]: flip-capable constrained triangulation

pub mod air_mesh;
pub mod triangulation;

pub use air_mesh::{AirMesh, AirVertex};
pub use triangulation::Triangulation;
