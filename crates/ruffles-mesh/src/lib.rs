//! # ruffles-mesh
//!
//! The simulation mesh of a ruffle: a chain of segments between vertices
//! that are either pinned or backed by two entries of a flat DOF vector.
//!
//! ## Key Types
//!
//! - [`SimulationMesh`]: vertices, segments, DOF vector, energy and gradient
//! - [`Vertex`] / [`VertexKind`]: fixed position or DOF index, width, mass, z-range
//! - [`Segment`]: ordered vertex pair with a rest length
//! - [`MeshParams`]: stiffnesses, density, gravity and box bounds
//! - Procedural generators for test strips

pub mod element;
pub mod energy;
pub mod generators;
pub mod mesh;
pub mod params;

pub use element::{Segment, Vertex, VertexKind};
pub use mesh::SimulationMesh;
pub use params::MeshParams;
