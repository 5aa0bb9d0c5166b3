//! # ruffles-topology
//!
//! The ruffle as a topology graph over a simulation mesh.
//!
//! ## Key Types
//!
//! - [`Ruffle`]: connection points, sections, outline loop, mesh and solver
//! - [`ConnectionPoint`] / [`Section`] / [`OutlineSection`]: graph elements
//! - [`SolveReport`] / [`SolveStats`]: physics solve diagnostics
//! - [`Raycast`]: target-outline queries used by [`Ruffle::create_stack_along_curve`]
//!
//! Topology edits (`subdivide`, `densify`, `densify2`, `densify3`,
//! `undensify`, `dissolve_connection_point`, `delete_section`) validate
//! first and return `InvalidTopologyOperation` without side effects.

pub mod constructors;
pub mod elements;
pub mod ruffle;
pub mod solve;
pub mod surgery;

pub use constructors::Raycast;
pub use elements::{ConnectionPoint, OutlineSection, Section, SectionKind};
pub use ruffle::Ruffle;
pub use solve::{SolveReport, SolveStats};
