//! # ruffles-types
//!
//! Shared types, stable handles, error types, and constants
//! for the ruffles pleated-strip engine.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other ruffles crates share.
//!
//! ## Key Types
//!
//! - [`OrderedArena`]: linked list over a slot map, with stable handles
//! - [`VertexId`], [`SegmentId`], [`ConnectionPointId`], [`SectionId`]: entity handles
//! - [`RuffleError`] / [`RuffleResult`]: workspace error type

pub mod arena;
pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use arena::OrderedArena;
pub use error::{RuffleError, RuffleResult};
pub use ids::{ConnectionPointId, SectionId, SegmentId, VertexId};
pub use scalar::Real;
