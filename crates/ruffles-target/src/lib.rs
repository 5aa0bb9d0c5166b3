//! # ruffles-target
//!
//! The fixed 2D outline a ruffle is fitted to.
//!
//! [`TargetShape`] answers the geometric queries the optimizers and the
//! curve-following constructor need: signed distance, raycasts, horizontal
//! extents and an area-mismatch fit energy against a ruffle's outline.

pub mod shape;

pub use shape::{ProjectionFrame, TargetShape};
