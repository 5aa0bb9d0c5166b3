//! # ruffles-solver
//!
//! Physics solvers for the ruffle simulation mesh.
//!
//! ## Key Types
//!
//! - [`Solver`]: pluggable solver trait (`reset` / `step`)
//! - [`SolverConfig`]: solver selection and per-solver parameters
//! - [`ExplicitSolver`]: damped semi-implicit dynamics with box clamping
//! - [`LbfgsbSolver`]: box-constrained L-BFGS minimizer
//! - [`HybridSolver`]: L-BFGS-B followed by explicit dynamics
//! - [`LineSearchSolver`]: adaptive gradient descent

pub mod config;
pub mod descent;
pub mod explicit;
pub mod hybrid;
pub mod lbfgsb;
pub mod state;
pub mod strategy;

pub use config::{ExplicitParams, LbfgsbParams, LineSearchParams, SolverConfig, SolverKind};
pub use descent::LineSearchSolver;
pub use explicit::ExplicitSolver;
pub use hybrid::{HybridSolver, Phase};
pub use lbfgsb::LbfgsbSolver;
pub use state::DynamicsState;
pub use strategy::{Solver, StepResult};
