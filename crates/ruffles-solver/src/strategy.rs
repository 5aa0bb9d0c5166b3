//! Solver strategy trait: the core abstraction for physics solves.
//!
//! Every solver implements this trait, so a ruffle can swap between
//! explicit dynamics, quasi-Newton and hybrid solvers at runtime.

use ruffles_mesh::SimulationMesh;

/// Result of a solver step.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    /// Whether the solver considers the configuration settled for the
    /// current air-mesh topology.
    pub converged: bool,
    /// Energy at the start of the last inner iteration.
    pub energy: f64,
    /// Inner iterations performed.
    pub iterations: u32,
}

/// Trait for physics solvers over a [`SimulationMesh`].
///
/// The solve loop calls these methods in order:
///
/// ```text
/// solver.reset(mesh);
/// while !solver.step(mesh).converged { ... }
/// ```
///
/// `step` mutates `mesh.x` in place and relaxes the air mesh afterwards; a
/// step that flipped any air-mesh edge never reports convergence.
///
/// # Implementations
///
/// - [`ExplicitSolver`](crate::explicit::ExplicitSolver): damped semi-implicit dynamics
/// - [`LbfgsbSolver`](crate::lbfgsb::LbfgsbSolver): box-constrained L-BFGS
/// - [`HybridSolver`](crate::hybrid::HybridSolver): L-BFGS-B, then dynamics
/// - [`LineSearchSolver`](crate::descent::LineSearchSolver): adaptive gradient descent
pub trait Solver: Send {
    /// Re-initializes internal state (velocities, history) from `mesh`.
    fn reset(&mut self, mesh: &SimulationMesh);

    /// Advances the solve by one step.
    fn step(&mut self, mesh: &mut SimulationMesh) -> StepResult;

    /// Returns the solver's name.
    fn name(&self) -> &str;

    /// Boxed copy, including internal state.
    fn clone_box(&self) -> Box<dyn Solver>;
}

impl Clone for Box<dyn Solver> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl std::fmt::Debug for dyn Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver").field("name", &self.name()).finish()
    }
}

/// Relaxes the air mesh after a step; any flip cancels convergence.
pub(crate) fn settle(mesh: &mut SimulationMesh, converged: bool) -> bool {
    let flipped = mesh.relax_air_mesh();
    if flipped {
        tracing::debug!("air mesh changed, step not converged");
    }
    converged && !flipped
}

/// Per-DOF box bounds: even entries use the x-axis bound, odd entries the y-axis one.
pub(crate) fn dof_bounds(mesh: &SimulationMesh) -> (Vec<f64>, Vec<f64>) {
    let lb = mesh.params.lower_bound.to_array();
    let ub = mesh.params.upper_bound.to_array();
    let n = mesh.dof();
    (
        (0..n).map(|i| lb[i % 2]).collect(),
        (0..n).map(|i| ub[i % 2]).collect(),
    )
}
