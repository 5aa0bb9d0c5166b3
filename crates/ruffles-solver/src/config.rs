//! Solver configuration.
//!
//! Selects the solver used by `physics_solve` and holds the tuning
//! parameters of every solver, so switching kinds keeps the settings.

use ruffles_types::constants::MAX_SOLVE_STEPS;
use ruffles_types::{RuffleError, RuffleResult};
use serde::{Deserialize, Serialize};

use crate::descent::LineSearchSolver;
use crate::explicit::ExplicitSolver;
use crate::hybrid::HybridSolver;
use crate::lbfgsb::LbfgsbSolver;
use crate::strategy::Solver;

/// Which solver drives a physics solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Damped semi-implicit integrator.
    Explicit,
    /// Box-constrained limited-memory quasi-Newton minimizer.
    QuasiNewton,
    /// Quasi-Newton until converged, then explicit dynamics.
    #[default]
    Hybrid,
    /// Gradient descent with an adaptive step.
    LineSearch,
}

/// Parameters of the explicit integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitParams {
    /// Timestep.
    pub dt: f64,
    /// Velocity multiplier applied after each step (1.0 = undamped).
    pub damping: f64,
    /// Share of the acceleration applied before the position update.
    pub gamma: f64,
    /// Per-DOF convergence threshold on `|a|² + |v|²`.
    pub epsilon: f64,
    /// Halve `dt` whenever a step increases the energy.
    pub adaptive: bool,
}

impl Default for ExplicitParams {
    fn default() -> Self {
        Self {
            dt: 1e-6,
            damping: 0.99,
            gamma: 0.5,
            epsilon: 1e-3,
            adaptive: false,
        }
    }
}

/// Parameters of the L-BFGS-B minimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LbfgsbParams {
    /// Number of correction pairs kept.
    pub memory: usize,
    /// Projected gradient tolerance, relative to `max(1, |x|)`.
    pub epsilon: f64,
    /// Relative energy decrease below which an iteration counts as stalled.
    pub delta: f64,
    /// Iterations per solver step.
    pub max_iterations: u32,
    /// Backtracking trials per iteration before the line search fails.
    pub max_linesearch: u32,
    /// Sufficient-decrease (Armijo) constant.
    pub ftol: f64,
}

impl Default for LbfgsbParams {
    fn default() -> Self {
        Self {
            memory: 6,
            epsilon: 1e-5,
            delta: 1e-10,
            max_iterations: 200,
            max_linesearch: 20,
            ftol: 1e-4,
        }
    }
}

/// Parameters of the line-search descent solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSearchParams {
    /// Initial step length along the normalized descent direction.
    pub step_size: f64,
    /// Step growth factor after a step accepted on the first try.
    pub grow: f64,
    /// Halvings tried before giving up on a step.
    pub max_halvings: u32,
    /// Gradient norm below which the solver reports convergence.
    pub tolerance: f64,
}

impl Default for LineSearchParams {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            grow: 1.1,
            max_halvings: 100,
            tolerance: 1e-5,
        }
    }
}

/// Configuration for physics solves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Hard cap on solver steps per solve.
    pub max_steps: u32,
    pub explicit: ExplicitParams,
    pub quasi_newton: LbfgsbParams,
    pub line_search: LineSearchParams,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::default(),
            max_steps: MAX_SOLVE_STEPS,
            explicit: ExplicitParams::default(),
            quasi_newton: LbfgsbParams::default(),
            line_search: LineSearchParams::default(),
        }
    }
}

impl SolverConfig {
    /// Quick previews: quasi-Newton only, few iterations, loose tolerance.
    pub fn fast() -> Self {
        Self {
            kind: SolverKind::QuasiNewton,
            max_steps: 100,
            quasi_newton: LbfgsbParams {
                epsilon: 1e-3,
                max_iterations: 50,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Final shapes: hybrid with more memory and tighter tolerances.
    pub fn precise() -> Self {
        Self {
            kind: SolverKind::Hybrid,
            quasi_newton: LbfgsbParams {
                memory: 12,
                epsilon: 1e-7,
                max_iterations: 1000,
                ..Default::default()
            },
            explicit: ExplicitParams {
                epsilon: 1e-5,
                adaptive: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Rejects values no solver can run with.
    pub fn validate(&self) -> RuffleResult<()> {
        let invalid = |msg: String| Err(RuffleError::InvalidConfig(msg));
        if self.max_steps == 0 {
            return invalid("max_steps must be positive".into());
        }
        let e = &self.explicit;
        if !(e.dt > 0.0) {
            return invalid(format!("explicit.dt must be positive, got {}", e.dt));
        }
        if !(0.0..=1.0).contains(&e.damping) {
            return invalid(format!("explicit.damping must be in [0, 1], got {}", e.damping));
        }
        if !(0.0..=1.0).contains(&e.gamma) {
            return invalid(format!("explicit.gamma must be in [0, 1], got {}", e.gamma));
        }
        let q = &self.quasi_newton;
        if q.memory == 0 || q.max_iterations == 0 || q.max_linesearch == 0 {
            return invalid("quasi_newton memory and iteration limits must be positive".into());
        }
        if !(q.ftol > 0.0 && q.ftol < 1.0) {
            return invalid(format!("quasi_newton.ftol must be in (0, 1), got {}", q.ftol));
        }
        let l = &self.line_search;
        if !(l.step_size > 0.0) || !(l.grow >= 1.0) {
            return invalid("line_search step_size must be positive and grow at least 1".into());
        }
        Ok(())
    }

    /// Builds the configured solver.
    pub fn build(&self) -> Box<dyn Solver> {
        match self.kind {
            SolverKind::Explicit => Box::new(ExplicitSolver::new(self.explicit.clone())),
            SolverKind::QuasiNewton => Box::new(LbfgsbSolver::new(self.quasi_newton.clone())),
            SolverKind::Hybrid => Box::new(HybridSolver::new(
                self.quasi_newton.clone(),
                self.explicit.clone(),
            )),
            SolverKind::LineSearch => Box::new(LineSearchSolver::new(self.line_search.clone())),
        }
    }
}
