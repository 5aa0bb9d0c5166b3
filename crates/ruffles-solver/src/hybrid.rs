//! Hybrid solver: quasi-Newton approach, then damped dynamics.
//!
//! L-BFGS-B runs until it first reports convergence, which gets the strip
//! into a good basin quickly. The solver then switches to the explicit
//! integrator for the rest of the solve; small damped steps cope better
//! with the non-smooth air-mesh penalty.

use ruffles_mesh::SimulationMesh;

use crate::config::{ExplicitParams, LbfgsbParams};
use crate::explicit::ExplicitSolver;
use crate::lbfgsb::LbfgsbSolver;
use crate::strategy::{Solver, StepResult};

/// Phase of a hybrid solve. Only moves forward until the next reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    QuasiNewton,
    Dynamics,
}

#[derive(Debug, Clone)]
pub struct HybridSolver {
    phase: Phase,
    quasi_newton: LbfgsbSolver,
    dynamics: ExplicitSolver,
}

impl HybridSolver {
    pub fn new(quasi_newton: LbfgsbParams, explicit: ExplicitParams) -> Self {
        Self {
            phase: Phase::QuasiNewton,
            quasi_newton: LbfgsbSolver::new(quasi_newton),
            dynamics: ExplicitSolver::new(explicit),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Default for HybridSolver {
    fn default() -> Self {
        Self::new(LbfgsbParams::default(), ExplicitParams::default())
    }
}

impl Solver for HybridSolver {
    fn reset(&mut self, mesh: &SimulationMesh) {
        self.phase = Phase::QuasiNewton;
        self.quasi_newton.reset(mesh);
        self.dynamics.reset(mesh);
    }

    fn step(&mut self, mesh: &mut SimulationMesh) -> StepResult {
        match self.phase {
            Phase::QuasiNewton => {
                let result = self.quasi_newton.step(mesh);
                if result.converged {
                    tracing::info!(energy = result.energy, "quasi-Newton phase converged, switching to dynamics");
                    self.phase = Phase::Dynamics;
                    self.dynamics.reset(mesh);
                }
                StepResult {
                    converged: false,
                    ..result
                }
            }
            Phase::Dynamics => self.dynamics.step(mesh),
        }
    }

    fn name(&self) -> &str {
        "hybrid"
    }

    fn clone_box(&self) -> Box<dyn Solver> {
        Box::new(self.clone())
    }
}
