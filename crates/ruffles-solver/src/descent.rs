//! Gradient descent with an adaptive step length.
//!
//! Each step moves along the normalized negative gradient. The step length
//! is halved until the energy decreases and grows by a constant factor when
//! the first trial already succeeds.

use ruffles_mesh::SimulationMesh;

use crate::config::LineSearchParams;
use crate::strategy::{settle, Solver, StepResult};

#[derive(Debug, Clone)]
pub struct LineSearchSolver {
    params: LineSearchParams,
    step_size: f64,
    grad: Vec<f64>,
}

impl LineSearchSolver {
    pub fn new(params: LineSearchParams) -> Self {
        let step_size = params.step_size;
        Self {
            params,
            step_size,
            grad: Vec::new(),
        }
    }

    /// Step length used by the next step.
    pub fn step_size(&self) -> f64 {
        self.step_size
    }
}

impl Default for LineSearchSolver {
    fn default() -> Self {
        Self::new(LineSearchParams::default())
    }
}

impl Solver for LineSearchSolver {
    fn reset(&mut self, mesh: &SimulationMesh) {
        self.step_size = self.params.step_size;
        self.grad = vec![0.0; mesh.dof()];
    }

    fn step(&mut self, mesh: &mut SimulationMesh) -> StepResult {
        self.grad.resize(mesh.dof(), 0.0);
        let f0 = mesh.energy(&mesh.x, Some(self.grad.as_mut_slice()));
        let grad_norm = self.grad.iter().map(|g| g * g).sum::<f64>().sqrt();
        if grad_norm < self.params.tolerance {
            return StepResult {
                converged: settle(mesh, true),
                energy: f0,
                iterations: 0,
            };
        }

        let mut halvings = 0;
        while halvings < self.params.max_halvings {
            let scale = self.step_size / grad_norm;
            let trial: Vec<f64> = mesh
                .x
                .iter()
                .zip(&self.grad)
                .map(|(x, g)| x - scale * g)
                .collect();
            if mesh.energy(&trial, None) < f0 {
                mesh.x = trial;
                break;
            }
            self.step_size *= 0.5;
            halvings += 1;
        }
        if halvings == 0 {
            self.step_size *= self.params.grow;
        }
        tracing::debug!(energy = f0, step_size = self.step_size, halvings, "line search step");

        StepResult {
            converged: settle(mesh, false),
            energy: f0,
            iterations: halvings + 1,
        }
    }

    fn name(&self) -> &str {
        "line_search"
    }

    fn clone_box(&self) -> Box<dyn Solver> {
        Box::new(self.clone())
    }
}
