//! Explicit integrator.
//!
//! A modified Verlet scheme with a single gradient evaluation per step:
//!
//! ```text
//! a  = −∇E(x)
//! v += dt·γ·a
//! x += dt·v + ½·dt²·a
//! v += dt·(1 − γ)·a
//! ```
//!
//! followed by box clamping (a clamped coordinate loses its velocity) and
//! damping. The gradient is used as force directly; masses enter through
//! the gravity term of the energy.

use ruffles_mesh::SimulationMesh;

use crate::config::ExplicitParams;
use crate::state::DynamicsState;
use crate::strategy::{dof_bounds, settle, Solver, StepResult};

/// Damped semi-implicit dynamics with box constraints.
#[derive(Debug, Clone)]
pub struct ExplicitSolver {
    params: ExplicitParams,
    state: DynamicsState,
    dt: f64,
    last_energy: f64,
}

impl ExplicitSolver {
    pub fn new(params: ExplicitParams) -> Self {
        let dt = params.dt;
        Self {
            params,
            state: DynamicsState::default(),
            dt,
            last_energy: f64::INFINITY,
        }
    }

    pub fn params(&self) -> &ExplicitParams {
        &self.params
    }

    /// Current timestep; differs from `params.dt` only in adaptive mode.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn state(&self) -> &DynamicsState {
        &self.state
    }
}

impl Default for ExplicitSolver {
    fn default() -> Self {
        Self::new(ExplicitParams::default())
    }
}

impl Solver for ExplicitSolver {
    fn reset(&mut self, mesh: &SimulationMesh) {
        self.state = DynamicsState::from_mesh(mesh);
        self.dt = self.params.dt;
        self.last_energy = f64::INFINITY;
    }

    fn step(&mut self, mesh: &mut SimulationMesh) -> StepResult {
        if self.state.ensure_size(mesh) {
            tracing::debug!(dof = mesh.dof(), "explicit solver state resized");
        }
        let energy = mesh.energy(&mesh.x, Some(self.state.grad.as_mut_slice()));

        if self.params.adaptive {
            if energy > self.last_energy {
                self.dt *= 0.5;
                tracing::debug!(dt = self.dt, "energy increased, halving timestep");
            }
            self.last_energy = energy;
        }

        let (lb, ub) = dof_bounds(mesh);
        let dt = self.dt;
        let gamma = self.params.gamma;
        let DynamicsState { vel, grad, acc } = &mut self.state;
        for i in 0..mesh.x.len() {
            acc[i] = -grad[i];
            vel[i] += dt * gamma * acc[i];
            mesh.x[i] += dt * vel[i] + 0.5 * dt * dt * acc[i];
            vel[i] += dt * (1.0 - gamma) * acc[i];

            if mesh.x[i] < lb[i] {
                mesh.x[i] = lb[i];
                vel[i] = 0.0;
            }
            if mesh.x[i] > ub[i] {
                mesh.x[i] = ub[i];
                vel[i] = 0.0;
            }
            vel[i] *= self.params.damping;
        }

        let converged = self.state.residual() < mesh.x.len() as f64 * self.params.epsilon;
        StepResult {
            converged: settle(mesh, converged),
            energy,
            iterations: 1,
        }
    }

    fn name(&self) -> &str {
        "explicit"
    }

    fn clone_box(&self) -> Box<dyn Solver> {
        Box::new(self.clone())
    }
}
