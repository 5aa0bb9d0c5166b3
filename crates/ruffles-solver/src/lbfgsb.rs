//! Box-constrained limited-memory BFGS.
//!
//! Projected L-BFGS: variables sitting on a bound with the gradient pushing
//! outwards are frozen, the two-loop recursion runs on the remaining free
//! variables, and a backtracking line search projects every trial point
//! back into the box before testing the Armijo condition.
//!
//! One solver step runs up to `max_iterations` iterations. Reaching the
//! gradient tolerance, stalling, or a failed line search all end the step
//! as converged; a line-search failure means no descent is left at the
//! current air-mesh topology.

use std::collections::VecDeque;

use ruffles_mesh::SimulationMesh;
use thiserror::Error;

use crate::config::LbfgsbParams;
use crate::strategy::{dof_bounds, settle, Solver, StepResult};

/// Why a minimization ended early.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MinimizeError {
    #[error("line search found no sufficient decrease after {0} trials")]
    LineSearchFailed(u32),
    #[error("energy or gradient is not finite")]
    NonFinite,
}

/// How a successful minimization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Projected gradient below tolerance.
    Converged,
    /// Relative energy decrease below `delta`.
    Stalled,
    /// Iteration limit reached.
    MaxIterations,
}

/// Outcome of [`minimize`].
#[derive(Debug, Clone, Copy)]
pub struct Minimization {
    pub termination: Termination,
    pub energy: f64,
    pub iterations: u32,
}

/// Minimizes `f` over the box `[lb, ub]` starting from `x`, in place.
///
/// `f(x, grad)` returns the energy and overwrites `grad`.
pub fn minimize<F>(
    mut f: F,
    x: &mut [f64],
    lb: &[f64],
    ub: &[f64],
    params: &LbfgsbParams,
) -> Result<Minimization, MinimizeError>
where
    F: FnMut(&[f64], &mut [f64]) -> f64,
{
    let n = x.len();
    for i in 0..n {
        x[i] = x[i].clamp(lb[i], ub[i]);
    }
    let mut grad = vec![0.0; n];
    let mut fx = f(x, &mut grad);
    if !fx.is_finite() || grad.iter().any(|g| !g.is_finite()) {
        return Err(MinimizeError::NonFinite);
    }

    let mut history: VecDeque<(Vec<f64>, Vec<f64>, f64)> = VecDeque::with_capacity(params.memory);
    let mut trial = vec![0.0; n];
    let mut trial_grad = vec![0.0; n];

    for iteration in 0..params.max_iterations {
        let free = free_variables(x, &grad, lb, ub);
        let tolerance = params.epsilon * norm(x).max(1.0);
        if projected_gradient_norm(x, &grad, lb, ub) <= tolerance {
            return Ok(Minimization {
                termination: Termination::Converged,
                energy: fx,
                iterations: iteration,
            });
        }

        let mut dir = two_loop(&grad, &free, &history);
        if !(dot(&dir, &grad) < 0.0) {
            history.clear();
            dir = grad.iter().zip(&free).map(|(g, &f)| if f { -g } else { 0.0 }).collect();
        }
        // First iteration without curvature information: unit-length step.
        let mut alpha = if history.is_empty() {
            1.0 / norm(&dir).max(f64::EPSILON)
        } else {
            1.0
        };

        let mut accepted = false;
        let mut trials = 0;
        let mut f_trial = fx;
        while trials < params.max_linesearch {
            trials += 1;
            for i in 0..n {
                trial[i] = (x[i] + alpha * dir[i]).clamp(lb[i], ub[i]);
            }
            f_trial = f(&trial, &mut trial_grad);
            let decrease: f64 = (0..n).map(|i| grad[i] * (trial[i] - x[i])).sum();
            if f_trial.is_finite() && decrease < 0.0 && f_trial <= fx + params.ftol * decrease {
                accepted = true;
                break;
            }
            alpha *= backtrack_factor(fx, f_trial, decrease);
        }
        if !accepted {
            return Err(MinimizeError::LineSearchFailed(trials));
        }
        if trial_grad.iter().any(|g| !g.is_finite()) {
            return Err(MinimizeError::NonFinite);
        }

        let s: Vec<f64> = (0..n).map(|i| trial[i] - x[i]).collect();
        let y: Vec<f64> = (0..n).map(|i| trial_grad[i] - grad[i]).collect();
        let sy = dot(&s, &y);
        if sy > f64::EPSILON * dot(&y, &y) {
            if history.len() == params.memory {
                history.pop_front();
            }
            history.push_back((s, y, 1.0 / sy));
        }

        let previous = fx;
        x.copy_from_slice(&trial);
        grad.copy_from_slice(&trial_grad);
        fx = f_trial;

        if (previous - fx) / fx.abs().max(1.0) < params.delta {
            return Ok(Minimization {
                termination: Termination::Stalled,
                energy: fx,
                iterations: iteration + 1,
            });
        }
    }

    Ok(Minimization {
        termination: Termination::MaxIterations,
        energy: fx,
        iterations: params.max_iterations,
    })
}

/// Shrink factor for a rejected trial: minimizer of the quadratic through
/// `φ(0) = f0`, `φ'(0)·α = decrease` and `φ(α) = f_trial`, kept in `[0.01, 0.5]`.
fn backtrack_factor(f0: f64, f_trial: f64, decrease: f64) -> f64 {
    if !f_trial.is_finite() || !(decrease < 0.0) {
        return 0.1;
    }
    let curvature = f_trial - f0 - decrease;
    if curvature <= 0.0 {
        return 0.5;
    }
    (-decrease / (2.0 * curvature)).clamp(0.01, 0.5)
}

/// Free variables: not on a bound that the negative gradient points past.
fn free_variables(x: &[f64], grad: &[f64], lb: &[f64], ub: &[f64]) -> Vec<bool> {
    (0..x.len())
        .map(|i| !((x[i] <= lb[i] && grad[i] > 0.0) || (x[i] >= ub[i] && grad[i] < 0.0)))
        .collect()
}

/// Infinity norm of `P(x − g) − x`.
fn projected_gradient_norm(x: &[f64], grad: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
    (0..x.len())
        .map(|i| ((x[i] - grad[i]).clamp(lb[i], ub[i]) - x[i]).abs())
        .fold(0.0, f64::max)
}

/// `−H·g` restricted to the free variables.
fn two_loop(grad: &[f64], free: &[bool], history: &VecDeque<(Vec<f64>, Vec<f64>, f64)>) -> Vec<f64> {
    let mask = |v: &mut Vec<f64>| {
        for (x, &f) in v.iter_mut().zip(free) {
            if !f {
                *x = 0.0;
            }
        }
    };
    let mut q = grad.to_vec();
    mask(&mut q);

    let mut alphas = Vec::with_capacity(history.len());
    for (s, y, rho) in history.iter().rev() {
        let a = rho * dot(s, &q);
        for (qi, yi) in q.iter_mut().zip(y) {
            *qi -= a * yi;
        }
        alphas.push(a);
    }
    if let Some((s, y, _)) = history.back() {
        let gamma = dot(s, y) / dot(y, y);
        for qi in q.iter_mut() {
            *qi *= gamma;
        }
    }
    for ((s, y, rho), a) in history.iter().zip(alphas.iter().rev()) {
        let b = rho * dot(y, &q);
        for (qi, si) in q.iter_mut().zip(s) {
            *qi += (a - b) * si;
        }
    }
    for qi in q.iter_mut() {
        *qi = -*qi;
    }
    mask(&mut q);
    q
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Quasi-Newton solver minimizing the mesh energy within its box bounds.
#[derive(Debug, Clone)]
pub struct LbfgsbSolver {
    params: LbfgsbParams,
}

impl LbfgsbSolver {
    pub fn new(params: LbfgsbParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LbfgsbParams {
        &self.params
    }
}

impl Default for LbfgsbSolver {
    fn default() -> Self {
        Self::new(LbfgsbParams::default())
    }
}

impl Solver for LbfgsbSolver {
    fn reset(&mut self, _mesh: &SimulationMesh) {}

    fn step(&mut self, mesh: &mut SimulationMesh) -> StepResult {
        let (lb, ub) = dof_bounds(mesh);
        let mut x = mesh.x.clone();
        let outcome = {
            let energy = |x: &[f64], grad: &mut [f64]| mesh.energy(x, Some(grad));
            minimize(energy, &mut x, &lb, &ub, &self.params)
        };

        let (converged, energy, iterations) = match outcome {
            Ok(m) => {
                tracing::debug!(termination = ?m.termination, energy = m.energy, iterations = m.iterations, "l-bfgs-b step");
                mesh.x = x;
                (m.termination != Termination::MaxIterations, m.energy, m.iterations)
            }
            Err(MinimizeError::LineSearchFailed(trials)) => {
                tracing::debug!(trials, "l-bfgs-b line search failed, treating as converged");
                mesh.x = x;
                (true, mesh.energy(&mesh.x, None), 0)
            }
            Err(e) => {
                tracing::warn!(error = %e, "l-bfgs-b aborted, keeping previous configuration");
                (true, f64::NAN, 0)
            }
        };

        StepResult {
            converged: settle(mesh, converged),
            energy,
            iterations,
        }
    }

    fn name(&self) -> &str {
        "l-bfgs-b"
    }

    fn clone_box(&self) -> Box<dyn Solver> {
        Box::new(self.clone())
    }
}
