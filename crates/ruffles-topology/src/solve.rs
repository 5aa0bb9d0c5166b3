//! Physics solve loop and its statistics.

use std::time::Instant;

use ruffles_telemetry::{EventBus, EventKind};
use serde::{Deserialize, Serialize};

use crate::ruffle::Ruffle;

/// Outcome of one [`Ruffle::physics_solve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub steps: u32,
    pub converged: bool,
    /// Wall-clock seconds.
    pub wall_time: f64,
    /// Energy after the last step.
    pub energy: f64,
}

/// Running totals over all solves of a ruffle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    pub solves: u32,
    pub total_time: f64,
    pub last_time: f64,
    pub last_steps: u32,
}

impl SolveStats {
    /// Mean wall time per solve, zero before the first one.
    pub fn average_time(&self) -> f64 {
        if self.solves == 0 {
            0.0
        } else {
            self.total_time / self.solves as f64
        }
    }

    fn record(&mut self, report: &SolveReport) {
        self.solves += 1;
        self.total_time += report.wall_time;
        self.last_time = report.wall_time;
        self.last_steps = report.steps;
    }
}

impl Ruffle {
    /// Steps the solver until it reports convergence or the step cap is
    /// reached. The solver is reset and the air mesh relaxed first.
    pub fn physics_solve(&mut self) -> SolveReport {
        self.solve(None)
    }

    /// [`Ruffle::physics_solve`] with begin, per-step and end events on `bus`.
    /// The bus is flushed before returning.
    pub fn physics_solve_traced(&mut self, bus: &mut EventBus) -> SolveReport {
        let report = self.solve(Some(bus));
        bus.flush();
        report
    }

    fn solve(&mut self, bus: Option<&EventBus>) -> SolveReport {
        let start = Instant::now();
        let index = self.stats.solves;
        let emit = |kind: EventKind| {
            if let Some(bus) = bus {
                bus.emit_kind(index, kind);
            }
        };
        emit(EventKind::SolveBegin {
            dof: self.simulation_mesh.dof(),
            solver: self.solver.name().to_string(),
        });

        self.solver.reset(&self.simulation_mesh);
        let flipped = self.simulation_mesh.relax_air_mesh();
        if flipped {
            emit(EventKind::AirMeshRelaxed { flipped });
        }

        let mut steps = 0;
        let mut converged = false;
        let mut energy = f64::NAN;
        while steps < self.max_steps {
            steps += 1;
            let result = self.solver.step(&mut self.simulation_mesh);
            energy = result.energy;
            emit(EventKind::SolverStep {
                step: steps,
                energy,
                converged: result.converged,
            });
            if result.converged {
                converged = true;
                break;
            }
        }

        let report = SolveReport {
            steps,
            converged,
            wall_time: start.elapsed().as_secs_f64(),
            energy,
        };
        emit(EventKind::SolveEnd {
            steps,
            converged,
            wall_time: report.wall_time,
        });
        self.stats.record(&report);
        if converged {
            tracing::info!(steps, energy, wall_time = report.wall_time, "physics solve converged");
        } else {
            tracing::warn!(steps, energy, "physics solve hit the step cap");
        }
        report
    }
}
