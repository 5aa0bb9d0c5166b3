//! Benchmark runner: times repeated physics solves and collects metrics.

use std::time::Instant;

use ruffles_mesh::SimulationMesh;
use ruffles_solver::Solver;
use ruffles_types::RuffleResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind, Subject};

/// Outcome of one timed solve.
struct Timed {
    steps: u32,
    converged: bool,
    energy: f64,
    wall_time: f64,
}

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Runs `scenario.solves` solves on a copy of the scenario subject.
    pub fn run(scenario: &Scenario) -> RuffleResult<BenchmarkMetrics> {
        scenario.config.validate()?;
        let mut subject = scenario.subject.clone();
        let initial = subject.mesh().x.clone();
        let mut solver = scenario.config.build();
        if let Subject::Ruffle(ruffle) = &mut subject {
            ruffle.configure_solver(&scenario.config);
        }

        let mut times = Vec::with_capacity(scenario.solves as usize);
        let mut total_steps = 0;
        let mut converged = 0;
        let mut final_energy = f64::NAN;
        for _ in 0..scenario.solves {
            let timed = match &mut subject {
                Subject::Ruffle(ruffle) => {
                    let report = ruffle.physics_solve();
                    Timed {
                        steps: report.steps,
                        converged: report.converged,
                        energy: report.energy,
                        wall_time: report.wall_time,
                    }
                }
                Subject::Mesh(mesh) => solve_mesh(mesh, solver.as_mut(), scenario.config.max_steps),
            };
            total_steps += timed.steps;
            converged += u32::from(timed.converged);
            final_energy = timed.energy;
            times.push(timed.wall_time);
        }

        let mesh = subject.mesh();
        let max_displacement = mesh
            .x
            .chunks_exact(2)
            .zip(initial.chunks_exact(2))
            .map(|(a, b)| (a[0] - b[0]).hypot(a[1] - b[1]))
            .fold(0.0, f64::max);
        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            solver: solver.name().to_string(),
            vertex_count: mesh.vertex_count(),
            segment_count: mesh.segment_count(),
            dof: mesh.dof(),
            solves: scenario.solves,
            total_steps,
            converged,
            total_wall_time: times.iter().sum(),
            min_solve_time: times.iter().copied().fold(f64::INFINITY, f64::min),
            max_solve_time: times.iter().copied().fold(0.0, f64::max),
            final_energy,
            max_displacement,
            consistent_lengths: mesh.consistent_lengths(),
        };
        tracing::info!(
            scenario = %metrics.scenario,
            steps = metrics.total_steps,
            wall_time = metrics.total_wall_time,
            "benchmark finished"
        );
        Ok(metrics)
    }

    /// Runs every scenario, applying `configure` to each before running.
    pub fn run_all(
        configure: impl Fn(Scenario) -> Scenario,
    ) -> RuffleResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&configure(Scenario::from_kind(kind)?)))
            .collect()
    }
}

/// The physics solve loop for a bare mesh without topology.
fn solve_mesh(mesh: &mut SimulationMesh, solver: &mut dyn Solver, max_steps: u32) -> Timed {
    let start = Instant::now();
    solver.reset(mesh);
    mesh.relax_air_mesh();
    let mut steps = 0;
    let mut converged = false;
    let mut energy = f64::NAN;
    while steps < max_steps && !converged {
        steps += 1;
        let result = solver.step(mesh);
        energy = result.energy;
        converged = result.converged;
    }
    Timed {
        steps,
        converged,
        energy,
        wall_time: start.elapsed().as_secs_f64(),
    }
}
