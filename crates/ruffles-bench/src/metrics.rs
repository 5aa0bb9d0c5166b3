//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub scenario: String,
    pub solver: String,
    pub vertex_count: usize,
    pub segment_count: usize,
    pub dof: usize,
    /// Number of timed solves.
    pub solves: u32,
    /// Solver steps summed over all solves.
    pub total_steps: u32,
    /// Solves that converged before the step cap.
    pub converged: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    pub min_solve_time: f64,
    pub max_solve_time: f64,
    /// Energy after the last step.
    pub final_energy: f64,
    /// Largest movement of a vertex from its initial position.
    pub max_displacement: f64,
    /// Whether every segment stayed within the length tolerance.
    pub consistent_lengths: bool,
}

impl BenchmarkMetrics {
    pub fn avg_solve_time(&self) -> f64 {
        if self.solves == 0 {
            0.0
        } else {
            self.total_wall_time / self.solves as f64
        }
    }

    pub fn to_csv_header() -> String {
        "scenario,solver,vertex_count,segment_count,dof,solves,total_steps,converged,total_wall_time_s,avg_solve_ms,min_solve_ms,max_solve_ms,final_energy,max_displacement,consistent_lengths".to_string()
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6},{}",
            self.scenario,
            self.solver,
            self.vertex_count,
            self.segment_count,
            self.dof,
            self.solves,
            self.total_steps,
            self.converged,
            self.total_wall_time,
            self.avg_solve_time() * 1000.0,
            self.min_solve_time * 1000.0,
            self.max_solve_time * 1000.0,
            self.final_energy,
            self.max_displacement,
            self.consistent_lengths,
        )
    }

    /// Header plus one row per run.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
