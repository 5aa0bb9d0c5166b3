//! CLI command implementations.

use ruffles_bench::metrics::BenchmarkMetrics;
use ruffles_bench::runner::BenchmarkRunner;
use ruffles_bench::scenarios::{Scenario, ScenarioKind};
use ruffles_solver::SolverConfig;
use ruffles_telemetry::{EventBus, TracingSink};
use ruffles_topology::Ruffle;

use crate::config::RunConfig;

/// Build a ruffle from a run config and solve it once.
pub fn solve(config_path: &str, output_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("ruffles solve");
    println!("─────────────");
    println!("Config: {config_path}");
    println!();

    let content = std::fs::read_to_string(config_path)?;
    let config = RunConfig::from_toml(&content)?;
    tracing::debug!(path = config_path, layout = ?config.ruffle.layout, steps = config.ruffle.steps, "loaded run config");
    let mut ruffle = config.build()?;
    println!(
        "Ruffle: {} sections, {} segments, {} dof",
        ruffle.sections().len(),
        ruffle.simulation_mesh().segment_count(),
        ruffle.simulation_mesh().dof(),
    );
    println!("Solver: {}", ruffle.solver().name());

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new()));
    let report = ruffle.physics_solve_traced(&mut bus);
    bus.finish();

    println!();
    println!("  Steps:       {}", report.steps);
    println!("  Converged:   {}", report.converged);
    println!("  Energy:      {:.6e}", report.energy);
    println!("  Wall time:   {:.3}s", report.wall_time);
    println!("  Lengths ok:  {}", ruffle.simulation_mesh().consistent_lengths());

    if let Some(path) = output_path {
        std::fs::write(path, serde_json::to_string_pretty(&ruffle)?)?;
        println!("Ruffle written to: {path}");
    }
    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    preset: &str,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("ruffles Benchmark Suite");
    println!("═══════════════════════");
    println!();

    let config = match preset {
        "default" => SolverConfig::default(),
        "fast" => SolverConfig::fast(),
        "precise" => SolverConfig::precise(),
        other => return Err(format!("Unknown preset: '{other}'. Available: default, fast, precise").into()),
    };

    let kinds: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        let kind = ScenarioKind::from_name(scenario_name).ok_or_else(|| {
            let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
            format!("Unknown scenario: '{scenario_name}'. Available: {}, all", available.join(", "))
        })?;
        vec![kind]
    };

    let mut all_metrics = Vec::new();
    for kind in kinds {
        let scenario = Scenario::from_kind(kind)?.with_config(config.clone());
        println!(
            "Running: {} ({} verts, {} segments, {} dof)",
            kind.name(),
            scenario.subject.mesh().vertex_count(),
            scenario.subject.mesh().segment_count(),
            scenario.subject.mesh().dof(),
        );

        let metrics = BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Steps:         {}", metrics.total_steps);
        println!("  Final energy:  {:.6e}", metrics.final_energy);
        println!("  Max displace:  {:.4}", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }

    if let Some(path) = output_path {
        std::fs::write(path, BenchmarkMetrics::to_csv(&all_metrics))?;
        tracing::info!(path, scenarios = all_metrics.len(), "benchmark results written");
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
    }
    Ok(())
}

/// Validate a run config or a saved ruffle.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("ruffles Validator");
    println!("─────────────────");
    println!();

    let content = std::fs::read_to_string(path)?;
    if path.ends_with(".toml") {
        println!("Validating config: {path}");
        let config = RunConfig::from_toml(&content)?;
        match config.validate() {
            Ok(()) => println!("✅ Config is valid ({:?} solver).", config.solver.kind),
            Err(e) => println!("❌ Config validation failed: {e}"),
        }
    } else if path.ends_with(".json") {
        println!("Validating ruffle: {path}");
        let ruffle: Ruffle = serde_json::from_str(&content)?;
        match ruffle.verify() {
            Ok(()) => println!(
                "✅ Ruffle is valid ({} sections, {} segments).",
                ruffle.sections().len(),
                ruffle.simulation_mesh().segment_count()
            ),
            Err(e) => println!("❌ Ruffle validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (config) or .json (ruffle).");
    }
    Ok(())
}
