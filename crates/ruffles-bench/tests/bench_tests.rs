//! Integration tests for ruffles-bench.

use ruffles_bench::metrics::BenchmarkMetrics;
use ruffles_bench::runner::BenchmarkRunner;
use ruffles_bench::scenarios::{Scenario, ScenarioKind, Subject};
use ruffles_solver::SolverConfig;

fn quick() -> SolverConfig {
    SolverConfig {
        max_steps: 5,
        ..SolverConfig::fast()
    }
}

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn scenario_names_roundtrip() {
    for &kind in ScenarioKind::all() {
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
    }
    assert_eq!(ScenarioKind::from_name("hanging_sheet"), None);
}

#[test]
fn ruffle_stack_setup() {
    let s = Scenario::ruffle_stack().expect("scenario");
    assert_eq!(s.kind, ScenarioKind::RuffleStack);
    assert_eq!(s.subject.mesh().segment_count(), 106);
    assert_eq!(s.subject.mesh().dof(), 204);
    assert_eq!(s.solves, 1);
}

#[test]
fn horizontal_strip_setup() {
    let s = Scenario::horizontal_strip();
    assert!(matches!(s.subject, Subject::Mesh(_)));
    assert_eq!(s.subject.mesh().segment_count(), 40);
    assert_eq!(s.subject.mesh().dof(), 78);
    assert!(s.subject.mesh().consistent_lengths());
}

#[test]
fn densified_stack_setup() {
    let s = Scenario::densified_stack().expect("scenario");
    match &s.subject {
        Subject::Ruffle(ruffle) => {
            assert_eq!(ruffle.sections().len(), 11);
            ruffle.verify().expect("verify");
        }
        Subject::Mesh(_) => panic!("densified stack should carry a ruffle"),
    }
}

#[test]
fn horizontal_stack_setup() {
    let s = Scenario::from_kind(ScenarioKind::HorizontalStack).expect("scenario");
    assert_eq!(s.kind, ScenarioKind::HorizontalStack);
    assert!(s.subject.mesh().dof() > 0);
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn csv_rows_match_header() {
    let metrics = BenchmarkRunner::run(&Scenario::horizontal_strip().with_config(quick()))
        .expect("run");
    let header_cols = BenchmarkMetrics::to_csv_header().split(',').count();
    let row_cols = metrics.to_csv_row().split(',').count();
    assert_eq!(header_cols, row_cols);

    let csv = BenchmarkMetrics::to_csv(&[metrics.clone(), metrics]);
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn metrics_json_roundtrip() {
    let metrics = BenchmarkRunner::run(&Scenario::horizontal_strip().with_config(quick()))
        .expect("run");
    let json = serde_json::to_string(&metrics).expect("serialize");
    let back: BenchmarkMetrics = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.scenario, metrics.scenario);
    assert_eq!(back.total_steps, metrics.total_steps);
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn strip_benchmark_runs() {
    let scenario = Scenario::horizontal_strip().with_config(quick()).with_solves(2);
    let metrics = BenchmarkRunner::run(&scenario).expect("run");
    assert_eq!(metrics.scenario, "horizontal_strip");
    assert_eq!(metrics.solver, "l-bfgs-b");
    assert_eq!(metrics.solves, 2);
    assert_eq!(metrics.dof, 78);
    assert!(metrics.total_steps >= 2 && metrics.total_steps <= 10);
    assert!(metrics.min_solve_time <= metrics.max_solve_time);
    assert!(metrics.final_energy.is_finite());
    assert!(metrics.max_displacement > 0.0);
}

#[test]
fn runner_leaves_scenario_untouched() {
    let scenario = Scenario::horizontal_strip().with_config(quick());
    let before = scenario.subject.mesh().x.clone();
    BenchmarkRunner::run(&scenario).expect("run");
    assert_eq!(scenario.subject.mesh().x, before);
}

#[test]
fn invalid_config_rejected() {
    let config = SolverConfig {
        max_steps: 0,
        ..SolverConfig::default()
    };
    let scenario = Scenario::horizontal_strip().with_config(config);
    assert!(BenchmarkRunner::run(&scenario).is_err());
}

#[test]
fn run_all_covers_every_scenario() {
    let results = BenchmarkRunner::run_all(|s| s.with_config(quick())).expect("run all");
    assert_eq!(results.len(), ScenarioKind::all().len());
    for (metrics, kind) in results.iter().zip(ScenarioKind::all()) {
        assert_eq!(metrics.scenario, kind.name());
        assert!(metrics.total_steps >= 1);
    }
}
