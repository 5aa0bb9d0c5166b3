//! # ruffles-bench
//!
//! Benchmark suite for ruffle physics solves.
//!
//! Provides 4 procedural scenarios, a runner that times repeated solves,
//! and CSV export of the collected metrics for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind, Subject};
