//! ruffles CLI: physics solves, benchmarking and input validation.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "ruffles")]
#[command(version, about = "ruffles: pleated-strip physics and topology engine")]
struct Cli {
    /// Log solver steps and topology edits (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a ruffle from a config file and run one physics solve.
    Solve {
        /// Path to run config (TOML).
        #[arg(short, long, default_value = "ruffle.toml")]
        config: String,

        /// Write the solved ruffle as JSON.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (ruffle_stack, horizontal_stack, horizontal_strip, densified_stack, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Solver preset (default, fast, precise).
        #[arg(short, long, default_value = "default")]
        preset: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a run config (.toml) or a saved ruffle (.json).
    Validate {
        /// Path to config or ruffle file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Solve { config, output } => commands::solve(&config, output.as_deref()),
        Commands::Benchmark {
            scenario,
            preset,
            output,
        } => commands::benchmark(&scenario, &preset, output.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
