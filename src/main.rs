//! Circuit Copilot - DC analysis of circuit descriptions
//!
//! Reads a normalized JSON circuit description, solves its DC operating
//! point, runs the safety rules and prints the report as JSON.
//!
//! # Usage
//!
//! ```bash
//! copilot led.json --pretty
//! RUST_LOG=debug copilot led.json --high-voltage 24
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use circuit_copilot_core::{
    analysis::{analyze, AnalysisConfig, Report},
    error::Result,
    ingest,
    safety::{SafetyConfig, Severity},
    solver::SolverConfig,
};

/// DC operating point and safety check for a circuit description
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file (.json)
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Node voltage above which a warning is raised, in volts
    #[arg(long)]
    high_voltage: Option<f64>,

    /// Maximum diode-state iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Solve circuits with no source or no ground
    #[arg(long)]
    allow_incomplete: bool,

    /// Fail on solver faults and critical diagnostics
    #[arg(long)]
    strict: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

impl Args {
    /// Command-line flags layered over the description's own settings.
    fn config(&self, base: AnalysisConfig) -> AnalysisConfig {
        let mut solver: SolverConfig = base.solver;
        if let Some(n) = self.max_iterations {
            solver = solver.with_max_iterations(n);
        }
        if self.allow_incomplete {
            solver = solver.with_allow_incomplete(true);
        }
        let mut safety: SafetyConfig = base.safety;
        if let Some(volts) = self.high_voltage {
            safety = safety.with_high_voltage_threshold(volts);
        }
        AnalysisConfig::default().with_solver(solver).with_safety(safety)
    }
}

fn run(args: &Args) -> Result<bool> {
    let description = ingest::load(&args.circuit_file)?;
    let circuit = description.build()?;
    let config = args.config(description.config.clone().unwrap_or_default());

    let analysis = analyze(&circuit, &config)?;
    if args.strict {
        analysis.state.ensure_valid()?;
    }
    let critical = analysis
        .diagnostics
        .iter()
        .any(|d| d.severity == Severity::Critical);

    let report = Report::new(description.title.clone(), &circuit, analysis);
    println!("{}", report.to_json(args.pretty)?);
    Ok(!(args.strict && critical))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            tracing::error!("critical diagnostics reported");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "analysis failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
