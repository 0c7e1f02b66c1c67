//! Scenario runner - run with: `cargo run --release --bin syncbench -- <scenario>`
//!
//! Prints one ranked report per scenario. Iteration count, worker count and
//! the stall timeout come from `SYNCBENCH_*` environment variables; log
//! verbosity comes from `RUST_LOG`.

use std::process::ExitCode;

use syncbench::config::HarnessConfig;
use syncbench::driver::Driver;
use syncbench::error::BenchError;
use syncbench::registry::{STANDARD_SCENARIOS, ScenarioCase, find_scenario, run_scenario};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let json = args.iter().any(|arg| arg == "--json");

    // First non-flag argument selects the scenario
    let Some(selection) = args.iter().skip(1).find(|arg| !arg.starts_with('-')) else {
        print_usage();
        return ExitCode::SUCCESS;
    };

    let cases: Vec<&ScenarioCase> = match selection.as_str() {
        "all" => STANDARD_SCENARIOS.iter().collect(),
        id => match find_scenario(id) {
            Some(case) => vec![case],
            None => {
                eprintln!("Unknown scenario: {id}");
                print_usage();
                return ExitCode::FAILURE;
            },
        },
    };

    match run(&cases, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "benchmark aborted");
            ExitCode::FAILURE
        },
    }
}

fn run(cases: &[&ScenarioCase], json: bool) -> Result<(), BenchError> {
    let config = HarnessConfig::from_env()?;
    let driver = Driver::new(config)?;

    for case in cases {
        let scenario = run_scenario(&driver, case)?;
        if json {
            match scenario.report.to_json() {
                Ok(text) => println!("{text}"),
                Err(err) => error!(scenario = case.id, %err, "failed to serialize report"),
            }
        } else {
            println!();
            print!("{}", scenario.report);
        }
    }
    Ok(())
}

fn print_usage() {
    println!("Usage: syncbench <scenario|all> [--json]");
    println!();
    println!("Available scenarios:");
    for case in STANDARD_SCENARIOS {
        println!("  {:<12} - {}", case.id, case.display_name);
    }
    println!("  {:<12} - Run every scenario", "all");
}
