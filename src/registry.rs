//! Central registry of benchmark scenarios.
//!
//! Every scenario runs each [`Strategy`] once against a freshly built
//! instance, so no state leaks between strategies or between scenarios.
//! To add a scenario, add a [`ScenarioCase`] to [`STANDARD_SCENARIOS`];
//! the binary and the tests pick it up automatically.

use tracing::info;

use crate::builder::Strategy;
use crate::driver::{Driver, RunOutcome};
use crate::error::{BenchError, ConfigError};
use crate::report::{Report, ResultCollector};
use crate::workload::{KeyPattern, OpMix, WorkloadSpec};

// ============================================================================
// Scenario Registry
// ============================================================================

/// Scenario definition with metadata.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCase {
    /// Short identifier (e.g., "write_heavy").
    pub id: &'static str,
    /// Report header (e.g., "Write-Heavy Workload").
    pub display_name: &'static str,
    /// Distinct keys; `None` gives every iteration its own key.
    pub key_space: Option<u64>,
    pub mix: OpMix,
    pub pattern: KeyPattern,
    /// Keys `[0, prepopulate)` are set to themselves before timing starts.
    pub prepopulate: u64,
}

/// Standard scenario suite.
pub const STANDARD_SCENARIOS: &[ScenarioCase] = &[
    ScenarioCase {
        id: "write_heavy",
        display_name: "Write-Heavy Workload",
        key_space: Some(1_000),
        mix: OpMix::write_heavy(),
        pattern: KeyPattern::Modulo,
        prepopulate: 0,
    },
    ScenarioCase {
        id: "read_heavy",
        display_name: "Read-Heavy Workload",
        key_space: Some(1_000),
        mix: OpMix::read_heavy(),
        pattern: KeyPattern::Modulo,
        prepopulate: 1_000,
    },
    ScenarioCase {
        id: "contention",
        display_name: "High-Contention Workload",
        key_space: Some(10),
        mix: OpMix::balanced(),
        pattern: KeyPattern::Modulo,
        prepopulate: 0,
    },
    ScenarioCase {
        id: "round_trip",
        display_name: "All Implementations",
        key_space: None,
        mix: OpMix::RoundTrip,
        pattern: KeyPattern::Sequential,
        prepopulate: 0,
    },
];

/// Looks up a standard scenario by id.
pub fn find_scenario(id: &str) -> Option<&'static ScenarioCase> {
    STANDARD_SCENARIOS.iter().find(|case| case.id == id)
}

impl ScenarioCase {
    /// The workload for this scenario at `iterations` operations.
    pub fn spec(&self, iterations: u64) -> Result<WorkloadSpec, ConfigError> {
        let key_space = self.key_space.unwrap_or(iterations);
        WorkloadSpec::try_new(iterations, key_space, self.mix, self.pattern)?
            .with_prepopulate(self.prepopulate)
    }
}

/// Result of running one scenario across every strategy.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub report: Report,
    /// One entry per strategy, in [`Strategy::ALL`] order.
    pub outcomes: Vec<RunOutcome>,
}

impl ScenarioRun {
    pub fn outcome(&self, strategy: Strategy) -> Option<&RunOutcome> {
        self.outcomes.iter().find(|o| o.strategy == strategy)
    }
}

/// Runs `case` once per strategy on `driver`.
///
/// # Errors
///
/// Stops at the first strategy that fails to build or stalls.
pub fn run_scenario(driver: &Driver, case: &ScenarioCase) -> Result<ScenarioRun, BenchError> {
    let config = driver.config();
    let spec = case.spec(config.iterations)?;
    info!(
        scenario = case.id,
        iterations = spec.iterations(),
        key_space = spec.key_space(),
        "scenario starting"
    );

    let mut collector = ResultCollector::new(case.display_name, spec.iterations(), config.workers);
    let mut outcomes = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let outcome = driver.run_strategy(strategy, &spec)?;
        collector.record(outcome.timing());
        outcomes.push(outcome);
    }

    let report = collector.into_report().with_name_width(config.name_width);
    if let Some(fastest) = report.fastest() {
        info!(
            scenario = case.id,
            fastest = %fastest.label,
            seconds = fastest.seconds,
            "scenario finished"
        );
    }
    Ok(ScenarioRun { report, outcomes })
}
