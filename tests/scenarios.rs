// ==============================================
// END-TO-END SCENARIO TESTS (integration)
// ==============================================

use syncbench::builder::Strategy;
use syncbench::config::HarnessConfig;
use syncbench::driver::Driver;
use syncbench::registry::{ScenarioRun, find_scenario, run_scenario};

const ITERATIONS: u64 = 100_000;

fn run(id: &str) -> ScenarioRun {
    let driver = Driver::new(HarnessConfig::default().with_iterations(ITERATIONS)).unwrap();
    run_scenario(&driver, find_scenario(id).unwrap()).unwrap()
}

#[test]
fn write_heavy_ranks_every_strategy_once() {
    let run = run("write_heavy");
    let report = &run.report;

    assert_eq!(report.iterations(), ITERATIONS);
    assert_eq!(report.rows().len(), Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let lines = report
            .rows()
            .iter()
            .filter(|row| row.label == strategy.label())
            .count();
        assert_eq!(lines, 1, "{strategy}");
    }

    assert_eq!(report.fastest().unwrap().slowdown_pct, 0.0);
    assert!(report.rows().iter().all(|row| row.slowdown_pct >= 0.0));

    let text = report.render();
    assert!(text.starts_with("=== Write-Heavy Workload ===\n"));
    assert_eq!(text.lines().count(), 3 + Strategy::ALL.len());
    assert!(text.contains("(0.0% slower than fastest)"));

    for outcome in &run.outcomes {
        assert_eq!(outcome.reads + outcome.writes, ITERATIONS, "{}", outcome.label());
        assert_eq!(outcome.writes, ITERATIONS / 4 * 3);
    }
}

#[test]
fn high_contention_reads_only_see_written_values() {
    let run = run("contention");

    for strategy in [Strategy::RwLock, Strategy::BarrierQueue] {
        let outcome = run.outcome(strategy).unwrap();
        assert_eq!(outcome.reads, ITERATIONS / 2);
        assert_eq!(outcome.inconsistent_reads, 0, "{strategy}");
    }
    for outcome in &run.outcomes {
        assert_eq!(outcome.inconsistent_reads, 0, "{}", outcome.label());
    }
}

#[test]
fn read_heavy_after_prepopulation_never_misses() {
    let run = run("read_heavy");

    for outcome in &run.outcomes {
        assert_eq!(outcome.reads, ITERATIONS / 4 * 3, "{}", outcome.label());
        assert_eq!(outcome.misses, 0, "{}", outcome.label());
        assert_eq!(outcome.inconsistent_reads, 0, "{}", outcome.label());
    }
}

#[test]
fn round_trip_reads_its_own_writes() {
    let driver = Driver::new(HarnessConfig::default().with_iterations(10_000)).unwrap();
    let run = run_scenario(&driver, find_scenario("round_trip").unwrap()).unwrap();

    for outcome in &run.outcomes {
        assert_eq!(outcome.reads, 10_000);
        assert_eq!(outcome.inconsistent_reads, 0, "{}", outcome.label());
        // Sequential keys overflow the bounded strategy's capacity.
        if !outcome.strategy.may_evict() {
            assert_eq!(outcome.misses, 0, "{}", outcome.label());
        }
    }
}
