//! Timing aggregation and report rendering.
//!
//! A [`ResultCollector`] is created per scenario and handed the timing of
//! every strategy run. [`ResultCollector::into_report`] ranks the entries
//! fastest first and computes each entry's slowdown relative to the fastest:
//!
//! ```text
//! slowdown_pct = (elapsed / fastest - 1) * 100
//! ```
//!
//! The [`Report`] renders as a fixed-width text table or as JSON.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

const RULE: &str = "-------------------------------";

/// Default column width for strategy names.
pub const DEFAULT_NAME_WIDTH: usize = 30;

/// Elapsed wall-clock time of one labelled run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingResult {
    pub label: String,
    pub elapsed: Duration,
}

impl TimingResult {
    pub fn new(label: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            label: label.into(),
            elapsed,
        }
    }
}

/// Collects timings for one scenario.
///
/// Labels are unique: recording a label again replaces the earlier entry.
#[derive(Debug, Clone)]
pub struct ResultCollector {
    scenario: String,
    iterations: u64,
    workers: usize,
    results: Vec<TimingResult>,
}

impl ResultCollector {
    pub fn new(scenario: impl Into<String>, iterations: u64, workers: usize) -> Self {
        Self {
            scenario: scenario.into(),
            iterations,
            workers,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: TimingResult) {
        match self.results.iter_mut().find(|r| r.label == result.label) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }
    }

    pub fn get(&self, label: &str) -> Option<&TimingResult> {
        self.results.iter().find(|r| r.label == label)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Ranks the collected timings.
    pub fn into_report(self) -> Report {
        let mut results = self.results;
        results.sort_by_key(|r| r.elapsed);

        let fastest = results.first().map(|r| r.elapsed);
        let rows = results
            .into_iter()
            .map(|r| ReportRow {
                slowdown_pct: fastest.map_or(0.0, |f| slowdown_pct(r.elapsed, f)),
                seconds: r.elapsed.as_secs_f64(),
                label: r.label,
            })
            .collect();

        Report {
            scenario: self.scenario,
            iterations: self.iterations,
            workers: self.workers,
            name_width: DEFAULT_NAME_WIDTH,
            rows,
        }
    }
}

fn slowdown_pct(elapsed: Duration, fastest: Duration) -> f64 {
    if fastest.is_zero() {
        return if elapsed.is_zero() { 0.0 } else { f64::INFINITY };
    }
    (elapsed.as_secs_f64() / fastest.as_secs_f64() - 1.0) * 100.0
}

/// One ranked line of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub seconds: f64,
    pub slowdown_pct: f64,
}

/// Ranked timings of one scenario, fastest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    scenario: String,
    iterations: u64,
    workers: usize,
    name_width: usize,
    rows: Vec<ReportRow>,
}

#[derive(Serialize)]
struct ReportArtifact<'a> {
    timestamp: String,
    scenario: &'a str,
    iterations: u64,
    workers: usize,
    results: &'a [ReportRow],
}

impl Report {
    /// Sets the column width used for names by [`Report::render`].
    pub fn with_name_width(mut self, width: usize) -> Self {
        self.name_width = width;
        self
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn fastest(&self) -> Option<&ReportRow> {
        self.rows.first()
    }

    /// Text table: header, rule, then one line per entry.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Pretty JSON with run metadata and the ranked rows.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let artifact = ReportArtifact {
            timestamp: Utc::now().to_rfc3339(),
            scenario: &self.scenario,
            iterations: self.iterations,
            workers: self.workers,
            results: &self.rows,
        };
        serde_json::to_string_pretty(&artifact)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.name_width;
        writeln!(f, "=== {} ===", self.scenario)?;
        writeln!(f, "Iterations per test: {}", self.iterations)?;
        writeln!(f, "{RULE}")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<width$.width$} : {:.4} seconds ({:.1}% slower than fastest)",
                row.label, row.seconds, row.slowdown_pct
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector() -> ResultCollector {
        let mut collector = ResultCollector::new("Write-Heavy", 100_000, 8);
        collector.record(TimingResult::new("Serial Queue", Duration::from_millis(300)));
        collector.record(TimingResult::new("Mutex", Duration::from_millis(100)));
        collector.record(TimingResult::new("RW Lock", Duration::from_millis(150)));
        collector
    }

    #[test]
    fn ranks_fastest_first() {
        let report = collector().into_report();
        let labels: Vec<_> = report.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Mutex", "RW Lock", "Serial Queue"]);

        assert_eq!(report.fastest().unwrap().slowdown_pct, 0.0);
        assert!((report.rows()[1].slowdown_pct - 50.0).abs() < 1e-9);
        assert!((report.rows()[2].slowdown_pct - 200.0).abs() < 1e-9);
    }

    #[test]
    fn re_recording_replaces() {
        let mut collector = collector();
        collector.record(TimingResult::new("Mutex", Duration::from_millis(400)));
        assert_eq!(collector.len(), 3);
        assert_eq!(
            collector.get("Mutex").unwrap().elapsed,
            Duration::from_millis(400)
        );

        let report = collector.into_report();
        assert_eq!(report.fastest().unwrap().label, "RW Lock");
    }

    #[test]
    fn renders_fixed_width_lines() {
        let text = collector().into_report().with_name_width(12).render();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "=== Write-Heavy ===");
        assert_eq!(lines[1], "Iterations per test: 100000");
        assert_eq!(lines[2], RULE);
        assert_eq!(
            lines[3],
            "Mutex        : 0.1000 seconds (0.0% slower than fastest)"
        );
        assert_eq!(
            lines[5],
            "Serial Queue : 0.3000 seconds (200.0% slower than fastest)"
        );
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn long_names_are_truncated() {
        let mut collector = ResultCollector::new("x", 1, 1);
        collector.record(TimingResult::new("Concurrent Queue", Duration::from_secs(1)));
        let text = collector.into_report().with_name_width(4).render();
        assert!(text.contains("\nConc : 1.0000 seconds"));
    }

    #[test]
    fn zero_fastest_does_not_divide_by_zero() {
        let mut collector = ResultCollector::new("x", 1, 1);
        collector.record(TimingResult::new("a", Duration::ZERO));
        collector.record(TimingResult::new("b", Duration::ZERO));
        collector.record(TimingResult::new("c", Duration::from_nanos(1)));
        let report = collector.into_report();
        assert_eq!(report.rows()[0].slowdown_pct, 0.0);
        assert_eq!(report.rows()[1].slowdown_pct, 0.0);
        assert!(report.rows()[2].slowdown_pct.is_infinite());
    }

    #[test]
    fn json_carries_metadata_and_rows() {
        let json = collector().into_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["scenario"], "Write-Heavy");
        assert_eq!(value["iterations"], 100_000);
        assert_eq!(value["workers"], 8);
        assert_eq!(value["results"][0]["label"], "Mutex");
        assert_eq!(value["results"].as_array().unwrap().len(), 3);
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn empty_collector_renders_header_only() {
        let collector = ResultCollector::new("Empty", 10, 1);
        assert!(collector.is_empty());
        let report = collector.into_report();
        assert!(report.fastest().is_none());
        assert_eq!(report.render().lines().count(), 3);
    }
}
