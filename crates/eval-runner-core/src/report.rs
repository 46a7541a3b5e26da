//! Result aggregation and the structured report.

use crate::types::{EvalRecord, EvalResult, RunReport, RunSummary, Verdict};

/// Output mode, chosen once for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One line per eval as it completes, then a summary line.
    #[default]
    Text,
    /// A single JSON document at the end; nothing printed incrementally.
    Json,
}

impl ReportFormat {
    #[must_use]
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Folds verdicts into counts and keeps the per-eval results in order.
///
/// Owned by a single run, so several runs can coexist in one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    results: Vec<EvalResult>,
    summary: RunSummary,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, eval: &EvalRecord, verdict: &Verdict) {
        self.summary.record(verdict.status);
        self.results.push(EvalResult::new(eval, verdict));
    }

    #[must_use]
    pub const fn summary(&self) -> RunSummary {
        self.summary
    }

    #[must_use]
    pub fn results(&self) -> &[EvalResult] {
        &self.results
    }

    /// Consume the aggregator into a report tagged with `runner`.
    #[must_use]
    pub fn into_report(self, runner: impl Into<String>) -> RunReport {
        RunReport {
            runner: runner.into(),
            results: self.results,
            summary: self.summary,
        }
    }
}

/// Render the structured report as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn format_report_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
