//! Streaming human-readable output.

use crate::types::{EvalRecord, RunSummary, Status, Verdict};
use colored::{ColoredString, Colorize};
use serde_json::Value;
use std::io::{self, Write};

/// Reporter configuration.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Dump each eval's given/when/then before its verdict.
    pub verbose: bool,
    /// Only print fail lines.
    pub failures_only: bool,
    /// Use colors in output.
    pub color: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            failures_only: false,
            color: true,
        }
    }
}

/// Prints one line per eval as verdicts arrive, then a summary line.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: ReporterConfig,
}

impl Reporter {
    #[must_use]
    pub const fn new(config: ReporterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Announce the run on stderr, keeping stdout for results.
    pub fn run_start(&self, total: usize) {
        eprintln!("\n{} {total} evals\n", self.paint("Running", |s| s.bold().cyan()));
    }

    /// Print the payload dump for an eval about to be dispatched (verbose only).
    pub fn eval_payloads(&self, given: &Value, when: &Value, then: &Value) {
        if self.config.verbose {
            println!("{}", format_payloads(given, when, then));
        }
    }

    /// Print the verdict line for one eval, honoring `failures_only`.
    pub fn eval_result(&self, eval: &EvalRecord, verdict: &Verdict) {
        if self.shows(verdict.status) {
            println!("{}", format_result_line(eval, verdict, self.config.color));
        }
        self.flush();
    }

    /// Whether a verdict with `status` is printed.
    #[must_use]
    pub const fn shows(&self, status: Status) -> bool {
        matches!(status, Status::Fail) || !self.config.failures_only
    }

    /// Print the final summary line.
    pub fn summary(&self, summary: &RunSummary) {
        println!("\n{}\n", format_summary_line(summary, self.config.color));
    }

    /// Print a warning message.
    pub fn warn(&self, message: &str) {
        eprintln!("{}: {message}", self.paint("warning", |s| s.yellow()));
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        eprintln!("{}: {message}", self.paint("error", |s| s.red()));
    }

    /// Flush stdout.
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        paint(text, self.config.color, style)
    }
}

fn paint(text: &str, color: bool, style: impl Fn(&str) -> ColoredString) -> String {
    if color {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// `PASS <id> - <name>`, with the reason on an indented second line for
/// fail and skip.
#[must_use]
pub fn format_result_line(eval: &EvalRecord, verdict: &Verdict, color: bool) -> String {
    let label = paint(verdict.status.label(), color, |s| match verdict.status {
        Status::Pass => s.green().bold(),
        Status::Fail => s.red().bold(),
        Status::Skip => s.yellow().bold(),
    });
    let head = format!("{label} {} - {}", eval.id, eval.name);
    match verdict.reason() {
        Some(reason) if verdict.status != Status::Pass => {
            format!("{head}\n       {}", paint(reason, color, |s| s.dimmed()))
        }
        _ => head,
    }
}

/// `Results: P passed, F failed, S skipped`. Failed is red only when non-zero.
#[must_use]
pub fn format_summary_line(summary: &RunSummary, color: bool) -> String {
    let passed = paint(&summary.passed.to_string(), color, |s| s.green());
    let failed = if summary.failed > 0 {
        paint(&summary.failed.to_string(), color, |s| s.red())
    } else {
        summary.failed.to_string()
    };
    let skipped = paint(&summary.skipped.to_string(), color, |s| s.yellow());
    format!(
        "{}: {passed} passed, {failed} failed, {skipped} skipped",
        paint("Results", color, |s| s.bold())
    )
}

/// Compact JSON dump of the three payloads, one per line.
#[must_use]
pub fn format_payloads(given: &Value, when: &Value, then: &Value) -> String {
    format!("  given: {given}\n  when: {when}\n  then: {then}")
}
