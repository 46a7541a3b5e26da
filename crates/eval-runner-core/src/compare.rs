//! Side-by-side comparison of reports produced by different implementations.

use crate::adapter::truncate_utf8;
use crate::process;
use crate::types::{EvalResult, RunReport, RunSummary, Status};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::process::Command;
use tokio::time::{Duration, timeout};
use tracing::{debug, warn};

/// Default limit for one runner invocation.
pub const DEFAULT_RUNNER_TIMEOUT_SECS: u64 = 300;

/// Errors in comparison arguments.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("invalid {kind} '{value}': expected NAME=VALUE")]
    InvalidSpec { kind: &'static str, value: String },
    #[error("runner name '{0}' given more than once")]
    DuplicateName(String),
    #[error("nothing to compare: pass at least one --runner or --report")]
    NoSources,
}

/// Where a runner's report comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSource {
    /// Shell command whose stdout is a structured report.
    Command { command: String, cwd: PathBuf },
    /// Report already written to disk.
    File(PathBuf),
}

/// A report source with the name shown in the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSource {
    pub name: String,
    pub source: ReportSource,
}

/// Split a `NAME=VALUE` argument.
///
/// # Errors
/// Returns [`CompareError::InvalidSpec`] if there is no `=` or either side
/// is empty.
pub fn parse_named(kind: &'static str, value: &str) -> Result<(String, String), CompareError> {
    let invalid = || CompareError::InvalidSpec {
        kind,
        value: value.to_string(),
    };
    let (name, rest) = value.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() || rest.trim().is_empty() {
        return Err(invalid());
    }
    Ok((name.to_string(), rest.to_string()))
}

/// Build the source list from `--runner` and `--report` arguments.
///
/// # Errors
/// Returns an error on malformed arguments, repeated names, or when both
/// lists are empty.
pub fn parse_sources(
    runners: &[String],
    reports: &[String],
    cwd: &Path,
) -> Result<Vec<NamedSource>, CompareError> {
    let mut sources = Vec::new();
    for value in runners {
        let (name, command) = parse_named("runner", value)?;
        sources.push(NamedSource {
            name,
            source: ReportSource::Command {
                command,
                cwd: cwd.to_path_buf(),
            },
        });
    }
    for value in reports {
        let (name, path) = parse_named("report", value)?;
        sources.push(NamedSource {
            name,
            source: ReportSource::File(PathBuf::from(path)),
        });
    }

    if sources.is_empty() {
        return Err(CompareError::NoSources);
    }
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = sources.iter().find(|s| !seen.insert(s.name.as_str())) {
        return Err(CompareError::DuplicateName(dup.name.clone()));
    }
    Ok(sources)
}

/// One runner's contribution to a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerReport {
    pub runner: String,
    pub results: Vec<EvalResult>,
    pub summary: RunSummary,
    /// Set when no usable report could be obtained; counts are then zero.
    pub error: Option<String>,
}

impl RunnerReport {
    #[must_use]
    pub fn from_report(name: impl Into<String>, report: RunReport) -> Self {
        Self {
            runner: name.into(),
            results: report.results,
            summary: report.summary,
            error: None,
        }
    }

    #[must_use]
    pub fn errored(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            runner: name.into(),
            results: Vec::new(),
            summary: RunSummary::default(),
            error: Some(error.into()),
        }
    }

    /// Produced a report and that report has no failures.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.error.is_none() && self.summary.failed == 0
    }
}

/// Obtain the report for `source`. Never fails: problems are recorded in
/// [`RunnerReport::error`].
pub async fn collect_report(source: &NamedSource, limit: Duration) -> RunnerReport {
    let result = match &source.source {
        ReportSource::Command { command, cwd } => run_report_command(command, cwd, limit).await,
        ReportSource::File(path) => read_report_file(path),
    };
    match result {
        Ok(report) => RunnerReport::from_report(&source.name, report),
        Err(error) => RunnerReport::errored(&source.name, error),
    }
}

async fn run_report_command(command: &str, cwd: &Path, limit: Duration) -> Result<RunReport, String> {
    debug!(command, cwd = %cwd.display(), "running report command");
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    process::isolate(&mut cmd);

    let child = cmd.spawn().map_err(|e| format!("failed to start sh: {e}"))?;
    let pid = child.id();

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(e.to_string()),
        Err(_) => {
            process::kill_group(pid);
            return Err(format!("Timeout after {limit:?}"));
        }
    };

    // sh reports an unknown command as exit 127.
    if output.status.code() == Some(127) && output.stdout.trim_ascii().is_empty() {
        return Err("Runner not found".to_string());
    }

    // A runner exits non-zero when evals fail; its stdout is still the report.
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).map_err(|e| {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.trim().is_empty() {
            format!("Invalid JSON output: {e}")
        } else {
            format!(
                "Invalid JSON output: {e} (stderr: {})",
                truncate_utf8(stderr.trim(), 300)
            )
        }
    })
}

fn read_report_file(path: &Path) -> Result<RunReport, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid JSON output: {e}"))
}

/// One runner's verdict for one eval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub status: Status,
    pub reason: Option<String>,
}

/// One eval across all runners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Indexed like [`Comparison::runners`]; `None` when the runner has no
    /// result for this eval.
    pub cells: Vec<Option<Cell>>,
}

/// Result matrix: one row per `(id, name, category)`, sorted by category
/// then id, with one column per runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub runners: Vec<String>,
    pub rows: Vec<ComparisonRow>,
    /// Runners that produced a report; errored runners are left out of
    /// divergence checks.
    reporting: Vec<bool>,
}

impl Comparison {
    #[must_use]
    pub fn build(reports: &[RunnerReport]) -> Self {
        let width = reports.len();
        let mut rows: Vec<ComparisonRow> = Vec::new();
        let mut index: HashMap<(String, String, String), usize> = HashMap::new();

        for (column, report) in reports.iter().enumerate() {
            for result in &report.results {
                let key = (result.id.clone(), result.name.clone(), result.category.clone());
                let row = *index.entry(key).or_insert_with(|| {
                    rows.push(ComparisonRow {
                        id: result.id.clone(),
                        name: result.name.clone(),
                        category: result.category.clone(),
                        cells: vec![None; width],
                    });
                    rows.len() - 1
                });
                let cell = &mut rows[row].cells[column];
                if cell.is_some() {
                    warn!(
                        runner = %report.runner,
                        id = %result.id,
                        "duplicate result in report, keeping the first"
                    );
                    continue;
                }
                *cell = Some(Cell {
                    status: result.status,
                    reason: result.reason.clone(),
                });
            }
        }

        rows.sort_by(|a, b| (&a.category, &a.id, &a.name).cmp(&(&b.category, &b.id, &b.name)));

        Self {
            runners: reports.iter().map(|r| r.runner.clone()).collect(),
            rows,
            reporting: reports.iter().map(|r| r.error.is_none()).collect(),
        }
    }

    /// Rows where reporting runners disagree, counting a missing result as
    /// its own outcome.
    #[must_use]
    pub fn divergent(&self) -> Vec<&ComparisonRow> {
        self.rows
            .iter()
            .filter(|row| {
                let mut statuses = row
                    .cells
                    .iter()
                    .zip(&self.reporting)
                    .filter(|(_, reporting)| **reporting)
                    .map(|(cell, _)| cell.as_ref().map(|c| c.status));
                statuses
                    .next()
                    .is_some_and(|first| statuses.any(|s| s != first))
            })
            .collect()
    }

    /// `divergent: <id> (rust=pass, go=skip)`.
    #[must_use]
    pub fn format_divergence(&self, row: &ComparisonRow) -> String {
        let cells: Vec<String> = self
            .runners
            .iter()
            .zip(&row.cells)
            .map(|(runner, cell)| {
                let status = cell.as_ref().map_or("—", |c| c.status.as_str());
                format!("{runner}={status}")
            })
            .collect();
        format!("divergent: {} ({})", row.id, cells.join(", "))
    }
}

/// `rust: 2 passed, 0 failed, 1 skipped`, or `go: ERROR - <message>`.
#[must_use]
pub fn summary_line(report: &RunnerReport) -> String {
    match &report.error {
        Some(error) => format!("{}: ERROR - {error}", report.runner),
        None => format!(
            "{}: {} passed, {} failed, {} skipped",
            report.runner, report.summary.passed, report.summary.failed, report.summary.skipped
        ),
    }
}

/// Status glyph used in the HTML page.
#[must_use]
pub const fn status_symbol(status: Status) -> &'static str {
    match status {
        Status::Pass => "✅",
        Status::Fail => "❌",
        Status::Skip => "⏭️",
    }
}

/// Current UTC time for the "Generated:" line.
#[must_use]
pub fn generated_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Escape text for HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const HTML_STYLE: &str = r"
        :root { --pass: #22c55e; --fail: #ef4444; --skip: #eab308; --bg: #0f172a;
                --bg-alt: #1e293b; --text: #e2e8f0; --border: #334155; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               background: var(--bg); color: var(--text); margin: 0; padding: 20px; }
        .timestamp { color: #64748b; font-size: 0.875rem; margin-bottom: 20px; }
        table { border-collapse: collapse; width: 100%; font-size: 0.875rem; }
        th, td { padding: 8px 12px; text-align: left; border-bottom: 1px solid var(--border); }
        th { background: var(--bg-alt); font-weight: 600; position: sticky; top: 0; }
        tr:hover { background: var(--bg-alt); }
        .category-header { background: var(--bg-alt); font-weight: 600; color: #94a3b8; }
        .status { text-align: center; font-size: 1.25rem; }
        .pass { color: var(--pass); }
        .fail { color: var(--fail); }
        .skip { color: var(--skip); }
        .summary { margin-top: 20px; padding: 15px; background: var(--bg-alt); border-radius: 8px; }
        .legend { display: flex; gap: 20px; margin-bottom: 15px; font-size: 0.875rem; }
";

/// Render the comparison as a standalone HTML page.
#[must_use]
pub fn render_html(comparison: &Comparison, reports: &[RunnerReport], generated_at: &str) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <title>Eval Comparison</title>\n    <style>{HTML_STYLE}    </style>\n</head>\n<body>\n    \
         <h1>Eval Comparison</h1>\n    <div class=\"timestamp\">Generated: {}</div>\n    \
         <div class=\"legend\"><span class=\"pass\">✅ Pass</span><span class=\"fail\">❌ Fail</span>\
         <span class=\"skip\">⏭️ Skip</span></div>\n    <table>\n        <thead>\n            <tr>\
         <th>Eval ID</th><th>Name</th>",
        escape_html(generated_at)
    );
    for runner in &comparison.runners {
        let _ = write!(html, "<th style=\"text-align:center\">{}</th>", escape_html(runner));
    }
    html.push_str("</tr>\n        </thead>\n        <tbody>\n");

    let mut current_category: Option<&str> = None;
    for row in &comparison.rows {
        if current_category != Some(row.category.as_str()) {
            current_category = Some(row.category.as_str());
            let _ = writeln!(
                html,
                "            <tr class=\"category-header\"><td colspan=\"{}\">{}</td></tr>",
                comparison.runners.len() + 2,
                escape_html(&row.category)
            );
        }
        let _ = write!(
            html,
            "            <tr><td>{}</td><td>{}</td>",
            escape_html(&row.id),
            escape_html(&row.name)
        );
        for cell in &row.cells {
            match cell {
                Some(cell) => {
                    let _ = write!(
                        html,
                        "<td class=\"status {}\" title=\"{}\">{}</td>",
                        cell.status.as_str(),
                        escape_html(cell.reason.as_deref().unwrap_or_default()),
                        status_symbol(cell.status)
                    );
                }
                None => html.push_str("<td class=\"status\">—</td>"),
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("        </tbody>\n    </table>\n    <div class=\"summary\">\n        <h2>Summary</h2>\n");
    for report in reports {
        let _ = writeln!(
            html,
            "        <div class=\"summary-item\">{}</div>",
            escape_html(&summary_line(report))
        );
    }
    html.push_str("    </div>\n</body>\n</html>\n");
    html
}
