//! Core data types for eval-runner.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Categories a conforming implementation is expected to cover.
pub const KNOWN_CATEGORIES: [&str; 7] = [
    "tools",
    "hooks",
    "agent",
    "subagent",
    "transcript",
    "mcp",
    "llm",
];

/// Returns true when `category` is one of [`KNOWN_CATEGORIES`].
#[must_use]
pub fn is_known_category(category: &str) -> bool {
    KNOWN_CATEGORIES.contains(&category)
}

/// One behavioral specification record, parsed from a single corpus line.
///
/// `given`, `when` and `then` are passed through to the adapter untouched;
/// their shape is a contract between the corpus author and the adapter.
/// Fields not listed here are ignored so newer corpora still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// LLM vendor, only meaningful for the `llm` category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Environment variable that must be present for the eval to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_key: Option<String>,
    pub given: Value,
    pub when: Value,
    pub then: Value,
}

/// Terminal outcome of one eval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Skip,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
        }
    }

    /// Label used in the human-readable stream.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason attached to a fail or skip verdict built with an empty explanation.
pub const MISSING_REASON: &str = "no reason given";

/// Outcome of running one [`EvalRecord`].
///
/// Fail and skip verdicts always carry a non-empty reason. Construct them
/// through [`Verdict::fail`] and [`Verdict::skip`] so that holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Verdict {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            status: Status::Pass,
            reason: None,
        }
    }

    #[must_use]
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::with_reason(Status::Fail, reason.into())
    }

    #[must_use]
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::with_reason(Status::Skip, reason.into())
    }

    /// Build a verdict from a status and an optional reason, as read from an
    /// external source. Pass drops the reason; fail and skip get
    /// [`MISSING_REASON`] when none was supplied.
    #[must_use]
    pub fn from_parts(status: Status, reason: Option<String>) -> Self {
        match status {
            Status::Pass => Self::pass(),
            other => Self::with_reason(other, reason.unwrap_or_default()),
        }
    }

    fn with_reason(status: Status, reason: String) -> Self {
        let reason = if reason.trim().is_empty() {
            MISSING_REASON.to_string()
        } else {
            reason
        };
        Self {
            status,
            reason: Some(reason),
        }
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self.status, Status::Fail)
    }
}

/// Running pass/fail/skip counts for one run.
///
/// `total` is derived from the three counters, so it cannot drift from
/// their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SummaryCounts", try_from = "SummaryCounts")]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Fold one verdict into the counts.
    pub const fn record(&mut self, status: Status) {
        match status {
            Status::Pass => self.passed += 1,
            Status::Fail => self.failed += 1,
            Status::Skip => self.skipped += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    /// A run succeeds unless at least one eval failed. Skips never count.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Serialized form of [`RunSummary`], with the derived total spelled out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SummaryCounts {
    passed: usize,
    failed: usize,
    skipped: usize,
    total: usize,
}

impl From<RunSummary> for SummaryCounts {
    fn from(summary: RunSummary) -> Self {
        Self {
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
            total: summary.total(),
        }
    }
}

impl TryFrom<SummaryCounts> for RunSummary {
    type Error = String;

    fn try_from(counts: SummaryCounts) -> Result<Self, Self::Error> {
        let summary = Self {
            passed: counts.passed,
            failed: counts.failed,
            skipped: counts.skipped,
        };
        if summary.total() == counts.total {
            Ok(summary)
        } else {
            Err(format!(
                "summary total {} does not match passed + failed + skipped = {}",
                counts.total,
                summary.total()
            ))
        }
    }
}

/// One entry in the structured report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EvalResult {
    #[must_use]
    pub fn new(eval: &EvalRecord, verdict: &Verdict) -> Self {
        Self {
            id: eval.id.clone(),
            name: eval.name.clone(),
            category: eval.category.clone(),
            status: verdict.status,
            reason: verdict.reason.clone(),
        }
    }
}

/// Structured report emitted by `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Tag identifying the implementation that produced the report.
    pub runner: String,
    pub results: Vec<EvalResult>,
    pub summary: RunSummary,
}
