//! Core library for the eval-runner conformance harness.
//!
//! This crate provides the harness side of cross-implementation evals:
//! - Corpus loading from JSONL files
//! - Category routing to registered adapters, with credential gating
//! - External command adapters and pending placeholders
//! - Verdict aggregation, streaming output and the JSON report
//! - Side-by-side comparison of reports from several implementations

pub mod adapter;
pub mod compare;
pub mod config;
pub mod dispatch;
pub mod loader;
mod process;
pub mod registry;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod types;

pub use adapter::{
    Adapter, AdapterError, CommandAdapter, DEFAULT_ADAPTER_TIMEOUT_MS, FnAdapter, PendingAdapter,
};
pub use compare::{
    CompareError, Comparison, NamedSource, ReportSource, RunnerReport, collect_report,
    parse_sources, render_html, summary_line,
};
pub use config::{
    AdapterConfig, CONFIG_FILE_NAME, ConfigError, ConfigOverrides, HarnessConfig, apply_overrides,
    load_config,
};
pub use dispatch::{CredentialSource, Dispatcher, ProcessEnv};
pub use loader::{EvalFilter, LoadOptions, LoaderError, load_evals};
pub use registry::AdapterRegistry;
pub use report::{Aggregator, ReportFormat, format_report_json};
pub use reporter::{Reporter, ReporterConfig};
pub use runner::{ProgressEvent, ProgressSender, run_evals, run_evals_with_progress};
pub use types::{
    EvalRecord, EvalResult, KNOWN_CATEGORIES, RunReport, RunSummary, Status, Verdict,
};
