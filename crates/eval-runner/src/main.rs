//! eval-runner CLI - Runs the shared conformance corpus against this implementation.

use clap::Parser;
use eval_runner_core::{
    AdapterRegistry, ConfigOverrides, Dispatcher, EvalFilter, EvalRecord, ProgressEvent,
    ReportFormat, Reporter, ReporterConfig, Verdict, apply_overrides, format_report_json,
    load_config, load_evals, run_evals_with_progress,
};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Renders progress events for the human-readable stream.
/// Encapsulates the `enabled` conditional; JSON mode disables it.
struct StreamPrinter {
    reporter: Reporter,
    enabled: bool,
}

impl StreamPrinter {
    const fn new(reporter: Reporter, enabled: bool) -> Self {
        Self { reporter, enabled }
    }

    fn on_run_started(&self, total: usize) {
        if !self.enabled {
            return;
        }
        self.reporter.run_start(total);
    }

    fn on_eval_dispatched(&self, given: &Value, when: &Value, then: &Value) {
        if !self.enabled {
            return;
        }
        self.reporter.eval_payloads(given, when, then);
    }

    fn on_eval_completed(&self, eval: &EvalRecord, verdict: &Verdict) {
        if !self.enabled {
            return;
        }
        self.reporter.eval_result(eval, verdict);
    }
}

/// Exit codes for the CLI.
mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const EVALS_FAILED: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
    pub const LOAD_ERROR: u8 = 3;
}

#[derive(Parser)]
#[command(name = "eval-runner")]
#[command(about = "Conformance eval runner")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Eval file or directory (default: ../../evals, or `evals` in the config)
    #[arg(short, long)]
    evals: Option<PathBuf>,

    /// Only run evals in this category (exact match)
    #[arg(short, long)]
    category: Option<String>,

    /// Only run the eval with this id (exact match)
    #[arg(short, long)]
    id: Option<String>,

    /// Dump given/when/then for each eval before its verdict
    #[arg(short, long)]
    verbose: bool,

    /// Only print failing evals
    #[arg(long)]
    failures_only: bool,

    /// Print a single JSON report instead of the result stream
    #[arg(long)]
    json: bool,

    /// Config file (default: eval-runner.config.yaml in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Implementation tag written into the JSON report
    #[arg(long)]
    runner: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Treat duplicate eval ids as a load error
    #[arg(long)]
    unique_ids: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials may live in .env; a missing file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run_command(&cli).await
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,eval_runner_core={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run_command(cli: &Cli) -> ExitCode {
    let report_format = ReportFormat::from_json_flag(cli.json);
    let mut reporter = Reporter::new(ReporterConfig {
        verbose: cli.verbose,
        failures_only: cli.failures_only,
        color: !cli.no_color,
    });

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            reporter.error(&format!("Cannot determine working directory: {e}"));
            return ExitCode::from(exit_code::CONFIG_ERROR);
        }
    };

    let config = match load_config(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(e) => {
            reporter.error(&format!("Failed to load config: {e}"));
            return ExitCode::from(exit_code::CONFIG_ERROR);
        }
    };

    // Apply CLI overrides
    let overrides = ConfigOverrides {
        evals: cli.evals.clone(),
        runner: cli.runner.clone(),
        color: if cli.no_color { Some(false) } else { None },
        unique_ids: if cli.unique_ids { Some(true) } else { None },
    };
    let config = apply_overrides(config, &overrides);

    if !config.color {
        reporter = Reporter::new(ReporterConfig {
            color: false,
            ..reporter.config().clone()
        });
    }

    let filter = EvalFilter {
        category: cli.category.clone(),
        id: cli.id.clone(),
    };
    let evals = match load_evals(&config.evals, &filter, &config.load_options()) {
        Ok(evals) => evals,
        Err(e) => {
            reporter.error(&format!("Error loading evals: {e}"));
            return ExitCode::from(exit_code::LOAD_ERROR);
        }
    };

    if evals.is_empty() && (filter.category.is_some() || filter.id.is_some()) {
        reporter.warn("No evals match the given filters");
    }

    let registry = AdapterRegistry::from_config(&config.adapters);
    debug!(?registry, evals = evals.len(), "starting run");
    let dispatcher = Dispatcher::new(registry);

    // Set up progress channel for real-time output
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let printer = StreamPrinter::new(reporter.clone(), report_format == ReportFormat::Text);

    let progress_handle = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                ProgressEvent::RunStarted { total } => printer.on_run_started(total),
                ProgressEvent::EvalDispatched {
                    given, when, then, ..
                } => printer.on_eval_dispatched(&given, &when, &then),
                ProgressEvent::EvalCompleted { eval, verdict } => {
                    printer.on_eval_completed(&eval, &verdict);
                }
                ProgressEvent::RunFinished { .. } => {}
            }
        }
    });

    let aggregator = run_evals_with_progress(&evals, &dispatcher, Some(progress_tx)).await;

    // Sender is dropped with the run; wait for the printer to drain
    let _ = progress_handle.await;

    let summary = aggregator.summary();
    match report_format {
        ReportFormat::Json => {
            let report = aggregator.into_report(config.runner.clone());
            match format_report_json(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    reporter.error(&format!("Failed to serialize report: {e}"));
                    return ExitCode::from(exit_code::EVALS_FAILED);
                }
            }
        }
        ReportFormat::Text => reporter.summary(&summary),
    }

    if summary.is_success() {
        ExitCode::from(exit_code::SUCCESS)
    } else {
        ExitCode::from(exit_code::EVALS_FAILED)
    }
}
