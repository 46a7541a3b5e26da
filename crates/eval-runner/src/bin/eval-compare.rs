//! eval-compare CLI - Runs several implementations over the same corpus and
//! compares their reports side by side.

use clap::Parser;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use eval_runner_core::compare::{
    Comparison, DEFAULT_RUNNER_TIMEOUT_SECS, RunnerReport, collect_report, generated_timestamp,
    parse_sources, render_html, summary_line,
};
use eval_runner_core::types::Status;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for the CLI.
mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const RUNNERS_FAILED: u8 = 1;
    pub const USAGE_ERROR: u8 = 2;
}

#[derive(Parser)]
#[command(name = "eval-compare")]
#[command(about = "Compare conformance reports across implementations")]
#[command(version)]
struct Cli {
    /// Runner to execute, as NAME=COMMAND; stdout must be a JSON report
    #[arg(long = "runner", value_name = "NAME=COMMAND")]
    runners: Vec<String>,

    /// Existing JSON report, as NAME=PATH
    #[arg(long = "report", value_name = "NAME=PATH")]
    reports: Vec<String>,

    /// Working directory for runner commands (default: current directory)
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Per-runner timeout in seconds
    #[arg(long, default_value_t = DEFAULT_RUNNER_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Also write the comparison as an HTML page
    #[arg(long)]
    html: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if cli.no_color {
        colored::control::set_override(false);
    }
    run_command(&cli).await
}

fn error(message: &str) {
    eprintln!("{}: {message}", "error".red());
}

async fn run_command(cli: &Cli) -> ExitCode {
    let cwd = match cli.cwd.clone().map_or_else(std::env::current_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            error(&format!("Cannot determine working directory: {e}"));
            return ExitCode::from(exit_code::USAGE_ERROR);
        }
    };

    let sources = match parse_sources(&cli.runners, &cli.reports, &cwd) {
        Ok(sources) => sources,
        Err(e) => {
            error(&e.to_string());
            return ExitCode::from(exit_code::USAGE_ERROR);
        }
    };

    // Runners may share a system under test, so run them one at a time.
    let limit = Duration::from_secs(cli.timeout_secs);
    let mut reports = Vec::with_capacity(sources.len());
    for source in &sources {
        eprintln!("{} {}...", "Running".bold().cyan(), source.name);
        reports.push(collect_report(source, limit).await);
    }

    let comparison = Comparison::build(&reports);
    print_comparison_table(&comparison, cli.no_color);
    print_summaries(&reports);

    for row in comparison.divergent() {
        println!("{}", comparison.format_divergence(row));
    }

    if let Some(ref path) = cli.html {
        let html = render_html(&comparison, &reports, &generated_timestamp());
        match std::fs::write(path, html) {
            Ok(()) => eprintln!("HTML report: {}", path.display()),
            Err(e) => {
                error(&format!("Failed to write {}: {e}", path.display()));
                return ExitCode::from(exit_code::RUNNERS_FAILED);
            }
        }
    }

    if reports.iter().all(RunnerReport::is_clean) {
        ExitCode::from(exit_code::SUCCESS)
    } else {
        ExitCode::from(exit_code::RUNNERS_FAILED)
    }
}

fn status_cell(status: Status, no_color: bool) -> Cell {
    let cell = Cell::new(status.as_str());
    if no_color {
        return cell;
    }
    match status {
        Status::Pass => cell.fg(Color::Green),
        Status::Fail => cell.fg(Color::Red),
        Status::Skip => cell.fg(Color::Yellow),
    }
}

fn print_comparison_table(comparison: &Comparison, no_color: bool) {
    let mut table = Table::new();
    if no_color {
        table.force_no_tty();
    }
    let mut header = vec![Cell::new("Eval ID"), Cell::new("Name")];
    header.extend(comparison.runners.iter().map(Cell::new));
    table.set_header(header);

    let mut current_category: Option<&str> = None;
    for row in &comparison.rows {
        if current_category != Some(row.category.as_str()) {
            current_category = Some(row.category.as_str());
            let mut category_row = vec![Cell::new(format!("[{}]", row.category))];
            category_row.extend((0..=comparison.runners.len()).map(|_| Cell::new("")));
            table.add_row(category_row);
        }

        let mut cells = vec![Cell::new(&row.id), Cell::new(&row.name)];
        cells.extend(row.cells.iter().map(|cell| {
            cell.as_ref()
                .map_or_else(|| Cell::new("—"), |c| status_cell(c.status, no_color))
        }));
        table.add_row(cells);
    }

    println!("{table}");
}

fn print_summaries(reports: &[RunnerReport]) {
    println!("\n{}", "Summary".bold());
    for report in reports {
        let line = summary_line(report);
        if report.error.is_some() {
            println!("  {}", line.red());
        } else {
            println!("  {line}");
        }
    }
    println!();
}
