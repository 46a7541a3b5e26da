//! eval-compare tests.

use super::{TestResult, eval_compare, fixtures_dir};
use predicates::prelude::*;
use tempfile::TempDir;

fn report_arg(name: &str, file: &str) -> String {
    format!(
        "{name}={}",
        fixtures_dir().join("reports").join(file).display()
    )
}

#[test]
fn test_compare_reports_side_by_side() {
    eval_compare()
        .arg("--report")
        .arg(report_arg("rust", "rust.json"))
        .arg("--report")
        .arg(report_arg("go", "go.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Eval ID"))
        .stdout(predicate::str::contains("[hooks]"))
        .stdout(predicate::str::contains("—"))
        .stdout(predicate::str::contains("rust: 2 passed, 0 failed, 1 skipped"))
        .stdout(predicate::str::contains("go: 1 passed, 0 failed, 1 skipped"))
        .stdout(predicate::str::contains(
            "divergent: tool-001 (rust=pass, go=skip)",
        ))
        .stdout(predicate::str::contains("divergent: llm-001 (rust=skip, go=—)"))
        .stdout(predicate::str::contains("divergent: hook-001").not());
}

#[test]
fn test_compare_rows_sorted_by_category() -> TestResult {
    eval_compare()
        .arg("--report")
        .arg(report_arg("rust", "rust.json"))
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"(?s)\[hooks\].*hook-001.*\[llm\].*llm-001.*\[tools\].*tool-001",
        )?);
    Ok(())
}

#[test]
fn test_compare_failures_set_exit_code() {
    eval_compare()
        .arg("--report")
        .arg(report_arg("rust", "rust.json"))
        .arg("--report")
        .arg(report_arg("go", "go-failing.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("go: 1 passed, 1 failed, 0 skipped"));
}

#[test]
fn test_compare_unreadable_report_is_recorded() {
    eval_compare()
        .arg("--report")
        .arg(report_arg("rust", "rust.json"))
        .arg("--report")
        .arg(report_arg("go", "missing.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("go: ERROR - cannot read"))
        .stdout(predicate::str::contains("rust: 2 passed"));
}

#[test]
#[cfg(unix)]
fn test_compare_runs_commands_in_cwd() {
    eval_compare()
        .arg("--cwd")
        .arg(fixtures_dir().join("reports"))
        .args(["--runner", "rust=cat rust.json", "--runner", "go=echo not-json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rust: 2 passed, 0 failed, 1 skipped"))
        .stdout(predicate::str::contains("go: ERROR - Invalid JSON output"));
}

#[test]
#[cfg(unix)]
fn test_compare_missing_runner_binary() {
    eval_compare()
        .args(["--runner", "ghost=definitely-not-a-runner-binary-xyz --json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ghost: ERROR - Runner not found"));
}

#[test]
#[cfg(unix)]
fn test_compare_drives_eval_runner() {
    let runner = format!(
        "rust='{}' --json --evals '{}'",
        env!("CARGO_BIN_EXE_eval-runner"),
        fixtures_dir().join("corpus").display()
    );
    eval_compare()
        .args(["--runner", &runner])
        .assert()
        .success()
        .stdout(predicate::str::contains("rust: 0 passed, 0 failed, 4 skipped"));
}

#[test]
fn test_compare_writes_html() -> TestResult {
    let dir = TempDir::new()?;
    let html_path = dir.path().join("compare.html");

    eval_compare()
        .arg("--report")
        .arg(report_arg("rust", "rust.json"))
        .arg("--report")
        .arg(report_arg("go", "go-failing.json"))
        .arg("--html")
        .arg(&html_path)
        .assert()
        .code(1);

    let html = std::fs::read_to_string(&html_path)?;
    assert!(html.contains("Generated: "));
    assert!(html.contains("title=\"expected &lt;found&gt; to be true\""));
    assert!(html.contains("go: 1 passed, 1 failed, 0 skipped"));
    Ok(())
}

#[test]
fn test_compare_rejects_bad_arguments() {
    eval_compare()
        .args(["--report", "no-equals-sign"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected NAME=VALUE"));

    eval_compare()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nothing to compare"));
}
