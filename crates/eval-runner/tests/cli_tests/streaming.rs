//! Human-readable stream tests.

use super::{TestResult, adapter_yaml, eval_runner, fixtures_dir, write_config};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_stream_pending_adapters_skip_everything() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SKIP tool-001 - tool_registry_lookup\n       Tool eval implementation pending",
        ))
        .stdout(predicate::str::contains(
            "SKIP hook-001 - pre_tool_hook_blocks\n       Hook eval implementation pending",
        ))
        .stdout(predicate::str::contains(
            "Results: 0 passed, 0 failed, 4 skipped",
        ))
        .stderr(predicate::str::contains("Running 4 evals"));
}

#[test]
fn test_stream_preserves_file_and_line_order() -> TestResult {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            "(?s)hook-001.*llm-001.*tool-001.*tool-002",
        )?);
    Ok(())
}

#[test]
fn test_stream_ignores_files_without_suffix() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .assert()
        .success()
        .stdout(predicate::str::contains("README").not());
}

#[test]
fn test_stream_category_filter() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .args(["--category", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tool-001"))
        .stdout(predicate::str::contains("tool-002"))
        .stdout(predicate::str::contains("hook-001").not())
        .stdout(predicate::str::contains(
            "Results: 0 passed, 0 failed, 2 skipped",
        ));
}

#[test]
fn test_stream_id_filter() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .args(["--id", "tool-002"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tool-002"))
        .stdout(predicate::str::contains("tool-001").not())
        .stdout(predicate::str::contains(
            "Results: 0 passed, 0 failed, 1 skipped",
        ));
}

#[test]
fn test_stream_filter_without_match_runs_nothing() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .args(["--category", "tools", "--id", "hook-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Results: 0 passed, 0 failed, 0 skipped",
        ))
        .stderr(predicate::str::contains("No evals match"));
}

#[test]
#[cfg(unix)]
fn test_stream_failures_only_shows_fail_lines() -> TestResult {
    let dir = TempDir::new()?;
    let config = format!(
        "adapters:\n{}",
        adapter_yaml("tools", r#"{"status":"fail","reason":"expected found=true"}"#)
    );
    write_config(dir.path(), &config)?;

    eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .arg("--failures-only")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "FAIL tool-001 - tool_registry_lookup\n       expected found=true",
        ))
        .stdout(predicate::str::contains("FAIL tool-002"))
        .stdout(predicate::str::contains("SKIP").not())
        .stdout(predicate::str::contains(
            "Results: 0 passed, 2 failed, 2 skipped",
        ));
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_stream_pass_lines_have_no_reason() -> TestResult {
    let dir = TempDir::new()?;
    let config = format!("adapters:\n{}", adapter_yaml("hooks", r#"{"status":"pass"}"#));
    write_config(dir.path(), &config)?;

    eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/hooks.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "PASS hook-001 - pre_tool_hook_blocks\n\nResults: 1 passed, 0 failed, 0 skipped",
        ));
    Ok(())
}

#[test]
fn test_stream_verbose_dumps_payloads() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/hooks.jsonl"))
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "  given: {\"hooks\":[\"deny_all\"]}\n  when: {\"call\":\"add\"}\n  then: {\"blocked\":true}",
        ));
}

#[test]
fn test_stream_verbose_skips_dump_for_missing_credential() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/llm.jsonl"))
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("given:").not());
}
