//! Config file tests.

use super::{TestResult, eval_runner, fixtures_dir, write_config};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_config_supplies_evals_path() -> TestResult {
    let dir = TempDir::new()?;
    let corpus = fixtures_dir().join("corpus/hooks.jsonl");
    write_config(dir.path(), &format!("evals: '{}'\n", corpus.display()))?;

    eval_runner()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIP hook-001"));
    Ok(())
}

#[test]
fn test_cli_evals_overrides_config() -> TestResult {
    let dir = TempDir::new()?;
    let corpus = fixtures_dir().join("corpus/hooks.jsonl");
    write_config(dir.path(), &format!("evals: '{}'\n", corpus.display()))?;

    eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("bogus.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("bogus-001"))
        .stdout(predicate::str::contains("hook-001").not());
    Ok(())
}

#[test]
fn test_explicit_config_must_exist() -> TestResult {
    let dir = TempDir::new()?;
    eval_runner()
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .arg("--evals")
        .arg(fixtures_dir().join("bogus.jsonl"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
    Ok(())
}

#[test]
fn test_unknown_config_key_rejected() -> TestResult {
    let dir = TempDir::new()?;
    write_config(dir.path(), "evalz: ./typo\n")?;

    eval_runner()
        .current_dir(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown field"));
    Ok(())
}

#[test]
fn test_config_suffix_selects_files() -> TestResult {
    let dir = TempDir::new()?;
    let corpus = dir.path().join("corpus");
    std::fs::create_dir(&corpus)?;
    std::fs::copy(
        fixtures_dir().join("bogus.jsonl"),
        corpus.join("bogus.evals"),
    )?;
    std::fs::copy(
        fixtures_dir().join("corpus/hooks.jsonl"),
        corpus.join("hooks.jsonl"),
    )?;
    write_config(dir.path(), "evals: corpus\nsuffix: .evals\n")?;

    eval_runner()
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("bogus-001"))
        .stdout(predicate::str::contains("hook-001").not());
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_config_adapter_timeout() -> TestResult {
    let dir = TempDir::new()?;
    write_config(
        dir.path(),
        "adapters:\n  hooks:\n    command: [sh, -c, 'sleep 5']\n    timeout-ms: 200\n",
    )?;

    eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/hooks.jsonl"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "FAIL hook-001 - pre_tool_hook_blocks\n       adapter error: timeout after 200ms",
        ));
    Ok(())
}
