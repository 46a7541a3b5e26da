//! Credential gating tests.

use super::{FIXTURE_KEY, TestResult, eval_runner, fixtures_dir};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_missing_key_skips_with_key_name() {
    eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/llm.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SKIP llm-001 - provider_basic_completion\n       EVAL_RUNNER_FIXTURE_KEY not set",
        ));
}

#[test]
fn test_present_key_reaches_adapter() {
    eval_runner()
        .env(FIXTURE_KEY, "1")
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/llm.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM eval implementation pending"))
        .stdout(predicate::str::contains("not set").not());
}

#[test]
fn test_key_loaded_from_dotenv() -> TestResult {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join(".env"), format!("{FIXTURE_KEY}=from-dotenv\n"))?;

    eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("corpus/llm.jsonl"))
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM eval implementation pending"));
    Ok(())
}
