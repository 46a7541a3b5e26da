//! CLI argument tests.

use super::{eval_compare, eval_runner, fixtures_dir};
use predicates::prelude::*;

#[test]
fn test_arg_help() {
    eval_runner()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conformance eval runner"))
        .stdout(predicate::str::contains("--failures-only"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_arg_version() {
    eval_runner()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("eval-runner"));
}

#[test]
fn test_arg_unknown_flag() {
    eval_runner()
        .arg("--bogus-flag")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--bogus-flag"));
}

#[test]
fn test_arg_short_forms() {
    let corpus = fixtures_dir().join("corpus");
    eval_runner()
        .arg("-e")
        .arg(&corpus)
        .args(["-c", "hooks", "-i", "hook-001", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIP hook-001 - pre_tool_hook_blocks"));
}

#[test]
fn test_compare_help() {
    eval_compare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("NAME=COMMAND"))
        .stdout(predicate::str::contains("--timeout-secs"));
}
