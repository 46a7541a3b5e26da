//! Structured report tests.

use super::{TestResult, adapter_yaml, eval_runner, fixtures_dir, write_config};
use serde_json::Value;
use tempfile::TempDir;

fn parse_report(stdout: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(stdout)
}

#[test]
#[cfg(unix)]
fn test_json_three_record_report() -> TestResult {
    let dir = TempDir::new()?;
    let config = format!("adapters:\n{}", adapter_yaml("tools", r#"{"status":"pass"}"#));
    write_config(dir.path(), &config)?;

    let output = eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("three.jsonl"))
        .arg("--json")
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let report = parse_report(&output.stdout)?;
    assert_eq!(report["runner"], "rust");
    assert_eq!(
        report["summary"],
        serde_json::json!({"passed": 2, "failed": 0, "skipped": 1, "total": 3})
    );

    let results = report["results"].as_array().ok_or("results is not an array")?;
    let ids: Vec<&str> = results.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["tool-001", "llm-001", "tool-002"]);
    assert_eq!(results[0]["status"], "pass");
    assert!(results[0].get("reason").is_none());
    assert_eq!(results[1]["status"], "skip");
    assert_eq!(results[1]["reason"], "EVAL_RUNNER_FIXTURE_KEY not set");
    assert_eq!(results[1]["category"], "llm");
    Ok(())
}

#[test]
fn test_json_suppresses_stream_output() -> TestResult {
    let output = eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("corpus"))
        .args(["--json", "--verbose"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout)?;
    assert!(!stdout.contains("SKIP "));
    assert!(!stdout.contains("given:"));
    assert!(!stdout.contains("Results:"));
    let report: Value = serde_json::from_str(&stdout)?;
    assert_eq!(report["summary"]["total"], 4);
    Ok(())
}

#[test]
fn test_json_runner_tag_override() -> TestResult {
    let output = eval_runner()
        .arg("--evals")
        .arg(fixtures_dir().join("bogus.jsonl"))
        .args(["--json", "--runner", "go"])
        .output()?;
    let report = parse_report(&output.stdout)?;
    assert_eq!(report["runner"], "go");
    assert_eq!(report["results"][0]["reason"], "Unknown category: bogus");
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_json_failure_sets_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let config = format!(
        "adapters:\n{}",
        adapter_yaml("tools", r#"{"status":"fail","reason":"mismatch"}"#)
    );
    write_config(dir.path(), &config)?;

    let output = eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("three.jsonl"))
        .arg("--json")
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report = parse_report(&output.stdout)?;
    assert_eq!(report["summary"]["failed"], 2);
    assert_eq!(report["results"][2]["reason"], "mismatch");
    Ok(())
}

#[test]
#[cfg(unix)]
fn test_json_adapter_crash_is_contained() -> TestResult {
    let dir = TempDir::new()?;
    let config = "adapters:\n  tools:\n    command: [sh, -c, 'cat >/dev/null; echo boom >&2; exit 7']\n";
    write_config(dir.path(), config)?;

    let output = eval_runner()
        .current_dir(dir.path())
        .arg("--evals")
        .arg(fixtures_dir().join("three.jsonl"))
        .arg("--json")
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report = parse_report(&output.stdout)?;
    assert_eq!(report["summary"]["total"], 3);
    let reason = report["results"][0]["reason"].as_str().ok_or("missing reason")?;
    assert!(reason.starts_with("adapter error: "), "{reason}");
    assert!(reason.contains("boom"), "{reason}");
    Ok(())
}
