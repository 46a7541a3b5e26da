//! Adapter contract between the harness and a system under test.

use crate::process;
use crate::types::{EvalRecord, Status, Verdict};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Default limit for one [`CommandAdapter`] invocation.
pub const DEFAULT_ADAPTER_TIMEOUT_MS: u64 = 60_000;

/// Errors an adapter can report instead of a verdict.
///
/// The dispatcher turns every one of these into a fail verdict, so an
/// adapter never has to catch its own failures to keep the batch alive.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("adapter exited with {status}\nstderr: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("invalid verdict output: {source}\nraw_output: {raw_output}")]
    InvalidOutput {
        #[source]
        source: serde_json::Error,
        raw_output: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Bridges one eval category to the system under test.
///
/// Return [`Verdict::skip`] for "not implemented" or unmet preconditions and
/// keep [`Verdict::fail`] for behavior that contradicts the eval.
#[async_trait]
pub trait Adapter: Send + Sync {
    async fn evaluate(&self, eval: &EvalRecord) -> Result<Verdict, AdapterError>;
}

/// Placeholder registered for categories the implementation does not cover yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdapter {
    label: String,
}

impl PendingAdapter {
    #[must_use]
    pub fn new(category: &str) -> Self {
        Self {
            label: category_label(category),
        }
    }
}

#[async_trait]
impl Adapter for PendingAdapter {
    async fn evaluate(&self, _eval: &EvalRecord) -> Result<Verdict, AdapterError> {
        Ok(Verdict::skip(format!(
            "{} eval implementation pending",
            self.label
        )))
    }
}

/// Display label for a category, e.g. `tools` -> `Tool`, `mcp` -> `MCP`.
#[must_use]
pub fn category_label(category: &str) -> String {
    match category {
        "tools" => "Tool".to_string(),
        "hooks" => "Hook".to_string(),
        "mcp" => "MCP".to_string(),
        "llm" => "LLM".to_string(),
        other => {
            let mut chars = other.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        }
    }
}

/// Adapter backed by a plain function, for in-process integrations.
pub struct FnAdapter<F>(pub F);

#[async_trait]
impl<F> Adapter for FnAdapter<F>
where
    F: Fn(&EvalRecord) -> Verdict + Send + Sync,
{
    async fn evaluate(&self, eval: &EvalRecord) -> Result<Verdict, AdapterError> {
        Ok((self.0)(eval))
    }
}

/// Verdict as printed by an external adapter process.
#[derive(Debug, Deserialize)]
struct VerdictLine {
    status: Status,
    #[serde(default)]
    reason: Option<String>,
}

/// Adapter that runs an external program once per eval.
///
/// The eval is written to the child's stdin as one JSON line; the child
/// answers with `{"status": "pass"|"fail"|"skip", "reason": "..."}` as the
/// last non-blank line of its stdout. The child inherits the environment,
/// so credentials reach it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAdapter {
    program: String,
    args: Vec<String>,
    timeout_ms: u64,
}

impl CommandAdapter {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout_ms: u64) -> Self {
        Self {
            program: program.into(),
            args,
            timeout_ms,
        }
    }

    /// Build from an argv list; `None` when the list is empty.
    #[must_use]
    pub fn from_argv(argv: &[String], timeout_ms: u64) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec(), timeout_ms))
    }

    async fn run(&self, input: Vec<u8>) -> Result<std::process::Output, AdapterError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process::isolate(&mut cmd);

        let mut child = cmd.spawn().map_err(|source| AdapterError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let pid = child.id();
        let stdin = child.stdin.take();
        let program = self.program.as_str();

        // Feed stdin while draining stdout, so a large eval cannot stall on a
        // full pipe. Dropping stdin afterwards signals EOF.
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A child that exits without reading stdin is not an error here;
                // its exit status and output decide the verdict.
                if let Err(e) = stdin.write_all(&input).await {
                    tracing::debug!(program, error = %e, "adapter closed stdin early");
                }
            }
        };
        let exchange = async move {
            let ((), output) = tokio::join!(feed, child.wait_with_output());
            output
        };

        match timeout(Duration::from_millis(self.timeout_ms), exchange).await {
            Ok(output) => Ok(output?),
            Err(_) => {
                process::kill_group(pid);
                Err(AdapterError::Timeout {
                    timeout_ms: self.timeout_ms,
                })
            }
        }
    }
}

#[async_trait]
impl Adapter for CommandAdapter {
    async fn evaluate(&self, eval: &EvalRecord) -> Result<Verdict, AdapterError> {
        let mut input =
            serde_json::to_vec(eval).map_err(|e| AdapterError::Other(e.to_string()))?;
        input.push(b'\n');

        let output = self.run(input).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            return Err(AdapterError::Exit {
                status: output.status.to_string(),
                stderr: truncate_utf8(&String::from_utf8_lossy(&output.stderr), 500),
            });
        }

        parse_verdict_output(&stdout)
    }
}

/// Parse the verdict line an external adapter printed.
///
/// # Errors
/// Returns [`AdapterError::InvalidOutput`] if the last non-blank line is not
/// a verdict object.
pub fn parse_verdict_output(stdout: &str) -> Result<Verdict, AdapterError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or_default();

    let parsed: VerdictLine =
        serde_json::from_str(line).map_err(|source| AdapterError::InvalidOutput {
            source,
            raw_output: truncate_utf8(stdout, 1000),
        })?;
    Ok(Verdict::from_parts(parsed.status, parsed.reason))
}

/// Truncate to at most `max_len` bytes on a char boundary.
#[must_use]
pub fn truncate_utf8(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &s[..end])
}
