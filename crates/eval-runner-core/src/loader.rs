//! JSONL corpus loader.

use crate::types::EvalRecord;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Suffix identifying corpus files inside a directory.
pub const DEFAULT_SUFFIX: &str = ".jsonl";

/// Errors that can occur during loading. All of them abort the whole load.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("cannot access path {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse line {line} in {path}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate eval id '{id}': first defined at {first}, redefined at {second}")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },
}

/// Exact-match filters applied after parsing. Both are conjunctive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalFilter {
    pub category: Option<String>,
    pub id: Option<String>,
}

impl EvalFilter {
    #[must_use]
    pub fn matches(&self, eval: &EvalRecord) -> bool {
        self.category.as_ref().is_none_or(|c| eval.category == *c)
            && self.id.as_ref().is_none_or(|id| eval.id == *id)
    }
}

/// Options controlling corpus discovery and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File name suffix used when the corpus path is a directory.
    pub suffix: String,
    /// Treat a repeated id as a fatal error instead of a warning.
    pub unique_ids: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            unique_ids: false,
        }
    }
}

/// An eval together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedEval {
    pub path: PathBuf,
    /// 1-based line number.
    pub line: usize,
    pub eval: EvalRecord,
}

impl LocatedEval {
    fn location(&self) -> String {
        format!("{}:{}", self.path.display(), self.line)
    }
}

/// List the corpus files for `path`.
///
/// A file is returned as-is regardless of its extension. For a directory,
/// the direct entries whose name ends in `suffix` are returned, sorted by
/// file name so the load order is reproducible.
///
/// # Errors
/// Returns [`LoaderError::Access`] if the path does not exist or the
/// directory cannot be listed.
pub fn discover_eval_files(path: &Path, suffix: &str) -> Result<Vec<PathBuf>, LoaderError> {
    let metadata = std::fs::metadata(path).map_err(|source| LoaderError::Access {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = std::fs::read_dir(path).map_err(|source| LoaderError::Access {
        path: path.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoaderError::Access {
            path: path.to_path_buf(),
            source,
        })?;
        let entry_path = entry.path();
        let name_matches = entry.file_name().to_string_lossy().ends_with(suffix);
        if name_matches && entry_path.is_file() {
            files.push(entry_path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Parse one corpus file. Blank lines are skipped; any other line that is
/// not a valid record fails the whole file.
///
/// # Errors
/// Returns [`LoaderError::Io`] if the file cannot be read and
/// [`LoaderError::Parse`] with the 1-based line number on malformed input.
pub fn parse_eval_file(path: &Path) -> Result<Vec<LocatedEval>, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut evals = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let eval: EvalRecord = serde_json::from_str(line).map_err(|source| LoaderError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        evals.push(LocatedEval {
            path: path.to_path_buf(),
            line: index + 1,
            eval,
        });
    }

    debug!(path = %path.display(), count = evals.len(), "parsed corpus file");
    Ok(evals)
}

/// Load the corpus at `path` and apply `filter`.
///
/// Input order is preserved within a file and across files. Every line is
/// parsed before filtering, so a malformed record fails the load even when
/// the filter would have dropped it.
///
/// # Errors
/// Returns an error if the path is inaccessible, a file cannot be read, a
/// line does not parse, or (with `unique_ids`) an id repeats.
pub fn load_evals(
    path: &Path,
    filter: &EvalFilter,
    options: &LoadOptions,
) -> Result<Vec<EvalRecord>, LoaderError> {
    let mut located = Vec::new();
    for file in discover_eval_files(path, &options.suffix)? {
        located.extend(parse_eval_file(&file)?);
    }

    check_duplicate_ids(&located, options.unique_ids)?;

    let evals: Vec<EvalRecord> = located
        .into_iter()
        .map(|l| l.eval)
        .filter(|eval| filter.matches(eval))
        .collect();

    debug!(path = %path.display(), count = evals.len(), "loaded evals");
    Ok(evals)
}

fn check_duplicate_ids(located: &[LocatedEval], strict: bool) -> Result<(), LoaderError> {
    let mut seen: HashMap<&str, &LocatedEval> = HashMap::new();
    for current in located {
        let first = match seen.entry(current.eval.id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(current);
                continue;
            }
            Entry::Occupied(slot) => *slot.get(),
        };
        if strict {
            return Err(LoaderError::DuplicateId {
                id: current.eval.id.clone(),
                first: first.location(),
                second: current.location(),
            });
        }
        warn!(
            id = %current.eval.id,
            first = %first.location(),
            second = %current.location(),
            "duplicate eval id"
        );
    }
    Ok(())
}
