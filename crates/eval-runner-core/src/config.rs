//! Configuration loader for eval-runner.

use crate::adapter::DEFAULT_ADAPTER_TIMEOUT_MS;
use crate::loader::{DEFAULT_SUFFIX, LoadOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "eval-runner.config.yaml";

/// Corpus location used when neither the config nor the CLI name one.
pub const DEFAULT_EVALS_PATH: &str = "../../evals";

/// Implementation tag written into the structured report.
pub const DEFAULT_RUNNER_TAG: &str = "rust";

/// Errors that can occur during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("adapter for category '{0}' has an empty command")]
    EmptyAdapterCommand(String),
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
}

/// External adapter process for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AdapterConfig {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    #[serde(default = "default_adapter_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_adapter_timeout_ms() -> u64 {
    DEFAULT_ADAPTER_TIMEOUT_MS
}

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct HarnessConfig {
    pub evals: PathBuf,
    pub suffix: String,
    pub runner: String,
    pub color: bool,
    pub unique_ids: bool,
    pub adapters: BTreeMap<String, AdapterConfig>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            evals: PathBuf::from(DEFAULT_EVALS_PATH),
            suffix: DEFAULT_SUFFIX.to_string(),
            runner: DEFAULT_RUNNER_TAG.to_string(),
            color: true,
            unique_ids: false,
            adapters: BTreeMap::new(),
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            suffix: self.suffix.clone(),
            unique_ids: self.unique_ids,
        }
    }
}

/// Load the harness configuration.
///
/// With `path`, that file must exist. Without it, [`CONFIG_FILE_NAME`] in
/// `dir` is used when present and defaults otherwise.
///
/// # Errors
/// Returns an error if an explicit file is missing, a file cannot be read or
/// parsed, or validation fails.
pub fn load_config(path: Option<&Path>, dir: &Path) -> Result<HarnessConfig, ConfigError> {
    let config_path = match path {
        Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
        Some(p) => p.to_path_buf(),
        None => {
            let default_path = dir.join(CONFIG_FILE_NAME);
            if !default_path.exists() {
                return Ok(HarnessConfig::default());
            }
            default_path
        }
    };

    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    let config: HarnessConfig =
        serde_yml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: config_path.clone(),
            source,
        })?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    if config.suffix.is_empty() {
        return Err(ConfigError::EmptyField("suffix"));
    }
    if config.runner.is_empty() {
        return Err(ConfigError::EmptyField("runner"));
    }
    if let Some((category, _)) = config.adapters.iter().find(|(_, a)| a.command.is_empty()) {
        return Err(ConfigError::EmptyAdapterCommand(category.clone()));
    }
    Ok(())
}

/// CLI override options for configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub evals: Option<PathBuf>,
    pub runner: Option<String>,
    pub color: Option<bool>,
    pub unique_ids: Option<bool>,
}

/// Apply CLI overrides to a configuration.
#[must_use]
pub fn apply_overrides(mut config: HarnessConfig, overrides: &ConfigOverrides) -> HarnessConfig {
    if let Some(ref evals) = overrides.evals {
        config.evals.clone_from(evals);
    }
    if let Some(ref runner) = overrides.runner {
        config.runner.clone_from(runner);
    }
    if let Some(color) = overrides.color {
        config.color = color;
    }
    if let Some(unique_ids) = overrides.unique_ids {
        config.unique_ids = unique_ids;
    }
    config
}
