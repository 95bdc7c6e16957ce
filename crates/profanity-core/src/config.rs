//! Configuration types for profanity.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rules::DEFAULT_RULES_FILE;

/// Top-level configuration for profanity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scan configuration.
    #[serde(default)]
    pub scan: ScanConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// What the scan does after the first violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailPolicy {
    /// Stop the whole scan at the first violation.
    #[default]
    FailFast,
    /// Visit every file; each file reports at most its first violation.
    CollectAll,
}

/// Scan-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Root directory to scan (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Name of the per-directory rules file.
    #[serde(default = "default_rules_file")]
    pub rules_file: String,

    /// Glob patterns a file must match to be scanned (empty: all files).
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns of files never scanned.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directory names never descended into.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Failure policy.
    #[serde(default)]
    pub policy: FailPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            rules_file: default_rules_file(),
            include: Vec::new(),
            exclude: Vec::new(),
            skip_dirs: default_skip_dirs(),
            policy: FailPolicy::default(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_rules_file() -> String {
    DEFAULT_RULES_FILE.to_string()
}

fn default_skip_dirs() -> Vec<String> {
    vec![".git".to_string(), "_bin".to_string()]
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
