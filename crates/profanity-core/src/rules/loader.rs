//! Rules file loading and DTO → domain conversion.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::dto::RuleDto;
use super::model::{Check, Rule};
use crate::filter::GlobFilter;

/// Default name of the per-directory rules file.
pub const DEFAULT_RULES_FILE: &str = "PROFANITY";

/// Errors from reading or parsing a rules file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The rules file exists but could not be read.
    #[error("failed to read rules file {path}: {source}")]
    Io {
        /// Path of the rules file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The rules file is not a valid sequence of rule records.
    #[error("malformed rules file {path}: {source}")]
    Parse {
        /// Path of the rules file.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}

impl LoadError {
    /// Path of the offending rules file.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// A source of per-directory rule declarations.
pub trait RuleSource {
    /// Loads the rules declared directly in `dir`.
    ///
    /// Returns `Ok(None)` when `dir` has no rules file; that is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a rules file exists but cannot be read or parsed.
    fn load(&self, dir: &Path) -> Result<Option<Vec<Rule>>, LoadError>;
}

/// Loads rules files named `file_name` from the filesystem.
#[derive(Debug, Clone)]
pub struct FsRuleSource {
    file_name: String,
}

impl FsRuleSource {
    /// Creates a source looking for `file_name` in each directory.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Path of the rules file for `dir`, whether or not it exists.
    #[must_use]
    pub fn rules_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.file_name)
    }
}

impl Default for FsRuleSource {
    fn default() -> Self {
        Self::new(DEFAULT_RULES_FILE)
    }
}

impl RuleSource for FsRuleSource {
    fn load(&self, dir: &Path) -> Result<Option<Vec<Rule>>, LoadError> {
        let path = self.rules_path(dir);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let rules = parse_rules(&content, &path)?;
        debug!("Loaded {} rule(s) from {}", rules.len(), path.display());
        Ok(Some(rules))
    }
}

/// Parses rules file content, stamping each rule with `origin`.
///
/// Blank content yields no rules.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] if the content is not a YAML sequence of
/// rule records.
pub fn parse_rules(content: &str, origin: &Path) -> Result<Vec<Rule>, LoadError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let dtos: Option<Vec<RuleDto>> =
        serde_yaml::from_str(content).map_err(|source| LoadError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

    Ok(dtos
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, dto)| convert_rule(dto, origin, index))
        .collect())
}

fn convert_rule(dto: RuleDto, origin: &Path, index: usize) -> Rule {
    if dto.populated_checks() > 1 {
        warn!(
            "{}[{index}]: more than one of contains/notContains/regex set, using the first in that order",
            origin.display()
        );
    }

    let check = non_empty(dto.contains)
        .map(Check::Contains)
        .or_else(|| non_empty(dto.not_contains).map(Check::NotContains))
        .or_else(|| non_empty(dto.regex).map(Check::Regex));

    let mut rule = match check {
        Some(check) => Rule::new(check),
        None => Rule::unset(),
    }
    .with_origin(origin);

    if let Some(message) = non_empty(dto.message) {
        rule = rule.with_message(message);
    }
    if let Some(include) = dto.include.and_then(GlobFilter::non_empty) {
        rule = rule.with_include(include);
    }
    if let Some(exclude) = dto.exclude.and_then(GlobFilter::non_empty) {
        rule = rule.with_exclude(exclude);
    }
    rule
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
