//! Core types for rule violations and scan results.

use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::rules::Rule;

/// Reason reported for a rule with no check set.
pub const NO_RULE_SET: &str = "no rule set";

/// A rule violated by a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// File that violated the rule, relative to the scan root.
    pub file: PathBuf,
    /// The failed condition (e.g. `contains: "TODO"`).
    pub reason: String,
    /// The rule's message, if it declared one.
    pub message: Option<String>,
    /// Rules file the violated rule came from.
    pub rules_file: PathBuf,
    /// The rule's include filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    /// The rule's exclude filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

impl Violation {
    /// Creates a violation of `rule` by `file`.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, rule: &Rule) -> Self {
        let reason = rule
            .check()
            .map_or_else(|| NO_RULE_SET.to_string(), ToString::to_string);
        Self {
            file: file.into(),
            reason,
            message: rule.message().map(str::to_string),
            rules_file: rule.origin().to_path_buf(),
            include: rule.include().map(ToString::to_string),
            exclude: rule.exclude().map(ToString::to_string),
        }
    }

    /// Rewrites `rules_file` relative to `root` when it lies under it.
    #[must_use]
    pub fn relative_to(mut self, root: &Path) -> Self {
        if let Ok(relative) = self.rules_file.strip_prefix(root) {
            self.rules_file = relative.to_path_buf();
        }
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.reason)?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        write!(f, " [{}]", self.rules_file.display())?;
        if let Some(include) = &self.include {
            write!(f, " include=[{include}]")?;
        }
        if let Some(exclude) = &self.exclude {
            write!(f, " exclude=[{exclude}]")?;
        }
        Ok(())
    }
}

/// A violation rendered as a miette diagnostic.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{file} failed: {reason}")]
#[diagnostic(code(profanity::violation))]
pub struct ViolationDiagnostic {
    file: String,
    reason: String,
    #[help]
    help: Option<String>,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        let mut help = Vec::new();
        if let Some(message) = &v.message {
            help.push(message.clone());
        }
        help.push(format!("rules file: {}", v.rules_file.display()));
        if let Some(include) = &v.include {
            help.push(format!("include: {include}"));
        }
        if let Some(exclude) = &v.exclude {
            help.push(format!("exclude: {exclude}"));
        }
        Self {
            file: v.file.display().to_string(),
            reason: v.reason.clone(),
            help: Some(help.join("\n")),
        }
    }
}

/// Result of a scan.
#[derive(Debug, Default, Serialize)]
pub struct ScanResult {
    /// Violations found, in traversal order.
    pub violations: Vec<Violation>,
    /// Number of files evaluated against their rules.
    pub files_checked: usize,
    /// Number of files skipped by global filters or as rules files.
    pub files_skipped: usize,
}

impl ScanResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no violation was found.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// The first violation in traversal order.
    #[must_use]
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// One-line summary of the scan.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Found {} violation(s) in {} file(s) checked, {} skipped",
            self.violations.len(),
            self.files_checked,
            self.files_skipped
        )
    }
}
