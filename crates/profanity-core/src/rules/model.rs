//! Domain model for content rules.
//!
//! This module contains no serde and no I/O. A [`Rule`] holds at most one
//! [`Check`]; the "more than one check set" ambiguity of the on-disk format
//! is resolved by the loader before a `Rule` exists.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::filter::GlobFilter;

/// The content check a rule performs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Check {
    /// Violated when the contents contain the literal.
    Contains(String),
    /// Violated when the contents do not contain the literal.
    NotContains(String),
    /// Violated when the pattern matches anywhere in the contents.
    Regex(String),
}

impl Check {
    /// Returns the literal or pattern text.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Contains(v) | Self::NotContains(v) | Self::Regex(v) => v,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(v) => write!(f, "contains: \"{v}\""),
            Self::NotContains(v) => write!(f, "not contains: \"{v}\""),
            Self::Regex(v) => write!(f, "regexp match: \"{v}\""),
        }
    }
}

/// A single declarative content rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    origin: PathBuf,
    message: Option<String>,
    check: Option<Check>,
    include: Option<GlobFilter>,
    exclude: Option<GlobFilter>,
}

impl Rule {
    /// Creates a rule with the given check and no filters.
    #[must_use]
    pub fn new(check: Check) -> Self {
        Self {
            origin: PathBuf::new(),
            message: None,
            check: Some(check),
            include: None,
            exclude: None,
        }
    }

    /// Creates a rule with no check set.
    ///
    /// Evaluating it always reports a `no rule set` violation.
    #[must_use]
    pub fn unset() -> Self {
        Self {
            origin: PathBuf::new(),
            message: None,
            check: None,
            include: None,
            exclude: None,
        }
    }

    /// Sets the rules file this rule was declared in.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Sets the violation message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Restricts the rule to files matching `filter`.
    #[must_use]
    pub fn with_include(mut self, filter: GlobFilter) -> Self {
        self.include = Some(filter);
        self
    }

    /// Exempts files matching `filter` from the rule.
    #[must_use]
    pub fn with_exclude(mut self, filter: GlobFilter) -> Self {
        self.exclude = Some(filter);
        self
    }

    /// Path of the rules file this rule came from.
    #[must_use]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Violation message, if one was declared.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The check, or `None` for an unset rule.
    #[must_use]
    pub fn check(&self) -> Option<&Check> {
        self.check.as_ref()
    }

    /// Include filter, if any.
    #[must_use]
    pub fn include(&self) -> Option<&GlobFilter> {
        self.include.as_ref()
    }

    /// Exclude filter, if any.
    #[must_use]
    pub fn exclude(&self) -> Option<&GlobFilter> {
        self.exclude.as_ref()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.check {
            Some(check) => write!(f, "{check}")?,
            None => write!(f, "<no rule set>")?,
        }
        if let Some(include) = &self.include {
            write!(f, " include=[{include}]")?;
        }
        if let Some(exclude) = &self.exclude {
            write!(f, " exclude=[{exclude}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_display_describes_the_condition() {
        assert_eq!(
            Check::Contains("TODO".into()).to_string(),
            "contains: \"TODO\""
        );
        assert_eq!(
            Check::NotContains("LICENSE".into()).to_string(),
            "not contains: \"LICENSE\""
        );
        assert_eq!(
            Check::Regex("fix(me)?".into()).to_string(),
            "regexp match: \"fix(me)?\""
        );
    }

    #[test]
    fn builder_sets_all_fields() {
        let rule = Rule::new(Check::Regex("x+".into()))
            .with_origin("/repo/PROFANITY")
            .with_message("no x runs")
            .with_include(GlobFilter::new("*.rs"))
            .with_exclude(GlobFilter::new("gen_*.rs"));

        assert_eq!(rule.origin(), Path::new("/repo/PROFANITY"));
        assert_eq!(rule.message(), Some("no x runs"));
        assert_eq!(rule.check().map(Check::kind), Some("regex"));
        assert_eq!(rule.include().map(GlobFilter::as_str), Some("*.rs"));
        assert_eq!(rule.exclude().map(GlobFilter::as_str), Some("gen_*.rs"));
    }

    #[test]
    fn unset_rule_has_no_check() {
        let rule = Rule::unset();
        assert!(rule.check().is_none());
        assert_eq!(rule.to_string(), "<no rule set>");
    }

    #[test]
    fn rule_display_lists_filters_and_message() {
        let rule = Rule::new(Check::Contains("TODO".into()))
            .with_include(GlobFilter::new("*.go"))
            .with_message("no TODOs");
        assert_eq!(
            rule.to_string(),
            "contains: \"TODO\" include=[*.go] (no TODOs)"
        );
    }
}
