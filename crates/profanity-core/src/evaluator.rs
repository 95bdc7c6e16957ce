//! Per-file rule evaluation.

use std::path::Path;

use tracing::trace;

use crate::filter::GlobFilter;
use crate::patterns::{PatternCache, PatternError};
use crate::rules::Rule;
use crate::scanner::ScanError;
use crate::types::Violation;

/// Applies resolved rule lists to file contents.
///
/// Owns the [`PatternCache`] so that every glob and regex compiles at most
/// once per scan.
#[derive(Debug, Default)]
pub struct Evaluator {
    patterns: PatternCache,
}

impl Evaluator {
    /// Creates an evaluator with an empty pattern cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates `rules` in order against one file.
    ///
    /// Rules whose include filter misses `file`, or whose exclude filter
    /// hits it, are skipped. Returns the first violation; later rules are
    /// not evaluated.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule's filter or regex fails to compile.
    pub fn evaluate(
        &mut self,
        rules: &[Rule],
        file: &Path,
        contents: &[u8],
    ) -> Result<Option<Violation>, ScanError> {
        for rule in rules {
            if !self.applies(rule, file)? {
                trace!("{}: rule `{rule}` filtered out", file.display());
                continue;
            }

            let violated = match rule.check() {
                Some(check) => check
                    .is_violated_by(contents, &mut self.patterns)
                    .map_err(|source| rule_pattern_error(rule, source))?,
                None => true,
            };

            if violated {
                return Ok(Some(Violation::new(file, rule)));
            }
        }
        Ok(None)
    }

    /// Tests `file` against a filter using this evaluator's pattern cache.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern in `filter` is invalid.
    pub fn filter_matches(
        &mut self,
        filter: &GlobFilter,
        file: &Path,
    ) -> Result<bool, PatternError> {
        filter.matches_cached(file, &mut self.patterns)
    }

    /// Number of distinct patterns compiled so far.
    #[must_use]
    pub fn compiled_patterns(&self) -> usize {
        self.patterns.len()
    }

    fn applies(&mut self, rule: &Rule, file: &Path) -> Result<bool, ScanError> {
        if let Some(include) = rule.include() {
            let included = self
                .filter_matches(include, file)
                .map_err(|source| rule_pattern_error(rule, source))?;
            if !included {
                return Ok(false);
            }
        }
        if let Some(exclude) = rule.exclude() {
            let excluded = self
                .filter_matches(exclude, file)
                .map_err(|source| rule_pattern_error(rule, source))?;
            if excluded {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn rule_pattern_error(rule: &Rule, source: PatternError) -> ScanError {
    ScanError::Pattern {
        context: format!("rule from {}", rule.origin().display()),
        source,
    }
}
