//! Comma-separated glob filters.

use std::fmt;
use std::path::Path;

use glob::MatchOptions;

use crate::patterns::{PatternCache, PatternError};

/// `*` and `?` never match a path separator.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A comma-separated list of glob patterns, e.g. `"*.go, vendor/*"`.
///
/// A path matches the filter when any pattern matches either the full path
/// or its base name, so `c.go` matches `/a/b/c.go`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobFilter(String);

impl GlobFilter {
    /// Creates a filter from its comma-separated source text.
    #[must_use]
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    /// Creates a filter, or `None` if `spec` holds no patterns.
    #[must_use]
    pub fn non_empty(spec: impl Into<String>) -> Option<Self> {
        let filter = Self::new(spec);
        let has_patterns = filter.patterns().next().is_some();
        has_patterns.then_some(filter)
    }

    /// Joins `patterns` into one filter, or `None` if there are none.
    #[must_use]
    pub fn from_patterns<I, S>(patterns: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        Self::non_empty(joined)
    }

    /// The source text as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates the individual patterns, trimmed, skipping blanks.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.0.split(',').map(str::trim).filter(|p| !p.is_empty())
    }

    /// Tests `path` against the filter, compiling patterns afresh.
    ///
    /// # Errors
    ///
    /// Returns an error on the first pattern with invalid glob syntax.
    pub fn matches(&self, path: &Path) -> Result<bool, PatternError> {
        self.matches_cached(path, &mut PatternCache::new())
    }

    /// Tests `path` against the filter using compiled patterns from `cache`.
    ///
    /// # Errors
    ///
    /// Returns an error on the first pattern with invalid glob syntax.
    pub fn matches_cached(
        &self,
        path: &Path,
        cache: &mut PatternCache,
    ) -> Result<bool, PatternError> {
        let full = path.to_string_lossy();
        let base = path.file_name().map(|name| name.to_string_lossy());

        for raw in self.patterns() {
            let pattern = cache.glob(raw)?;
            if pattern.matches_with(&full, MATCH_OPTIONS) {
                return Ok(true);
            }
            if base
                .as_deref()
                .is_some_and(|base| pattern.matches_with(base, MATCH_OPTIONS))
            {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for GlobFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
