//! Compiled-pattern memoisation for a single scan.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use regex::bytes::Regex;

/// A glob or regular expression that failed to compile.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// Invalid glob syntax.
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Glob {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: glob::PatternError,
    },

    /// Invalid regular expression syntax.
    #[error("invalid regular expression `{pattern}`: {source}")]
    Regex {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}

/// Compiles glob and regex patterns on first use and keeps them for reuse.
///
/// Keyed by pattern text, so a pattern shared by many rules (or inherited
/// by many directories) compiles once.
#[derive(Debug, Default)]
pub struct PatternCache {
    globs: HashMap<String, glob::Pattern>,
    regexes: HashMap<String, Regex>,
}

impl PatternCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compiled glob for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Glob`] if `pattern` is not valid glob syntax.
    pub fn glob(&mut self, pattern: &str) -> Result<&glob::Pattern, PatternError> {
        match self.globs.entry(pattern.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let compiled = glob::Pattern::new(&to_glob_dialect(pattern)).map_err(
                    |source| PatternError::Glob {
                        pattern: pattern.to_string(),
                        source,
                    },
                )?;
                Ok(entry.insert(compiled))
            }
        }
    }

    /// Returns the compiled regular expression for `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Regex`] if `pattern` is not a valid regex.
    pub fn regex(&mut self, pattern: &str) -> Result<&Regex, PatternError> {
        match self.regexes.entry(pattern.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let compiled = Regex::new(pattern).map_err(|source| PatternError::Regex {
                    pattern: pattern.to_string(),
                    source,
                })?;
                Ok(entry.insert(compiled))
            }
        }
    }

    /// Number of distinct compiled patterns held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.globs.len() + self.regexes.len()
    }

    /// Returns true if nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rewrites rules-file glob syntax into the `glob` crate's dialect.
///
/// Rules files use shell-style globs where a run of `*` is a single `*`
/// (never crossing `/`), `[^...]` negates a class, and a backslash escapes
/// the next character.
fn to_glob_dialect(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' if !in_class => match chars.next() {
                Some(escaped @ ('*' | '?' | '[' | ']')) => {
                    out.push('[');
                    out.push(escaped);
                    out.push(']');
                }
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            '*' if !in_class => {
                out.push('*');
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push('[');
                if chars.peek() == Some(&'^') {
                    chars.next();
                    out.push('!');
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}
