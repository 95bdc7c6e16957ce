//! Directory scanner driving rule resolution and evaluation.

use crate::cache::ResolutionCache;
use crate::config::{Config, FailPolicy};
use crate::evaluator::Evaluator;
use crate::filter::GlobFilter;
use crate::patterns::PatternError;
use crate::resolver::RuleResolver;
use crate::rules::{FsRuleSource, LoadError, Rule};
use crate::types::{ScanResult, Violation};

use miette::Diagnostic;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Errors that abort a scan.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// IO error reading a scanned file.
    #[error("IO error on {path}: {source}")]
    #[diagnostic(code(profanity::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to walk {root}: {source}")]
    #[diagnostic(code(profanity::io))]
    Walk {
        /// Scan root.
        root: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// A rules file could not be read or parsed.
    #[error("{0}")]
    #[diagnostic(
        code(profanity::rules_file),
        help("a rules file is a YAML list of records with message, contains, notContains, regex, include and exclude keys")
    )]
    RulesFile(#[from] LoadError),

    /// A glob or regex failed to compile.
    #[error("{context}: {source}")]
    #[diagnostic(code(profanity::pattern))]
    Pattern {
        /// Where the pattern was declared.
        context: String,
        /// The compile error.
        source: PatternError,
    },

    /// The scan root is missing or not a directory.
    #[error("scan root {0} is not a directory")]
    #[diagnostic(code(profanity::config))]
    InvalidRoot(PathBuf),
}

/// Builder for configuring a [`Scanner`].
#[derive(Debug, Default)]
pub struct ScannerBuilder {
    root: Option<PathBuf>,
    rules_file: Option<String>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    skip_dirs: Option<Vec<String>>,
    policy: Option<FailPolicy>,
    config: Option<Config>,
}

impl ScannerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to scan.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rules file name looked up in each directory.
    #[must_use]
    pub fn rules_file(mut self, name: impl Into<String>) -> Self {
        self.rules_file = Some(name.into());
        self
    }

    /// Adds a global include glob pattern (comma-separated lists allowed).
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Adds a global exclude glob pattern (comma-separated lists allowed).
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple global exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Replaces the directory names that are never descended into.
    #[must_use]
    pub fn skip_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_dirs = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn policy(mut self, policy: FailPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the configuration. Explicit builder settings take precedence.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory doesn't exist.
    pub fn build(self) -> Result<Scanner, ScanError> {
        let scan = self.config.map(|c| c.scan).unwrap_or_default();

        let root = self.root.unwrap_or(scan.root);
        let root = if root.is_absolute() {
            root
        } else {
            let cwd = std::env::current_dir().map_err(|source| ScanError::Io {
                path: PathBuf::from("."),
                source,
            })?;
            cwd.join(&root)
        };
        let root: PathBuf = root.components().collect();
        if !root.is_dir() {
            return Err(ScanError::InvalidRoot(root));
        }

        // Merge global filters from config
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(scan.include);
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(scan.exclude);

        Ok(Scanner {
            root,
            rules_file: self.rules_file.unwrap_or(scan.rules_file),
            include: GlobFilter::from_patterns(&include_patterns),
            exclude: GlobFilter::from_patterns(&exclude_patterns),
            skip_dirs: self.skip_dirs.unwrap_or(scan.skip_dirs),
            policy: self.policy.unwrap_or(scan.policy),
        })
    }
}

/// Outcome of visiting one file.
enum Visit {
    Skipped,
    Passed,
    Violated(Violation),
}

/// Per-scan mutable state.
struct ScanState {
    rules: ResolutionCache<FsRuleSource>,
    evaluator: Evaluator,
}

/// Walks a directory tree and checks every file against its effective rules.
///
/// Use [`Scanner::builder()`] to construct an instance.
#[derive(Debug)]
pub struct Scanner {
    root: PathBuf,
    rules_file: String,
    include: Option<GlobFilter>,
    exclude: Option<GlobFilter>,
    skip_dirs: Vec<String>,
    policy: FailPolicy,
}

impl Scanner {
    /// Creates a new builder for configuring a scanner.
    #[must_use]
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    /// Returns the root directory being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the rules file name.
    #[must_use]
    pub fn rules_file(&self) -> &str {
        &self.rules_file
    }

    /// Returns the failure policy.
    #[must_use]
    pub fn policy(&self) -> FailPolicy {
        self.policy
    }

    /// Scans the tree and returns the results.
    ///
    /// Under [`FailPolicy::FailFast`] the walk stops at the first violation.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure, a malformed rules file, or an invalid
    /// glob or regex.
    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        info!("Starting scan at {}", self.root.display());
        if let Some(include) = &self.include {
            info!("Using include filter: {include}");
        }
        if let Some(exclude) = &self.exclude {
            info!("Using exclude filter: {exclude}");
        }

        let mut state = self.new_state();
        let mut result = ScanResult::new();

        for entry in self.walk() {
            let entry = entry.map_err(|source| ScanError::Walk {
                root: self.root.clone(),
                source,
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if !is_regular_file(&entry) {
                debug!(
                    "{} .. skipping, not a regular file",
                    entry.path().display()
                );
                result.files_skipped += 1;
                continue;
            }

            match self.visit(entry.path(), &mut state)? {
                Visit::Skipped => result.files_skipped += 1,
                Visit::Passed => result.files_checked += 1,
                Visit::Violated(violation) => {
                    result.files_checked += 1;
                    debug!("{}", violation);
                    result.violations.push(violation);
                    if self.policy == FailPolicy::FailFast {
                        info!("Stopping at first violation");
                        break;
                    }
                }
            }
        }

        info!(
            "Scan complete: {} violation(s) in {} file(s), {} director(ies) resolved",
            result.violations.len(),
            result.files_checked,
            state.rules.len()
        );

        Ok(result)
    }

    /// Returns the effective rules for files directly in `dir`.
    ///
    /// A relative `dir` is taken relative to the scan root.
    ///
    /// # Errors
    ///
    /// Returns an error if a rules file on the way is malformed.
    pub fn effective_rules(&self, dir: &Path) -> Result<Arc<[Rule]>, ScanError> {
        let dir: PathBuf = if dir.is_absolute() {
            dir.components().collect()
        } else {
            self.root.join(dir).components().collect()
        };
        Ok(self.new_state().rules.resolved(&dir)?)
    }

    fn new_state(&self) -> ScanState {
        let source = FsRuleSource::new(&self.rules_file);
        ScanState {
            rules: ResolutionCache::new(RuleResolver::new(&self.root, source)),
            evaluator: Evaluator::new(),
        }
    }

    /// Depth-first walk in file-name order, pruning skipped directories.
    fn walk(&self) -> impl Iterator<Item = walkdir::Result<DirEntry>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !self.is_skipped_dir(entry))
    }

    fn is_skipped_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.skip_dirs.iter().any(|skip| skip == name))
    }

    /// Checks a single file.
    fn visit(&self, path: &Path, state: &mut ScanState) -> Result<Visit, ScanError> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);

        if let Some(include) = &self.include {
            let included = state
                .evaluator
                .filter_matches(include, relative)
                .map_err(|source| global_pattern_error("include", source))?;
            if !included {
                debug!("{} .. skipping", relative.display());
                return Ok(Visit::Skipped);
            }
        }

        if let Some(exclude) = &self.exclude {
            let excluded = state
                .evaluator
                .filter_matches(exclude, relative)
                .map_err(|source| global_pattern_error("exclude", source))?;
            if excluded {
                debug!("{} .. skipping", relative.display());
                return Ok(Visit::Skipped);
            }
        }

        if path.file_name() == Some(OsStr::new(&self.rules_file)) {
            debug!("{} .. skipping rules file", relative.display());
            return Ok(Visit::Skipped);
        }

        let dir = path.parent().unwrap_or(&self.root);
        let rules = state.rules.resolved(dir)?;

        // Read even when no rule applies; an unreadable file aborts the scan.
        let contents = std::fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match state.evaluator.evaluate(&rules, relative, &contents)? {
            Some(violation) => Ok(Visit::Violated(violation.relative_to(&self.root))),
            None => {
                debug!("{} ... ok", relative.display());
                Ok(Visit::Passed)
            }
        }
    }
}

/// Regular files, and symlinks whose target is a regular file.
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file()
        || (file_type.is_symlink()
            && std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file()))
}

fn global_pattern_error(which: &str, source: PatternError) -> ScanError {
    ScanError::Pattern {
        context: format!("global {which} filter"),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builder_defaults() {
        let tmp = TempDir::new().unwrap();
        let scanner = Scanner::builder()
            .root(tmp.path())
            .build()
            .expect("Failed to build scanner");

        assert!(scanner.root().is_dir());
        assert_eq!(scanner.rules_file(), "PROFANITY");
        assert_eq!(scanner.policy(), FailPolicy::FailFast);
        assert_eq!(scanner.skip_dirs, vec![".git", "_bin"]);
    }

    #[test]
    fn test_builder_rejects_missing_root() {
        let tmp = TempDir::new().unwrap();
        let result = Scanner::builder().root(tmp.path().join("nope")).build();
        assert!(matches!(result, Err(ScanError::InvalidRoot(_))));
    }

    #[test]
    fn test_builder_settings_override_config() {
        let tmp = TempDir::new().unwrap();
        let config = Config::parse(
            r#"
[scan]
rules-file = "RULES"
include = ["*.go"]
policy = "collect-all"
"#,
        )
        .unwrap();

        let scanner = Scanner::builder()
            .root(tmp.path())
            .config(config)
            .rules_file("OTHER")
            .include("*.rs")
            .policy(FailPolicy::FailFast)
            .build()
            .unwrap();

        assert_eq!(scanner.rules_file(), "OTHER");
        assert_eq!(scanner.policy(), FailPolicy::FailFast);
        assert_eq!(
            scanner.include.as_ref().map(GlobFilter::as_str),
            Some("*.rs,*.go")
        );
    }

    #[test]
    fn test_skipped_dirs_are_not_descended() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git/objects")).unwrap();
        fs::write(tmp.path().join(".git/objects/blob"), "TODO").unwrap();
        fs::write(tmp.path().join("main.go"), "ok").unwrap();

        let scanner = Scanner::builder().root(tmp.path()).build().unwrap();
        let files: Vec<PathBuf> = scanner
            .walk()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(scanner.root()).unwrap().to_path_buf())
            .collect();

        assert_eq!(files, vec![PathBuf::from("main.go")]);
    }

    #[test]
    fn test_walk_order_is_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("b")).unwrap();
        fs::write(tmp.path().join("b/inner.txt"), "").unwrap();
        fs::write(tmp.path().join("c.txt"), "").unwrap();
        fs::write(tmp.path().join("a.txt"), "").unwrap();

        let scanner = Scanner::builder().root(tmp.path()).build().unwrap();
        let files: Vec<PathBuf> = scanner
            .walk()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().strip_prefix(scanner.root()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b/inner.txt"),
                PathBuf::from("c.txt")
            ]
        );
    }
}
