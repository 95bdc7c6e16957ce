//! Memoised rule resolution for the lifetime of one scan.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::resolver::RuleResolver;
use crate::rules::{LoadError, Rule, RuleSource};

/// Caches the effective rule list per directory.
///
/// The tree is assumed static during a scan, so entries are never
/// invalidated. Not meant to be shared between concurrent scans.
#[derive(Debug)]
pub struct ResolutionCache<S> {
    resolver: RuleResolver<S>,
    resolved: HashMap<PathBuf, Arc<[Rule]>>,
    hits: usize,
}

impl<S: RuleSource> ResolutionCache<S> {
    /// Wraps `resolver` with an empty cache.
    #[must_use]
    pub fn new(resolver: RuleResolver<S>) -> Self {
        Self {
            resolver,
            resolved: HashMap::new(),
            hits: 0,
        }
    }

    /// Returns the effective rules for `dir`, resolving on first request.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution has to load a broken rules file.
    pub fn resolved(&mut self, dir: &Path) -> Result<Arc<[Rule]>, LoadError> {
        if let Some(rules) = self.resolved.get(dir) {
            self.hits += 1;
            trace!("Rule cache hit for {}", dir.display());
            return Ok(Arc::clone(rules));
        }

        let rules: Arc<[Rule]> = self.resolver.resolve(dir)?.into();
        self.resolved.insert(dir.to_path_buf(), Arc::clone(&rules));
        Ok(rules)
    }

    /// The wrapped resolver.
    #[must_use]
    pub fn resolver(&self) -> &RuleResolver<S> {
        &self.resolver
    }

    /// Number of directories resolved so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Returns true if nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Number of lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::test_support::{literals, MapSource};

    fn cache(source: MapSource) -> ResolutionCache<MapSource> {
        ResolutionCache::new(RuleResolver::new("/r", source))
    }

    #[test]
    fn repeated_lookup_returns_identical_rules_without_reloading() {
        let mut cache = cache(
            MapSource::default()
                .with("/r", &["ROOT"])
                .with("/r/a", &["A"]),
        );

        let first = cache.resolved(Path::new("/r/a")).unwrap();
        let second = cache.resolved(Path::new("/r/a")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(literals(&first), vec!["ROOT", "A"]);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.resolver().source().load_count("/r"), 1);
        assert_eq!(cache.resolver().source().load_count("/r/a"), 1);
    }

    #[test]
    fn loader_runs_at_most_once_per_directory() {
        let mut cache = cache(MapSource::default().with("/r", &["ROOT"]));

        for dir in ["/r/a", "/r/a/b", "/r/a", "/r/c", "/r/a/b", "/r"] {
            cache.resolved(Path::new(dir)).unwrap();
        }

        let loads = cache.resolver().source().loads.borrow();
        let mut unique = loads.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(loads.len(), unique.len());
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.hits(), 2);
    }

    #[test]
    fn empty_until_first_lookup() {
        let cache = cache(MapSource::default());
        assert!(cache.is_empty());
        assert!(cache.resolver().index().is_empty());
    }
}
