//! Rule inheritance across the directory hierarchy.
//!
//! The effective rules for a directory are, in evaluation order:
//!
//! 1. the scan root's rules (unless the directory is the root),
//! 2. each ancestor's rules, shallowest ancestor first,
//! 3. the directory's own rules.
//!
//! Ancestry is decided per path component, so `foo` is never treated as an
//! ancestor of `foobar`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::rules::{LoadError, Rule, RuleSource};

/// Raw, un-merged rules keyed by the directory that declared them.
///
/// A directory without a rules file is recorded with an empty entry so it is
/// never loaded twice.
#[derive(Debug, Default)]
pub struct PackageRuleIndex {
    entries: BTreeMap<PathBuf, Arc<[Rule]>>,
}

impl PackageRuleIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules declared directly in `dir`, if it has been visited.
    #[must_use]
    pub fn get(&self, dir: &Path) -> Option<&Arc<[Rule]>> {
        self.entries.get(dir)
    }

    /// Returns true if `dir` has been visited.
    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.entries.contains_key(dir)
    }

    /// Records the rules declared in `dir`.
    pub fn insert(&mut self, dir: PathBuf, rules: Arc<[Rule]>) {
        self.entries.insert(dir, rules);
    }

    /// Number of visited directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no directory has been visited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visited directories that declared at least one rule.
    pub fn with_rules(&self) -> impl Iterator<Item = (&Path, &[Rule])> {
        self.entries
            .iter()
            .filter(|(_, rules)| !rules.is_empty())
            .map(|(dir, rules)| (dir.as_path(), &**rules))
    }

    /// Visited proper ancestors of `dir`, shallowest first.
    #[must_use]
    pub fn ancestors_of(&self, dir: &Path) -> Vec<(&Path, &[Rule])> {
        let mut ancestors: Vec<(&Path, &[Rule])> = self
            .entries
            .iter()
            .filter(|(key, _)| key.as_path() != dir && dir.starts_with(key))
            .map(|(key, rules)| (key.as_path(), &**rules))
            .collect();
        ancestors.sort_by_key(|(key, _)| key.components().count());
        ancestors
    }
}

/// Resolves the effective rule list for a directory.
#[derive(Debug)]
pub struct RuleResolver<S> {
    root: PathBuf,
    source: S,
    index: PackageRuleIndex,
}

impl<S: RuleSource> RuleResolver<S> {
    /// Creates a resolver for the tree rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, source: S) -> Self {
        Self {
            root: root.into(),
            source,
            index: PackageRuleIndex::new(),
        }
    }

    /// The scan root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The underlying rule source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Raw rules discovered so far.
    #[must_use]
    pub fn index(&self) -> &PackageRuleIndex {
        &self.index
    }

    /// Resolves the effective rules for files directly in `dir`.
    ///
    /// Every directory from the root down to `dir` is loaded first, so an
    /// ancestor contributes even when no file in it has been visited.
    ///
    /// # Errors
    ///
    /// Returns an error if any rules file on the way cannot be read or parsed.
    pub fn resolve(&mut self, dir: &Path) -> Result<Vec<Rule>, LoadError> {
        self.load_lineage(dir)?;
        let local = self.local_rules(dir)?;

        let mut rules = Vec::new();
        if dir != self.root {
            if let Some(root_rules) = self.index.get(&self.root) {
                rules.extend(root_rules.iter().cloned());
            }
        }
        for (ancestor, inherited) in self.index.ancestors_of(dir) {
            if ancestor != self.root {
                rules.extend(inherited.iter().cloned());
            }
        }
        rules.extend(local.iter().cloned());

        debug!(
            "Resolved {} rule(s) for {} ({} local)",
            rules.len(),
            dir.display(),
            local.len()
        );
        Ok(rules)
    }

    fn load_lineage(&mut self, dir: &Path) -> Result<(), LoadError> {
        let Ok(relative) = dir.strip_prefix(&self.root) else {
            return Ok(());
        };
        let relative = relative.to_path_buf();

        let mut current = self.root.clone();
        self.local_rules(&current)?;
        for component in relative.components() {
            current.push(component);
            self.local_rules(&current)?;
        }
        Ok(())
    }

    fn local_rules(&mut self, dir: &Path) -> Result<Arc<[Rule]>, LoadError> {
        if let Some(rules) = self.index.get(dir) {
            return Ok(Arc::clone(rules));
        }
        let rules: Arc<[Rule]> = self.source.load(dir)?.unwrap_or_default().into();
        self.index.insert(dir.to_path_buf(), Arc::clone(&rules));
        Ok(rules)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use crate::rules::{Check, LoadError, Rule, RuleSource};

    /// In-memory rule source that records every directory it was asked for.
    #[derive(Debug, Default)]
    pub(crate) struct MapSource {
        rules: HashMap<PathBuf, Vec<Rule>>,
        pub(crate) loads: RefCell<Vec<PathBuf>>,
    }

    impl MapSource {
        pub(crate) fn with(mut self, dir: &str, literals: &[&str]) -> Self {
            let origin = Path::new(dir).join("PROFANITY");
            let rules = literals
                .iter()
                .map(|l| Rule::new(Check::Contains((*l).to_string())).with_origin(&origin))
                .collect();
            self.rules.insert(PathBuf::from(dir), rules);
            self
        }

        pub(crate) fn load_count(&self, dir: &str) -> usize {
            self.loads
                .borrow()
                .iter()
                .filter(|d| d.as_path() == Path::new(dir))
                .count()
        }
    }

    impl RuleSource for MapSource {
        fn load(&self, dir: &Path) -> Result<Option<Vec<Rule>>, LoadError> {
            self.loads.borrow_mut().push(dir.to_path_buf());
            Ok(self.rules.get(dir).cloned())
        }
    }

    pub(crate) fn literals(rules: &[Rule]) -> Vec<&str> {
        rules
            .iter()
            .filter_map(|r| r.check().map(Check::value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{literals, MapSource};
    use super::*;

    #[test]
    fn root_rules_apply_to_descendants_without_local_rules() {
        let mut resolver = RuleResolver::new("/r", MapSource::default().with("/r", &["ROOT"]));
        let rules = resolver.resolve(Path::new("/r/a/b")).unwrap();
        assert_eq!(literals(&rules), vec!["ROOT"]);
    }

    #[test]
    fn root_directory_sees_its_rules_once() {
        let mut resolver = RuleResolver::new("/r", MapSource::default().with("/r", &["ROOT"]));
        let rules = resolver.resolve(Path::new("/r")).unwrap();
        assert_eq!(literals(&rules), vec!["ROOT"]);
    }

    #[test]
    fn merge_order_is_root_then_shallowest_ancestor_then_local() {
        let source = MapSource::default()
            .with("/r", &["ROOT"])
            .with("/r/a", &["A1", "A2"])
            .with("/r/a/b", &["B"])
            .with("/r/a/b/c", &["C"]);
        let mut resolver = RuleResolver::new("/r", source);

        let rules = resolver.resolve(Path::new("/r/a/b/c")).unwrap();
        assert_eq!(literals(&rules), vec!["ROOT", "A1", "A2", "B", "C"]);
    }

    #[test]
    fn local_rules_are_always_included() {
        let source = MapSource::default()
            .with("/r", &["ROOT"])
            .with("/r/a", &["LOCAL"]);
        let mut resolver = RuleResolver::new("/r", source);

        let rules = resolver.resolve(Path::new("/r/a")).unwrap();
        assert_eq!(literals(&rules), vec!["ROOT", "LOCAL"]);
    }

    #[test]
    fn sibling_with_common_prefix_is_not_an_ancestor() {
        let source = MapSource::default().with("/r/foo", &["FOO"]);
        let mut resolver = RuleResolver::new("/r", source);

        resolver.resolve(Path::new("/r/foo")).unwrap();
        let rules = resolver.resolve(Path::new("/r/foobar")).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn siblings_do_not_inherit_from_each_other() {
        let source = MapSource::default()
            .with("/r/a", &["A"])
            .with("/r/b", &["B"]);
        let mut resolver = RuleResolver::new("/r", source);

        resolver.resolve(Path::new("/r/a")).unwrap();
        let rules = resolver.resolve(Path::new("/r/b/deep")).unwrap();
        assert_eq!(literals(&rules), vec!["B"]);
    }

    #[test]
    fn ancestors_load_even_when_never_visited_directly() {
        let source = MapSource::default().with("/r/only-subdirs", &["MID"]);
        let mut resolver = RuleResolver::new("/r", source);

        let rules = resolver.resolve(Path::new("/r/only-subdirs/x/y")).unwrap();
        assert_eq!(literals(&rules), vec!["MID"]);
        assert!(resolver.index().contains(Path::new("/r/only-subdirs/x")));
    }

    #[test]
    fn each_directory_is_loaded_once() {
        let source = MapSource::default().with("/r", &["ROOT"]);
        let mut resolver = RuleResolver::new("/r", source);

        resolver.resolve(Path::new("/r/a/b")).unwrap();
        resolver.resolve(Path::new("/r/a/c")).unwrap();
        resolver.resolve(Path::new("/r/a")).unwrap();

        assert_eq!(resolver.source().load_count("/r"), 1);
        assert_eq!(resolver.source().load_count("/r/a"), 1);
        assert_eq!(resolver.index().len(), 4);
        assert_eq!(resolver.index().with_rules().count(), 1);
    }

    #[test]
    fn directory_outside_root_only_sees_known_ancestors() {
        let source = MapSource::default().with("/elsewhere", &["E"]);
        let mut resolver = RuleResolver::new("/r", source);

        let rules = resolver.resolve(Path::new("/elsewhere/sub")).unwrap();
        assert!(rules.is_empty());
        assert_eq!(resolver.source().load_count("/elsewhere"), 0);
    }

    #[test]
    fn ancestors_of_sorts_by_depth() {
        let mut index = PackageRuleIndex::new();
        let rule = || Arc::from(vec![Rule::unset()]);
        index.insert(PathBuf::from("/r/a/b"), rule());
        index.insert(PathBuf::from("/r"), rule());
        index.insert(PathBuf::from("/r/a"), rule());
        index.insert(PathBuf::from("/r/ab"), rule());

        let dirs: Vec<&Path> = index
            .ancestors_of(Path::new("/r/a/b/c"))
            .into_iter()
            .map(|(dir, _)| dir)
            .collect();
        assert_eq!(
            dirs,
            vec![Path::new("/r"), Path::new("/r/a"), Path::new("/r/a/b")]
        );
    }
}
