//! Merging of the two rename-detection passes.
//!
//! Renames are detected twice: once between HEAD's parent and HEAD
//! (historical), and once between HEAD and the working tree. The passes can
//! disagree when a file renamed in the last commit has been renamed again
//! since. [`reconcile`] merges them into one view and corrects the added and
//! removed counts so a rename is never also reported as an add/remove pair.

use crate::{git::DiffEntry, path_set::PathSet};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub source: String,
    pub target: String,
}

impl RenamePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Renames found by one detection pass, keyed by source path.
///
/// Pairs keep their insertion order. Lookups by source or target go through
/// hash indexes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenameSet {
    pairs: Vec<RenamePair>,
    by_source: HashMap<String, usize>,
    target_counts: HashMap<String, usize>,
}

impl RenameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_diff(entries: &[DiffEntry]) -> Self {
        entries
            .iter()
            .filter(|entry| entry.is_rename())
            .map(|entry| RenamePair::new(&entry.old_path, &entry.new_path))
            .collect()
    }

    /// A source seen twice keeps its latest target.
    pub fn insert(&mut self, pair: RenamePair) {
        *self.target_counts.entry(pair.target.clone()).or_default() += 1;

        match self.by_source.get(&pair.source) {
            Some(&pos) => {
                let old = std::mem::replace(&mut self.pairs[pos].target, pair.target);
                self.forget_target(&old);
            }
            None => {
                self.by_source.insert(pair.source.clone(), self.pairs.len());
                self.pairs.push(pair);
            }
        }
    }

    fn forget_target(&mut self, target: &str) {
        if let Some(count) = self.target_counts.get_mut(target) {
            *count -= 1;
            if *count == 0 {
                self.target_counts.remove(target);
            }
        }
    }

    pub fn contains_source(&self, path: &str) -> bool {
        self.by_source.contains_key(path)
    }

    pub fn contains_target(&self, path: &str) -> bool {
        self.target_counts.contains_key(path)
    }

    pub fn target_of(&self, source: &str) -> Option<&str> {
        self.by_source
            .get(source)
            .map(|&pos| self.pairs[pos].target.as_str())
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.source.as_str())
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.target.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenamePair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<RenamePair> for RenameSet {
    fn from_iter<I: IntoIterator<Item = RenamePair>>(iter: I) -> Self {
        let mut set = RenameSet::new();
        for pair in iter {
            set.insert(pair);
        }
        set
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub rename_targets: PathSet,
    pub rename_sources: PathSet,
    pub adjusted_added: usize,
    pub adjusted_removed: usize,
}

/// `raw_removed` is everything gone from the index or the working tree
/// (removed ∪ missing).
///
/// A historical target that is itself a working-tree source was renamed again
/// before being recorded, so only the working-tree target is shown. Sources
/// are kept from both passes regardless.
///
/// Every source found in `raw_removed` lowers the removed count, whether or
/// not the removal was caused by that rename.
pub fn reconcile(
    historical: &RenameSet,
    working_tree: &RenameSet,
    raw_added: &PathSet,
    raw_removed: &PathSet,
) -> Reconciled {
    let mut rename_targets = PathSet::new();
    rename_targets.extend(
        historical
            .targets()
            .filter(|target| !working_tree.contains_source(target)),
    );
    rename_targets.extend(working_tree.targets());

    let mut rename_sources = PathSet::new();
    rename_sources.extend(historical.sources());
    rename_sources.extend(working_tree.sources());

    let mut adjusted_added = raw_added.len();
    for target in rename_targets.iter().filter(|t| raw_added.contains(t)) {
        log::debug!("Not counting rename target {} as added", target);
        adjusted_added = adjusted_added.saturating_sub(1);
    }

    let mut adjusted_removed = raw_removed.len();
    for source in rename_sources.iter().filter(|s| raw_removed.contains(s)) {
        log::debug!("Not counting rename source {} as removed", source);
        adjusted_removed = adjusted_removed.saturating_sub(1);
    }

    Reconciled {
        rename_targets,
        rename_sources,
        adjusted_added,
        adjusted_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::ChangeType;
    use pretty_assertions::assert_eq;

    fn renames(pairs: &[(&str, &str)]) -> RenameSet {
        pairs
            .iter()
            .map(|(source, target)| RenamePair::new(*source, *target))
            .collect()
    }

    fn paths(paths: &[&str]) -> PathSet {
        paths.iter().copied().collect()
    }

    #[test]
    fn renamed_again_before_commit_shows_latest_target_only() {
        let historical = renames(&[("A.txt", "B.txt")]);
        let working = renames(&[("B.txt", "C.txt")]);

        let result = reconcile(&historical, &working, &paths(&[]), &paths(&[]));

        assert_eq!(result.rename_targets, paths(&["C.txt"]));
        assert_eq!(result.rename_sources, paths(&["A.txt", "B.txt"]));
        assert!(!result.rename_targets.contains("B.txt"));
    }

    #[test]
    fn unrelated_passes_are_unioned() {
        let historical = renames(&[("a", "b")]);
        let working = renames(&[("x", "y")]);

        let result = reconcile(&historical, &working, &paths(&[]), &paths(&[]));

        assert_eq!(
            result.rename_targets.iter().collect::<Vec<_>>(),
            vec!["b", "y"]
        );
        assert_eq!(
            result.rename_sources.iter().collect::<Vec<_>>(),
            vec!["a", "x"]
        );
    }

    #[test]
    fn empty_passes_leave_counts_alone() {
        let result = reconcile(
            &RenameSet::new(),
            &RenameSet::new(),
            &paths(&["new.txt"]),
            &paths(&["gone.txt", "also-gone.txt"]),
        );

        assert_eq!(result, Reconciled {
            rename_targets: PathSet::new(),
            rename_sources: PathSet::new(),
            adjusted_added: 1,
            adjusted_removed: 2,
        });
    }

    #[test]
    fn rename_target_is_not_counted_as_added() {
        let working = renames(&[("old.txt", "new.txt")]);

        let result = reconcile(
            &RenameSet::new(),
            &working,
            &paths(&["new.txt", "other.txt"]),
            &paths(&["old.txt"]),
        );

        assert_eq!(result.adjusted_added, 1);
        assert_eq!(result.adjusted_removed, 0);
    }

    #[test]
    fn counts_never_go_negative() {
        let working = renames(&[("a", "b"), ("c", "d"), ("e", "f")]);

        let result = reconcile(
            &RenameSet::new(),
            &working,
            &paths(&["b"]),
            &paths(&["a"]),
        );

        assert_eq!(result.adjusted_added, 0);
        assert_eq!(result.adjusted_removed, 0);
    }

    #[test]
    fn historical_source_removed_again_is_still_subtracted() {
        let historical = renames(&[("a.txt", "b.txt")]);

        let result = reconcile(
            &historical,
            &RenameSet::new(),
            &paths(&[]),
            &paths(&["a.txt", "c.txt"]),
        );

        assert_eq!(result.adjusted_removed, 1);
    }

    #[test]
    fn suppressed_target_does_not_reduce_added() {
        let historical = renames(&[("A.txt", "B.txt")]);
        let working = renames(&[("B.txt", "C.txt")]);

        let result = reconcile(&historical, &working, &paths(&["B.txt"]), &paths(&[]));

        assert_eq!(result.adjusted_added, 1);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let historical = renames(&[("a", "b"), ("q", "r")]);
        let working = renames(&[("b", "c")]);
        let added = paths(&["c", "z"]);
        let removed = paths(&["a", "b"]);

        let first = reconcile(&historical, &working, &added, &removed);
        let second = reconcile(&historical, &working, &added, &removed);

        assert_eq!(first, second);
    }

    #[test]
    fn rename_set_from_diff_keeps_renames_only() {
        let entries = vec![
            DiffEntry::renamed("a", "b"),
            DiffEntry::new("c", "c", ChangeType::Modified),
            DiffEntry::new("d", "d", ChangeType::Deleted),
        ];

        let set = RenameSet::from_diff(&entries);

        assert_eq!(set.len(), 1);
        assert_eq!(set.target_of("a"), Some("b"));
        assert!(set.contains_target("b"));
    }

    #[test]
    fn duplicate_source_keeps_latest_target() {
        let set = renames(&[("a", "b"), ("a", "c")]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.target_of("a"), Some("c"));
    }

    #[test]
    fn replaced_target_is_no_longer_a_target() {
        let set = renames(&[("a", "b"), ("x", "b"), ("a", "c")]);

        assert!(set.contains_target("b"));
        assert!(set.contains_target("c"));

        let set = renames(&[("a", "b"), ("a", "c")]);
        assert!(!set.contains_target("b"));
        assert_eq!(set.targets().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn large_directory_move() {
        let entries = (0..40_000)
            .map(|i| DiffEntry::renamed(format!("old/{i}.rs"), format!("new/{i}.rs")))
            .collect::<Vec<_>>();
        let historical = RenameSet::from_diff(&entries);
        let working = (0..40_000)
            .step_by(2)
            .map(|i| RenamePair::new(format!("new/{i}.rs"), format!("moved/{i}.rs")))
            .collect::<RenameSet>();
        let added = (0..40_000).map(|i| format!("moved/{i}.rs")).collect::<PathSet>();
        let removed = (0..40_000).map(|i| format!("new/{i}.rs")).collect::<PathSet>();

        let result = reconcile(&historical, &working, &added, &removed);

        assert_eq!(historical.len(), 40_000);
        assert_eq!(result.rename_targets.len(), 40_000);
        assert!(!result.rename_targets.contains("new/0.rs"));
        assert!(result.rename_targets.contains("new/1.rs"));
        assert_eq!(result.adjusted_added, 20_000);
        assert_eq!(result.adjusted_removed, 20_000);
    }
}
