use crate::path_set::PathSet;

/// Raw per-path status sets of the working tree against HEAD, before any
/// rename reconciliation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawStatus {
    /// Index differs from the working tree.
    pub modified: PathSet,
    /// HEAD differs from the index.
    pub changed: PathSet,
    /// In the index, not in HEAD.
    pub added: PathSet,
    /// In HEAD, not in the index.
    pub removed: PathSet,
    /// In the index, not in the working tree.
    pub missing: PathSet,
    pub untracked: PathSet,
    pub ignored_not_in_index: PathSet,
    pub conflicting: PathSet,
}

impl RawStatus {
    pub(crate) fn record(&mut self, path: &str, status: git2::Status) {
        use git2::Status;

        if status.intersects(Status::INDEX_NEW) {
            self.added.insert(path);
        }
        if status.intersects(Status::INDEX_MODIFIED | Status::INDEX_TYPECHANGE) {
            self.changed.insert(path);
        }
        if status.intersects(Status::INDEX_DELETED) {
            self.removed.insert(path);
        }
        if status.intersects(Status::WT_DELETED) {
            self.missing.insert(path);
        }
        if status.intersects(Status::WT_MODIFIED | Status::WT_TYPECHANGE) {
            self.modified.insert(path);
        }
        if status.intersects(Status::WT_NEW) {
            self.untracked.insert(path);
        }
        if status.intersects(Status::IGNORED) {
            self.ignored_not_in_index.insert(path);
        }
        if status.intersects(Status::CONFLICTED) {
            self.conflicting.insert(path);
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
            || !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.untracked.is_empty()
            || !self.missing.is_empty()
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        !self.added.is_empty()
            || !self.changed.is_empty()
            || !self.removed.is_empty()
            || !self.missing.is_empty()
            || !self.modified.is_empty()
            || !self.conflicting.is_empty()
    }
}
