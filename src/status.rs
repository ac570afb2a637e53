use crate::{
    Res,
    filter::PathFilter,
    git::{CommitInfo, DiffEntry, RawStatus, VersionControl},
    path_set::PathSet,
    rename::{self, RenameSet},
    undecided::UndecidedFileList,
};

/// Everything a status display needs, built once by [`classify`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusModel {
    pub modified_count: usize,
    pub added_count: usize,
    pub removed_count: usize,
    pub renamed_count: usize,
    pub tracked_paths: PathSet,
    pub untracked_paths: PathSet,
    pub ignored_paths: PathSet,
    pub undecided_paths: PathSet,
    pub rename_targets: PathSet,
    pub rename_sources: PathSet,
    /// Presentation hints, they don't affect classification.
    pub verbose: bool,
    pub very_verbose: bool,
}

impl StatusModel {
    fn empty(verbose: bool, very_verbose: bool) -> Self {
        Self {
            verbose,
            very_verbose,
            ..Self::default()
        }
    }

    /// Fills `undecided_paths` from a persisted list, restricted by `filters`.
    pub fn with_undecided<S: AsRef<str>>(
        mut self,
        list: &UndecidedFileList,
        filters: &[S],
    ) -> Self {
        let mut undecided = list.paths().clone();
        PathFilter::new(filters).apply(&mut undecided);
        self.undecided_paths = undecided;
        self
    }
}

/// Classifies the working tree of `vcs`.
///
/// Never fails: if the raw status can't be read the model is empty, and a
/// rename pass that fails counts as having found no renames.
pub fn classify<S: AsRef<str>>(
    vcs: &dyn VersionControl,
    filters: &[S],
    verbose: bool,
    very_verbose: bool,
) -> StatusModel {
    let raw = match vcs.raw_status() {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Couldn't read status, showing nothing: {}", e);
            return StatusModel::empty(verbose, very_verbose);
        }
    };

    let (historical, working_tree) = detect_renames(vcs);
    let removed = raw.removed.union(&raw.missing);
    let reconciled = rename::reconcile(&historical, &working_tree, &raw.added, &removed);

    let tracked = raw.modified.union(&raw.changed);
    let modified_count = tracked.len();

    let mut model = StatusModel {
        modified_count,
        added_count: reconciled.adjusted_added,
        removed_count: reconciled.adjusted_removed,
        renamed_count: reconciled.rename_targets.len(),
        tracked_paths: tracked.union(&raw.conflicting),
        untracked_paths: raw.untracked,
        ignored_paths: raw.ignored_not_in_index,
        undecided_paths: PathSet::new(),
        rename_targets: reconciled.rename_targets,
        rename_sources: reconciled.rename_sources,
        verbose,
        very_verbose,
    };

    let filter = PathFilter::new(filters);
    for set in [
        &mut model.tracked_paths,
        &mut model.untracked_paths,
        &mut model.ignored_paths,
        &mut model.rename_targets,
        &mut model.rename_sources,
    ] {
        filter.apply(set);
    }

    model
}

/// Runs both rename passes: parent of HEAD against HEAD, and HEAD against
/// the working tree. Returns `(historical, working_tree)`.
pub(crate) fn detect_renames(vcs: &dyn VersionControl) -> (RenameSet, RenameSet) {
    if !vcs.settings().renames.detect {
        return (RenameSet::new(), RenameSet::new());
    }

    let head = match vcs.resolve_reference("HEAD") {
        Ok(Some(head)) => head,
        Ok(None) => {
            log::debug!("No commits yet, skipping rename detection");
            return (RenameSet::new(), RenameSet::new());
        }
        Err(e) => {
            log::warn!("Couldn't resolve HEAD, skipping rename detection: {}", e);
            return (RenameSet::new(), RenameSet::new());
        }
    };

    let working_tree = renames_or_empty(
        "working tree",
        vcs.diff_snapshot_to_working_tree(head, true),
    );

    let historical = match vcs.parent_of(head) {
        Ok(Some(parent)) => renames_or_empty("last commit", vcs.diff_snapshots(parent, head, true)),
        Ok(None) => RenameSet::new(),
        Err(e) => {
            log::warn!("Couldn't read parent of {}: {}", head, e);
            RenameSet::new()
        }
    };

    (historical, working_tree)
}

fn renames_or_empty(pass: &str, entries: Res<Vec<DiffEntry>>) -> RenameSet {
    match entries {
        Ok(entries) => RenameSet::from_diff(&entries),
        Err(e) => {
            log::warn!("Rename detection in {} failed: {}", pass, e);
            RenameSet::new()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    /// Changed in the index or the working tree.
    pub modified: PathSet,
    pub added: PathSet,
    pub removed: PathSet,
    pub untracked: PathSet,
    pub missing: PathSet,
    pub conflicting: PathSet,
    pub all_tracked: PathSet,
    pub latest_commit: Option<CommitInfo>,
}

impl StatusSummary {
    pub fn has_changes(&self) -> bool {
        !self.modified.is_empty()
            || !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.untracked.is_empty()
            || !self.missing.is_empty()
    }
}

impl From<RawStatus> for StatusSummary {
    fn from(raw: RawStatus) -> Self {
        Self {
            modified: raw.modified.union(&raw.changed),
            added: raw.added,
            removed: raw.removed,
            untracked: raw.untracked,
            missing: raw.missing,
            conflicting: raw.conflicting,
            all_tracked: PathSet::new(),
            latest_commit: None,
        }
    }
}

/// Plain status without rename reconciliation, plus the tracked files and
/// the latest commit. Unlike [`classify`], failures are returned.
pub fn summarize(vcs: &dyn VersionControl) -> Res<StatusSummary> {
    let mut summary = StatusSummary::from(vcs.raw_status()?);
    summary.all_tracked = vcs.tracked_files()?.into_iter().collect();
    summary.latest_commit = vcs.latest_commit()?;
    Ok(summary)
}
