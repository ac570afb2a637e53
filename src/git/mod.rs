//! The version-control collaborator: everything this crate needs to know
//! about snapshots, diffs and raw status, behind [`VersionControl`].

use crate::{Res, config::Settings, error::Error, git2_opts, open_repo};
use git2::{Diff, ErrorCode, Oid, Repository, Tree};
use std::{
    fmt,
    path::{Path, PathBuf},
};

pub mod diff;
pub mod status;

pub use diff::{ChangeType, DiffEntry};
pub use status::RawStatus;

/// Identifier of one recorded snapshot (a commit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Snapshot(pub Oid);

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hash = self.0.to_string();
        f.write_str(&hash[..7.min(hash.len())])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub short_hash: String,
    pub message: String,
    pub date: chrono::DateTime<chrono::FixedOffset>,
}

pub trait VersionControl {
    fn settings(&self) -> &Settings;

    fn workdir(&self) -> Res<PathBuf>;

    /// `Ok(None)` when the name doesn't resolve, e.g. HEAD of an empty repository.
    fn resolve_reference(&self, name: &str) -> Res<Option<Snapshot>>;

    /// First parent, `Ok(None)` for a root commit.
    fn parent_of(&self, snapshot: Snapshot) -> Res<Option<Snapshot>>;

    fn diff_snapshots(
        &self,
        old: Snapshot,
        new: Snapshot,
        detect_renames: bool,
    ) -> Res<Vec<DiffEntry>>;

    /// Compares a snapshot against the working tree, untracked files included.
    fn diff_snapshot_to_working_tree(
        &self,
        snapshot: Snapshot,
        detect_renames: bool,
    ) -> Res<Vec<DiffEntry>>;

    fn raw_status(&self) -> Res<RawStatus>;

    /// Every file on disk below the working tree root that isn't ignored,
    /// tracked or not.
    fn list_non_ignored_files(&self) -> Res<Vec<String>>;

    /// Paths recorded in the index.
    fn tracked_files(&self) -> Res<Vec<String>>;

    fn latest_commit(&self) -> Res<Option<CommitInfo>>;
}

/// [`VersionControl`] backed by libgit2.
pub struct Git {
    repo: Repository,
    settings: Settings,
}

impl Git {
    pub fn new(repo: Repository, settings: Settings) -> Self {
        Self { repo, settings }
    }

    pub fn open(dir: &Path, settings: Settings) -> Res<Self> {
        Ok(Self::new(open_repo(dir)?, settings))
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    fn tree(&self, snapshot: Snapshot) -> Res<Tree<'_>> {
        self.repo
            .find_commit(snapshot.0)
            .and_then(|commit| commit.tree())
            .map_err(Error::ReadCommit)
    }

    fn entries(&self, mut diff: Diff<'_>, detect_renames: bool) -> Res<Vec<DiffEntry>> {
        if detect_renames {
            let mut find_opts = git2_opts::find_renames(&self.settings);
            diff.find_similar(Some(&mut find_opts))
                .map_err(Error::GitDiff)?;
        }

        Ok(diff
            .deltas()
            .filter_map(|delta| {
                let change = ChangeType::from_delta(delta.status())?;
                let old_path = delta.old_file().path().or(delta.new_file().path())?;
                let new_path = delta.new_file().path().unwrap_or(old_path);
                Some(DiffEntry::new(
                    path_string(old_path),
                    path_string(new_path),
                    change,
                ))
            })
            .collect())
    }
}

impl VersionControl for Git {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn workdir(&self) -> Res<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or(Error::NoRepoWorkdir)
    }

    fn resolve_reference(&self, name: &str) -> Res<Option<Snapshot>> {
        match self.repo.revparse_single(name) {
            Ok(object) => {
                let commit = object
                    .peel_to_commit()
                    .map_err(Error::ResolveReference)?;
                Ok(Some(Snapshot(commit.id())))
            }
            Err(e) if matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch) => {
                Ok(None)
            }
            Err(e) => Err(Error::ResolveReference(e)),
        }
    }

    fn parent_of(&self, snapshot: Snapshot) -> Res<Option<Snapshot>> {
        let commit = self
            .repo
            .find_commit(snapshot.0)
            .map_err(Error::ReadCommit)?;

        if commit.parent_count() == 0 {
            return Ok(None);
        }

        let parent = commit.parent_id(0).map_err(Error::ReadCommit)?;
        Ok(Some(Snapshot(parent)))
    }

    fn diff_snapshots(
        &self,
        old: Snapshot,
        new: Snapshot,
        detect_renames: bool,
    ) -> Res<Vec<DiffEntry>> {
        let old_tree = self.tree(old)?;
        let new_tree = self.tree(new)?;
        let mut opts = git2_opts::diff(&self.repo)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut opts))
            .map_err(Error::GitDiff)?;

        self.entries(diff, detect_renames)
    }

    fn diff_snapshot_to_working_tree(
        &self,
        snapshot: Snapshot,
        detect_renames: bool,
    ) -> Res<Vec<DiffEntry>> {
        let tree = self.tree(snapshot)?;
        let mut opts = git2_opts::diff_workdir(&self.repo)?;

        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))
            .map_err(Error::GitDiff)?;

        self.entries(diff, detect_renames)
    }

    fn raw_status(&self) -> Res<RawStatus> {
        let mut opts = git2_opts::status(&self.repo, &self.settings)?;
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(Error::GitStatus)?;

        let mut raw = RawStatus::default();
        for entry in statuses.iter() {
            let path = String::from_utf8_lossy(entry.path_bytes());
            raw.record(path.trim_end_matches('/'), entry.status());
        }

        Ok(raw)
    }

    fn list_non_ignored_files(&self) -> Res<Vec<String>> {
        let mut opts = git2_opts::all_files(&self.repo)?;
        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(Error::GitStatus)?;

        Ok(statuses
            .iter()
            .filter(|entry| is_on_disk(entry.status()))
            .map(|entry| String::from_utf8_lossy(entry.path_bytes()).into_owned())
            .filter(|path| !path.ends_with('/'))
            .collect())
    }

    fn tracked_files(&self) -> Res<Vec<String>> {
        let index = self.repo.index().map_err(Error::ReadIndex)?;
        Ok(index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .collect())
    }

    fn latest_commit(&self) -> Res<Option<CommitInfo>> {
        let Some(head) = self.resolve_reference("HEAD")? else {
            return Ok(None);
        };
        let commit = self.repo.find_commit(head.0).map_err(Error::ReadCommit)?;

        let when = commit.time();
        let Some(date) = chrono::FixedOffset::east_opt(when.offset_minutes() * 60).and_then(
            |offset| {
                chrono::DateTime::from_timestamp(when.seconds(), 0)
                    .map(|utc| utc.with_timezone(&offset))
            },
        ) else {
            log::warn!("Commit {} has an out of range timestamp", head);
            return Ok(None);
        };

        Ok(Some(CommitInfo {
            short_hash: head.to_string(),
            message: commit.summary().unwrap_or("").to_string(),
            date,
        }))
    }
}

/// A file shows up in the working tree unless it's only known to HEAD or the index.
fn is_on_disk(status: git2::Status) -> bool {
    use git2::Status;

    if status.intersects(Status::WT_DELETED) {
        return false;
    }
    !(status.intersects(Status::INDEX_DELETED) && !status.intersects(Status::WT_NEW))
}

pub(crate) fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
