//! Files the user hasn't yet chosen to track or ignore.
//!
//! The list is stored next to the main sidecar file, one repo-relative path
//! per line. Lines starting with `#` and blank lines are skipped on read.

use crate::{
    Res,
    config::Settings,
    git::{RawStatus, VersionControl},
    nested,
    path_set::PathSet,
    rename::{self, Reconciled},
    sidecar::{normalize_repo_relative_path, read_optional, write_atomic},
    status,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UndecidedFileList {
    paths: PathSet,
}

impl UndecidedFileList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(normalize_repo_relative_path)
            .filter(|path| !path.is_empty())
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("# vgl undecided files\n");
        for path in &self.paths {
            out.push_str(path);
            out.push('\n');
        }
        out
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Drops `path` once it has been decided on. Returns whether it was listed.
    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.paths.len();
        self.paths.retain(|listed| listed != path);
        self.paths.len() != before
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for UndecidedFileList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter
                .into_iter()
                .map(|path| normalize_repo_relative_path(path.as_ref()))
                .filter(|path| !path.is_empty())
                .collect(),
        }
    }
}

pub fn undecided_path(root: &Path, settings: &Settings) -> PathBuf {
    root.join(&settings.sidecar.undecided_file_name)
}

/// A missing or unreadable list reads as empty.
pub fn load(root: &Path, settings: &Settings) -> UndecidedFileList {
    let path = undecided_path(root, settings);
    match read_optional(&path) {
        Ok(Some(content)) => UndecidedFileList::parse(&content),
        Ok(None) => UndecidedFileList::new(),
        Err(e) => {
            log::warn!("{}", e);
            UndecidedFileList::new()
        }
    }
}

pub fn save(root: &Path, settings: &Settings, list: &UndecidedFileList) -> Res<()> {
    let path = undecided_path(root, settings);
    log::debug!("Saving {} undecided files to {:?}", list.len(), path);
    write_atomic(&path, &list.render())
}

/// Untracked, non-ignored files that aren't the target of a detected rename.
///
/// Without a raw status every non-ignored file is a candidate. Sidecar files
/// and anything inside a nested repository are never undecided.
pub fn compute_undecided(
    vcs: &dyn VersionControl,
    raw: Option<&RawStatus>,
    reconciled: &Reconciled,
    nested: &PathSet,
) -> Res<UndecidedFileList> {
    let candidates: Vec<String> = match raw {
        Some(raw) => raw
            .untracked
            .iter()
            .filter(|path| !raw.ignored_not_in_index.contains(path))
            .map(str::to_string)
            .collect(),
        None => vcs.list_non_ignored_files()?,
    };

    let sidecar_files = vcs.settings().sidecar_files();

    Ok(candidates
        .into_iter()
        .filter(|path| !sidecar_files.contains(&path.as_str()))
        .filter(|path| !reconciled.rename_targets.contains(path))
        .filter(|path| !nested::is_under_any(path, nested))
        .collect())
}

/// Recomputes the undecided list from the working tree and saves it.
pub fn refresh(vcs: &dyn VersionControl) -> Res<UndecidedFileList> {
    let root = vcs.workdir()?;
    let settings = vcs.settings();

    let raw = match vcs.raw_status() {
        Ok(raw) => Some(raw),
        Err(e) => {
            log::warn!("Couldn't read status, treating all files as undecided: {}", e);
            None
        }
    };

    let (historical, working_tree) = status::detect_renames(vcs);
    let reconciled = match &raw {
        Some(raw) => rename::reconcile(
            &historical,
            &working_tree,
            &raw.added,
            &raw.removed.union(&raw.missing),
        ),
        None => rename::reconcile(&historical, &working_tree, &PathSet::new(), &PathSet::new()),
    };

    let nested = nested::list_nested_repos(&root, settings)?;
    let list = compute_undecided(vcs, raw.as_ref(), &reconciled, &nested)?;

    save(&root, settings, &list)?;
    Ok(list)
}
