//! Repositories living inside the working tree of another one.

use crate::{Res, config::Settings, error::Error, git::path_string, path_set::PathSet};
use std::path::Path;
use walkdir::WalkDir;

/// Repo-relative paths of every directory below `root` that has its own
/// metadata directory. `root` itself is never included.
pub fn list_nested_repos(root: &Path, settings: &Settings) -> Res<PathSet> {
    let metadata_dir = settings.repository.metadata_dir.as_str();
    let mut nested = PathSet::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != metadata_dir);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(Error::WalkDir(e)),
            Err(e) => {
                log::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }

        if entry.path().join(metadata_dir).exists() {
            if let Ok(rel) = entry.path().strip_prefix(root) {
                log::debug!("Found nested repository {:?}", rel);
                nested.insert(path_string(rel));
            }
        }
    }

    Ok(nested)
}

/// Whether `path`, or any directory between it and `root`, is a repository
/// root of its own. Relative paths are taken relative to `root`.
///
/// This is the single-path form of the check. [`crate::glob::expand`] filters
/// many candidates at once, so it lists the nested roots once with
/// [`list_nested_repos`] and tests each path with [`is_under_any`].
pub fn is_inside_nested_repo(root: &Path, path: &Path, settings: &Settings) -> bool {
    let path = root.join(path);
    let metadata_dir = settings.repository.metadata_dir.as_str();

    path.ancestors()
        .take_while(|dir| dir.starts_with(root) && *dir != root)
        .any(|dir| dir.join(metadata_dir).exists())
}

/// Whether the repo-relative `path` is one of `nested` or lies below one.
pub fn is_under_any(path: &str, nested: &PathSet) -> bool {
    nested.iter().any(|repo| {
        path == repo
            || path
                .strip_prefix(repo)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}
