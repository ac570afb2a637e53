//! Expansion of user supplied patterns into concrete repo-relative files.
//!
//! Patterns are tried in this order:
//! - `*` and `.` select every candidate.
//! - A pattern naming an existing directory selects everything below it,
//!   even if the name happens to contain glob characters.
//! - A bare file name (no `/`, no wildcard) selects that name anywhere.
//! - Anything else is a glob where `*` stays within one path segment and
//!   `**` crosses segments.
//!
//! Candidates are the non-ignored files reported by the repository, minus
//! files inside nested repositories, the metadata directory and the sidecar
//! files.

use crate::{
    Res,
    config::Settings,
    git::VersionControl,
    nested,
    path_set::PathSet,
    sidecar::normalize_repo_relative_path,
};
use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

#[derive(Debug)]
enum Selector {
    All,
    Dir(String),
    Basename(String),
    Glob(GlobMatcher),
}

impl Selector {
    fn parse(pattern: &str, root: &Path) -> Result<Self, globset::Error> {
        if pattern == "*" || pattern == "." {
            return Ok(Selector::All);
        }

        let rel = normalize_repo_relative_path(pattern);
        if rel.is_empty() {
            return Ok(Selector::All);
        }

        let escapes_root = rel.split('/').any(|segment| segment == "..");
        if !escapes_root && root.join(&rel).is_dir() {
            return Ok(Selector::Dir(rel.trim_end_matches('/').to_string()));
        }

        if !rel.contains('/') && !has_wildcard(&rel) {
            return Ok(Selector::Basename(rel));
        }

        let matcher = GlobBuilder::new(&rel)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        Ok(Selector::Glob(matcher))
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Dir(dir) => path
                .strip_prefix(dir.as_str())
                .is_some_and(|rest| rest.starts_with('/')),
            Selector::Basename(name) => {
                path == name
                    || path
                        .strip_suffix(name.as_str())
                        .is_some_and(|rest| rest.ends_with('/'))
            }
            Selector::Glob(matcher) => matcher.is_match(path),
        }
    }
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Expands `patterns` against the working tree of `vcs`.
///
/// The candidate list and the nested repositories are looked up once per
/// call. A pattern that fails to compile is skipped, the others still
/// contribute. The result holds each path once, in order of first match.
pub fn expand<S: AsRef<str>>(vcs: &dyn VersionControl, patterns: &[S]) -> Res<PathSet> {
    let root = vcs.workdir()?;
    let settings = vcs.settings();

    let files = vcs.list_non_ignored_files()?;
    let nested = nested::list_nested_repos(&root, settings)?;

    let candidates = files
        .iter()
        .map(String::as_str)
        .filter(|path| !is_excluded(path, &nested, settings))
        .collect::<Vec<_>>();

    let mut out = PathSet::new();
    for pattern in patterns.iter().map(|p| p.as_ref().trim()) {
        if pattern.is_empty() {
            continue;
        }

        let selector = match Selector::parse(pattern, &root) {
            Ok(selector) => selector,
            Err(e) => {
                log::warn!("Skipping pattern {:?}: {}", pattern, e);
                continue;
            }
        };

        out.extend(
            candidates
                .iter()
                .copied()
                .filter(|path| selector.matches(path)),
        );
    }

    log::debug!("{} patterns expanded to {} files", patterns.len(), out.len());
    Ok(out)
}

fn is_excluded(path: &str, nested: &PathSet, settings: &Settings) -> bool {
    let metadata_dir = settings.repository.metadata_dir.as_str();

    path.split('/').any(|segment| segment == metadata_dir)
        || settings.sidecar_files().contains(&path)
        || nested::is_under_any(path, nested)
}
