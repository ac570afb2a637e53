use crate::{Res, config::Settings, error::Error};
use git2::{self, DiffFindOptions, DiffOptions, Repository, StatusOptions};

pub(crate) fn status(repo: &Repository, settings: &Settings) -> Res<StatusOptions> {
    let mut opts = StatusOptions::new();

    let show_untracked = repo
        .config()
        .map_err(Error::GitStatus)?
        .get_bool("status.showUntrackedFiles")
        .ok()
        .unwrap_or(settings.status.show_untracked);

    opts.include_untracked(show_untracked)
        .recurse_untracked_dirs(show_untracked)
        .include_ignored(true)
        .recurse_ignored_dirs(false)
        .exclude_submodules(true);

    Ok(opts)
}

/// Every non-ignored file, unmodified ones included.
pub(crate) fn all_files(_repo: &Repository) -> Res<StatusOptions> {
    let mut opts = StatusOptions::new();
    opts.include_unmodified(true)
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .exclude_submodules(true);
    Ok(opts)
}

pub(crate) fn diff(_repo: &Repository) -> Res<DiffOptions> {
    Ok(DiffOptions::new())
}

pub(crate) fn diff_workdir(repo: &Repository) -> Res<DiffOptions> {
    let mut opts = diff(repo)?;
    opts.include_untracked(true).recurse_untracked_dirs(true);
    Ok(opts)
}

pub(crate) fn find_renames(settings: &Settings) -> DiffFindOptions {
    let mut opts = DiffFindOptions::new();
    opts.renames(true)
        .for_untracked(true)
        .rename_threshold(settings.renames.threshold);
    opts
}
