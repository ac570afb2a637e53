//! Rename-aware status classification for a working directory tracked by git.
//!
//! The entry point is [`status::classify`], which turns the raw status and two
//! rename-detection passes of a [`git::VersionControl`] into a single
//! [`status::StatusModel`]. The remaining modules feed file selection and the
//! small sidecar files kept at the root of the working tree.

pub mod config;
pub mod error;
pub mod filter;
pub mod git;
mod git2_opts;
pub mod glob;
pub mod nested;
pub mod path_set;
pub mod rename;
pub mod sidecar;
pub mod status;
pub mod undecided;

#[cfg(test)]
mod tests;

use error::Error;
use git2::Repository;
use std::path::Path;

const APP_NAME: &str = "vgl";

pub type Res<T> = Result<T, Error>;

pub fn open_repo(dir: &Path) -> Res<Repository> {
    log::debug!("Opening repo");
    let repo = Repository::open(dir).map_err(Error::OpenRepo)?;
    if repo.workdir().is_none() {
        return Err(Error::NoRepoWorkdir);
    }
    Ok(repo)
}
