use std::{fmt::Display, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    OpenRepo(git2::Error),
    NoRepoWorkdir,
    GitStatus(git2::Error),
    GitDiff(git2::Error),
    ResolveReference(git2::Error),
    ReadIndex(git2::Error),
    ReadCommit(git2::Error),
    ReadFile(PathBuf, io::Error),
    WriteFile(PathBuf, io::Error),
    WalkDir(walkdir::Error),
    Config(Box<figment::Error>),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenRepo(e)
            | Error::GitStatus(e)
            | Error::GitDiff(e)
            | Error::ResolveReference(e)
            | Error::ReadIndex(e)
            | Error::ReadCommit(e) => Some(e),
            Error::ReadFile(_, e) | Error::WriteFile(_, e) => Some(e),
            Error::WalkDir(e) => Some(e),
            Error::Config(e) => Some(e.as_ref()),
            Error::NoRepoWorkdir => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OpenRepo(e) => match e.code() {
                git2::ErrorCode::NotFound => f.write_str("No .git found in the current directory"),
                _ => f.write_fmt(format_args!("Couldn't open repo: {e:?}")),
            },
            Error::NoRepoWorkdir => f.write_str("No repository working directory"),
            Error::GitStatus(e) => f.write_fmt(format_args!("Git status error: {}", e)),
            Error::GitDiff(e) => f.write_fmt(format_args!("Git diff error: {}", e)),
            Error::ResolveReference(e) => {
                f.write_fmt(format_args!("Couldn't resolve reference: {}", e))
            }
            Error::ReadIndex(e) => f.write_fmt(format_args!("Couldn't read index: {}", e)),
            Error::ReadCommit(e) => f.write_fmt(format_args!("Couldn't read commit: {}", e)),
            Error::ReadFile(path, e) => {
                f.write_fmt(format_args!("Couldn't read {}: {}", path.display(), e))
            }
            Error::WriteFile(path, e) => {
                f.write_fmt(format_args!("Couldn't write {}: {}", path.display(), e))
            }
            Error::WalkDir(e) => f.write_fmt(format_args!("Couldn't walk directory: {}", e)),
            Error::Config(e) => f.write_fmt(format_args!("Configuration error: {}", e)),
        }
    }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Error::Config(Box::new(e))
    }
}
