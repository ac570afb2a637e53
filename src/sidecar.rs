//! The sidecar file: a small `key=value` file at the root of the working
//! tree holding what this tool remembers about the repository.
//!
//! ```text
//! # vgl configuration
//! local.dir=/home/me/project
//! local.branch=main
//! ```
//!
//! Blank lines and lines starting with `#` or `!` are ignored when reading.
//! Backslash escapes (`\n`, `\\`, `\=`, `\ ` ...) keep awkward keys and
//! values intact across a save and load. Saving
//! always replaces the whole file, writing a temporary file next to it first
//! and renaming it into place.

use crate::{Res, config::Settings, error::Error};
use itertools::Itertools;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const KEY_LOCAL_DIR: &str = "local.dir";
pub const KEY_LOCAL_BRANCH: &str = "local.branch";
pub const KEY_REMOTE_URL: &str = "remote.url";
pub const KEY_REMOTE_BRANCH: &str = "remote.branch";
pub const KEY_TRACKED_FILES: &str = "tracked.files";
pub const KEY_UNTRACKED_FILES: &str = "untracked.files";

const HEADER: &str = "# vgl configuration";

/// Ordered key/value pairs, kept in insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SidecarConfig {
    entries: Vec<(String, String)>,
}

impl SidecarConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> Self {
        let mut config = Self::new();
        for line in content.lines().map(str::trim_start) {
            if line.is_empty() || line.starts_with(['#', '!']) {
                continue;
            }
            match split_entry(line) {
                Some((key, value)) => config.set(unescape(key), unescape(value)),
                None => log::debug!("Skipping sidecar line without '=': {:?}", line),
            }
        }
        config
    }

    /// Keys and values are escaped so that `parse` gives back exactly the
    /// same entries.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for (key, value) in &self.entries {
            escape_into(&mut out, key, true);
            out.push('=');
            escape_into(&mut out, value, false);
            out.push('\n');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replaces the value in place if the key exists, otherwise appends.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn local_dir(&self) -> Option<&str> {
        self.get(KEY_LOCAL_DIR)
    }

    pub fn local_branch(&self) -> Option<&str> {
        self.get(KEY_LOCAL_BRANCH)
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.get(KEY_REMOTE_URL).filter(|url| !url.is_empty())
    }

    pub fn remote_branch(&self) -> Option<&str> {
        self.get(KEY_REMOTE_BRANCH).filter(|branch| !branch.is_empty())
    }

    /// Comma separated repo-relative paths stored under `key`.
    pub fn path_set(&self, key: &str) -> Vec<String> {
        self.get(key)
            .unwrap_or("")
            .split(',')
            .map(normalize_repo_relative_path)
            .filter(|path| !path.is_empty())
            .unique()
            .collect()
    }

    /// An empty set removes the key.
    pub fn set_path_set<S: AsRef<str>>(&mut self, key: &str, paths: &[S]) {
        let joined = paths
            .iter()
            .map(|p| normalize_repo_relative_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .unique()
            .join(",");

        if joined.is_empty() {
            self.remove(key);
        } else {
            self.set(key, joined);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SidecarConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.set(key, value);
        }
        config
    }
}

/// Splits at the first `=` that isn't escaped and trims both halves.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => {
                return Some((trim_unescaped(&line[..i]), trim_unescaped(&line[i + 1..])));
            }
            _ => {}
        }
    }
    None
}

/// Trims surrounding whitespace but keeps a trailing one escaped by `\`.
fn trim_unescaped(s: &str) -> &str {
    let s = s.trim_start();
    let trimmed = s.trim_end();
    let backslashes = trimmed.len() - trimmed.trim_end_matches('\\').len();

    match s[trimmed.len()..].chars().next() {
        Some(kept) if backslashes % 2 == 1 => &s[..trimmed.len() + kept.len_utf8()],
        _ => trimmed,
    }
}

fn escape_into(out: &mut String, text: &str, is_key: bool) {
    let last = text.chars().count().saturating_sub(1);
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' if is_key => out.push_str("\\="),
            '#' | '!' if is_key && i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_whitespace() && (is_key || i == 0 || i == last) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub fn sidecar_path(root: &Path, settings: &Settings) -> PathBuf {
    root.join(&settings.sidecar.file_name)
}

/// Never fails: a missing or unreadable sidecar reads as empty.
pub fn load(root: &Path, settings: &Settings) -> SidecarConfig {
    let path = sidecar_path(root, settings);
    match read_optional(&path) {
        Ok(Some(content)) => SidecarConfig::parse(&content),
        Ok(None) => SidecarConfig::new(),
        Err(e) => {
            log::warn!("{}", e);
            SidecarConfig::new()
        }
    }
}

pub fn save(root: &Path, settings: &Settings, config: &SidecarConfig) -> Res<()> {
    let path = sidecar_path(root, settings);
    log::debug!("Saving {} sidecar entries to {:?}", config.len(), path);
    write_atomic(&path, &config.render())
}

/// Records where the repository lives and which branch it starts on. An
/// existing branch entry is kept.
pub fn init_sidecar(root: &Path, settings: &Settings, branch: &str) -> Res<SidecarConfig> {
    let mut config = load(root, settings);

    let abs_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    config.set(KEY_LOCAL_DIR, abs_root.to_string_lossy());
    if config.local_branch().is_none() {
        config.set(KEY_LOCAL_BRANCH, branch);
    }

    save(root, settings, &config)?;
    Ok(config)
}

/// Appends any of `names` missing from the root `.gitignore`.
pub fn ensure_ignored(root: &Path, names: &[&str]) -> Res<()> {
    let path = root.join(".gitignore");
    let content = read_optional(&path)?.unwrap_or_default();

    let missing = names
        .iter()
        .filter(|name| !content.lines().any(|line| line.trim() == **name))
        .collect::<Vec<_>>();

    if missing.is_empty() {
        return Ok(());
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    for name in missing {
        updated.push_str(name);
        updated.push('\n');
    }

    write_atomic(&path, &updated)
}

pub fn normalize_repo_relative_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    if normalized == "." {
        return String::new();
    }
    match normalized.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => normalized,
    }
}

pub(crate) fn read_optional(path: &Path) -> Res<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::ReadFile(path.to_path_buf(), e)),
    }
}

/// Writes `<path>.tmp` and renames it over `path`. Falls back to writing
/// `path` directly when the rename can't be done.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Res<()> {
    let tmp = tmp_path(path);
    if let Some(dir) = tmp.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::WriteFile(dir.to_path_buf(), e))?;
    }
    fs::write(&tmp, contents).map_err(|e| Error::WriteFile(tmp.clone(), e))?;

    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(e) => overwrite_in_place(path, &tmp, contents, e),
    }
}

/// Non-atomic fallback of [`write_atomic`]: writes `path` directly and drops
/// the temporary file either way.
fn overwrite_in_place(path: &Path, tmp: &Path, contents: &str, rename_err: io::Error) -> Res<()> {
    log::warn!(
        "Couldn't rename {:?} over {:?} ({}), overwriting in place",
        tmp,
        path,
        rename_err
    );

    let written = fs::write(path, contents).map_err(|e| Error::WriteFile(path.to_path_buf(), e));
    if let Err(e) = fs::remove_file(tmp) {
        log::debug!("Couldn't remove {:?}: {}", tmp, e);
    }
    written
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
