use crate::{APP_NAME, Res};
use etcetera::BaseStrategy;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
const ENV_PREFIX: &str = "VGL_";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub sidecar: SidecarSettings,
    pub repository: RepositorySettings,
    pub renames: RenameSettings,
    pub status: StatusSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SidecarSettings {
    pub file_name: String,
    pub undecided_file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositorySettings {
    /// Entry whose presence makes a directory a repository root.
    pub metadata_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameSettings {
    pub detect: bool,
    pub threshold: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusSettings {
    pub show_untracked: bool,
}

impl Default for Settings {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("Failed to parse default_config.toml")
    }
}

impl Settings {
    /// Names of files at the tree root owned by this crate rather than the user.
    pub fn sidecar_files(&self) -> [&str; 2] {
        [&self.sidecar.file_name, &self.sidecar.undecided_file_name]
    }
}

pub fn config_path() -> Option<PathBuf> {
    etcetera::choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join(APP_NAME).join("config.toml"))
}

pub fn init_config() -> Res<Settings> {
    init_config_from(config_path().as_deref())
}

pub fn init_config_from(path: Option<&Path>) -> Res<Settings> {
    let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

    if let Some(path) = path {
        log::debug!("Reading config from {:?}", path);
        figment = figment.merge(Toml::file(path));
    }

    let settings = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    Ok(settings)
}
