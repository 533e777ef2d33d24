//! Restore settings with hierarchical resolution
//!
//! Settings come from `restore.toml` files. The resolver merges them in
//! order, later layers overriding earlier ones:
//!
//! 1. User settings (`<config_dir>/restore-graph/restore.toml`)
//! 2. Every `restore.toml` from the filesystem root down to the project
//!    directory
//!
//! Scalars are replaced by later layers; folder and source lists are
//! extended, keeping the first occurrence of each entry. Relative folder
//! paths are resolved against the directory of the file that names them.

use restore_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::Result;

/// Name of a settings file at any layer.
pub const SETTINGS_FILE_NAME: &str = "restore.toml";

/// Environment variable overriding the global packages folder.
pub const PACKAGES_ENV: &str = "RESTORE_PACKAGES";

/// Restores run concurrently when settings do not say otherwise.
pub const DEFAULT_MAX_PARALLELISM: usize = 16;

/// One layer of settings, or the merge of several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub global_packages_folder: Option<String>,
    pub fallback_folders: Vec<String>,
    pub sources: Vec<String>,
    pub max_parallelism: Option<usize>,
}

impl Settings {
    /// Overlay `other` onto `self`.
    pub fn merge(&mut self, other: &Settings) {
        if other.global_packages_folder.is_some() {
            self.global_packages_folder = other.global_packages_folder.clone();
        }
        if other.max_parallelism.is_some() {
            self.max_parallelism = other.max_parallelism;
        }
        extend_unique(&mut self.fallback_folders, &other.fallback_folders);
        extend_unique(&mut self.sources, &other.sources);
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_PARALLELISM)
    }

    /// Make relative folder paths absolute against `base`.
    fn anchored_at(mut self, base: &NormalizedPath) -> Self {
        self.global_packages_folder = self
            .global_packages_folder
            .map(|folder| anchor(base, &folder).as_str().to_string());
        self.fallback_folders = self
            .fallback_folders
            .iter()
            .map(|folder| anchor(base, folder).as_str().to_string())
            .collect();
        self
    }
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

fn anchor(base: &NormalizedPath, path: &str) -> NormalizedPath {
    let path = NormalizedPath::new(path);
    if path.is_absolute() {
        path
    } else {
        base.join(path.as_str())
    }
}

/// Resolves settings for a project directory into effective values.
pub trait SettingsResolver: Send + Sync {
    /// Merged settings that apply to `root`.
    fn load_settings(&self, root: &NormalizedPath) -> Result<Settings>;

    fn effective_global_folder(&self, root: &NormalizedPath, settings: &Settings)
    -> NormalizedPath;

    fn effective_fallback_folders(
        &self,
        root: &NormalizedPath,
        settings: &Settings,
    ) -> Vec<NormalizedPath>;

    fn effective_sources(&self, settings: &Settings) -> Vec<String>;
}

/// Reads layered `restore.toml` files from disk.
#[derive(Debug, Clone)]
pub struct FileSettingsResolver {
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
    environment_packages: Option<String>,
}

impl Default for FileSettingsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSettingsResolver {
    /// Resolver over the user's config directory and the process environment.
    pub fn new() -> Self {
        Self {
            global_config_dir_override: None,
            environment_packages: std::env::var(PACKAGES_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }

    /// Use `global_config_dir` instead of the platform config directory.
    pub fn with_global_config_dir(mut self, global_config_dir: PathBuf) -> Self {
        self.global_config_dir_override = Some(global_config_dir);
        self
    }

    /// Replace the value read from `RESTORE_PACKAGES`.
    pub fn with_environment_packages(mut self, folder: Option<String>) -> Self {
        self.environment_packages = folder;
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("restore-graph"))
    }

    fn load_layer(&self, settings: &mut Settings, dir: &NormalizedPath) -> Result<()> {
        let path = dir.join(SETTINGS_FILE_NAME);
        if !path.is_file() {
            return Ok(());
        }

        tracing::debug!(path = %path, "loading settings layer");
        let layer: Settings = ConfigStore::new().load(&path)?;
        settings.merge(&layer.anchored_at(dir));
        Ok(())
    }
}

impl SettingsResolver for FileSettingsResolver {
    fn load_settings(&self, root: &NormalizedPath) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(global_dir) = self.global_config_dir() {
            self.load_layer(&mut settings, &NormalizedPath::new(global_dir))?;
        }

        for dir in ancestors_from_root(&root.full_path()) {
            self.load_layer(&mut settings, &dir)?;
        }

        Ok(settings)
    }

    fn effective_global_folder(
        &self,
        root: &NormalizedPath,
        settings: &Settings,
    ) -> NormalizedPath {
        if let Some(folder) = &self.environment_packages {
            return anchor(root, folder);
        }
        if let Some(folder) = &settings.global_packages_folder {
            return anchor(root, folder);
        }

        match dirs::home_dir() {
            Some(home) => NormalizedPath::new(home).join(".restore/packages"),
            None => root.join(".restore/packages"),
        }
    }

    fn effective_fallback_folders(
        &self,
        root: &NormalizedPath,
        settings: &Settings,
    ) -> Vec<NormalizedPath> {
        let mut seen = HashSet::new();
        settings
            .fallback_folders
            .iter()
            .map(|folder| anchor(root, folder))
            .filter(|folder| seen.insert(folder.case_key()))
            .collect()
    }

    fn effective_sources(&self, settings: &Settings) -> Vec<String> {
        let mut seen = HashSet::new();
        settings
            .sources
            .iter()
            .map(|source| source.trim().to_string())
            .filter(|source| !source.is_empty() && seen.insert(source.to_lowercase()))
            .collect()
    }
}

/// `dir` and its ancestors, outermost first.
fn ancestors_from_root(dir: &NormalizedPath) -> Vec<NormalizedPath> {
    let mut chain = vec![dir.clone()];
    let mut current = dir.clone();
    while let Some(parent) = current.parent() {
        chain.push(parent.clone());
        current = parent;
    }
    chain.reverse();
    chain
}
