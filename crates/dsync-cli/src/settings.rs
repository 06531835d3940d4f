//! TOML settings file.
//!
//! ```toml
//! [hub]
//! max_upload_bytes = 10485760
//! max_export_bytes = 52428800
//! fetch_timeout_secs = 15
//!
//! [storage]
//! dir = "/var/lib/dsync"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dsync_core::HubConfig;
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.toml";

/// Settings for one `dsync` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hub: HubConfig,
    pub storage: StorageSettings,
}

/// Where datasets are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Store root. Falls back to the platform data directory.
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        match Self::config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Default settings file in the platform config directory.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "dsync", "dsync")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Store root: the `--store` flag, then `[storage] dir`, then the
    /// platform data directory, then `./dsync-data`.
    pub fn store_dir(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(dir) = flag {
            return dir.to_path_buf();
        }
        if let Some(dir) = &self.storage.dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("dev", "dsync", "dsync")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("dsync-data"))
    }
}
