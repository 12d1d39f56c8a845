// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persistent application configuration.
//!
//! Stored as a small JSON object in the working directory and read on
//! startup to reopen the last folder.

use super::error::{LabelerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "config_path.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub last_open_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load the config, falling back to defaults if it is missing or corrupt.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => config,
            Err(LabelerError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| LabelerError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(|e| LabelerError::io(path, e))?;
        Ok(())
    }

    /// Folder to open on startup: the remembered one if it still exists.
    pub fn startup_dir(&self) -> Option<&Path> {
        self.last_open_dir.as_deref().filter(|dir| dir.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = AppConfig {
            last_open_dir: Some(dir.path().to_path_buf()),
        };
        config.save(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.starts_with("{\"last_open_dir\":"));
        assert_eq!(AppConfig::load(&path), config);
        assert_eq!(config.startup_dir(), Some(dir.path()));
    }

    #[test]
    fn test_missing_or_corrupt_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(AppConfig::load(&path), AppConfig::default());

        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());

        std::fs::write(&path, "{}").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn test_vanished_folder_is_not_reopened() {
        let config = AppConfig {
            last_open_dir: Some(PathBuf::from("/definitely/not/here")),
        };
        assert_eq!(config.startup_dir(), None);
    }
}
