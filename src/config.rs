// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! User configuration loaded from `config.toml` in the platform config directory.
//!
//! Every field is optional in the file; missing fields take their defaults and
//! a malformed file falls back to defaults entirely.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Application settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides the directory holding the stamp collection.
    pub data_dir: Option<PathBuf>,
    /// Ask before deleting a stamp.
    pub confirm_delete: bool,
    /// How long a tile shows the "copied" state, in milliseconds.
    pub copied_feedback_ms: u64,
    /// Toast notification lifetime, in milliseconds.
    pub toast_ms: u64,
    /// Edge length of a grid tile in points.
    pub tile_size: f32,
    /// Background worker threads; `0` picks available parallelism (at least 2).
    pub worker_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            confirm_delete: true,
            copied_feedback_ms: 1000,
            toast_ms: 2000,
            tile_size: 120.0,
            worker_threads: 0,
        }
    }
}

impl Config {
    /// Load the user config, falling back to defaults on any problem.
    pub fn load() -> Self {
        let path = match config_path() {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "No config directory; using defaults");
                return Self::default();
            }
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Parse a config file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Config =
            toml::from_str(&text).with_context(|| format!("Invalid config: {:?}", path))?;
        Ok(config.sanitized())
    }

    /// Directory for the stamp collection: the override, else the platform data dir.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
    }

    pub fn copied_feedback(&self) -> Duration {
        Duration::from_millis(self.copied_feedback_ms)
    }

    pub fn toast_lifetime(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    /// Resolved worker pool size.
    pub fn worker_count(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2)
    }

    /// Clamp values that would make the UI unusable.
    fn sanitized(mut self) -> Self {
        if !self.tile_size.is_finite() || self.tile_size < 48.0 {
            self.tile_size = 48.0;
        }
        self
    }
}

/// Location of `config.toml`.
pub fn config_path() -> Result<PathBuf> {
    let dirs = project_dirs().ok_or_else(|| anyhow!("Could not determine config directory."))?;
    Ok(dirs.config_dir().join("config.toml"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "clipstamp", "ClipStamp")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "confirm_delete = false\ntoast_ms = 500\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert!(!config.confirm_delete);
        assert_eq!(config.toast_lifetime(), Duration::from_millis(500));
        assert_eq!(config.copied_feedback(), Duration::from_millis(1000));
        assert_eq!(config.tile_size, 120.0);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "confirm_delete = \"maybe\"").unwrap();

        assert!(Config::load_from(&path).is_err());
        assert!(Config::load_from(&tmp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn data_dir_override_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, format!("data_dir = {:?}\n", tmp.path().join("stamps"))).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.data_dir(), Some(tmp.path().join("stamps")));
    }

    #[test]
    fn tiny_tiles_are_clamped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "tile_size = 4.0").unwrap();

        assert_eq!(Config::load_from(&path).unwrap().tile_size, 48.0);
    }

    #[test]
    fn worker_count_is_at_least_two_by_default() {
        assert!(Config::default().worker_count() >= 2);
        let fixed = Config {
            worker_threads: 1,
            ..Default::default()
        };
        assert_eq!(fixed.worker_count(), 1);
    }
}
