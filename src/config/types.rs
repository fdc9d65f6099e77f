//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::diff::DiffStrategy;

use super::loader::ConfigError;

/// Placeholder written into a freshly created configuration.
pub const PLACEHOLDER_PATH: &str = "/path/to/file";

/// Snapshot and diff settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Capture revisions and report line changes. When off only the
    /// attribution line is logged.
    pub enabled: bool,
    /// Directory under which the per-session scratch directory is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scratch_root: Option<PathBuf>,
    /// Line alignment used for comparisons.
    pub strategy: DiffStrategy,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scratch_root: None,
            strategy: DiffStrategy::default(),
        }
    }
}

/// Monitored paths and snapshot settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Absolute paths of the files to monitor, in configuration order.
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            files: vec![PathBuf::from(PLACEHOLDER_PATH)],
            snapshots: SnapshotConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// A configuration monitoring the given files with default settings.
    #[must_use]
    pub fn with_files(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            snapshots: SnapshotConfig::default(),
        }
    }

    /// Check that every monitored path is absolute.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first relative path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.files.iter().find(|p| !p.is_absolute()) {
            Some(path) => Err(ConfigError::Invalid(format!(
                "monitored path must be absolute: {}",
                path.display()
            ))),
            None => Ok(()),
        }
    }

    /// Whether `path` is monitored.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|p| p == path)
    }

    /// Add a monitored path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is relative or already monitored.
    pub fn add_file(&mut self, path: PathBuf) -> Result<(), ConfigError> {
        if !path.is_absolute() {
            return Err(ConfigError::Invalid(format!(
                "monitored path must be absolute: {}",
                path.display()
            )));
        }
        if self.contains(&path) {
            return Err(ConfigError::AlreadyPresent(path));
        }
        self.files.push(path);
        Ok(())
    }

    /// Remove a monitored path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotPresent` if the path is not monitored.
    pub fn remove_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let before = self.files.len();
        self.files.retain(|p| p != path);
        if self.files.len() == before {
            return Err(ConfigError::NotPresent(path.to_path_buf()));
        }
        Ok(())
    }
}
