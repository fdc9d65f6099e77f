//! Configuration file loader.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::MonitorConfig;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_NAME: &str = "filemon.toml";

/// Configuration loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default search paths.
    #[must_use]
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        // 1. Current directory: filemon.toml
        search_paths.push(PathBuf::from(LOCAL_CONFIG_NAME));

        // 2. User config directory: ~/.config/filemon/config.toml
        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("filemon").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a config loader with a specific config file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the first config file that exists.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.exists()).cloned()
    }

    /// Resolve the configuration path as an absolute path.
    ///
    /// Returns the first existing search path, or the first search path when
    /// none exists yet.
    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        let path = self
            .find_config_file()
            .or_else(|| self.search_paths.first().cloned())
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_NAME));
        absolute(&path)
    }

    /// Load the configuration, creating a default file if none exists.
    ///
    /// Returns the absolute path of the file that was used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or created.
    pub fn load_or_create(&self) -> Result<(PathBuf, MonitorConfig), ConfigError> {
        let path = self.resolve();
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading config file");
            let config = Self::load(&path)?;
            return Ok((path, config));
        }

        let config = MonitorConfig::default();
        Self::save(&path, &config)?;
        tracing::warn!(path = %path.display(), "Created an empty config file");
        Ok((path, config))
    }

    /// Load and validate configuration from a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names a
    /// relative path.
    pub fn load(path: &Path) -> Result<MonitorConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: MonitorConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration atomically.
    ///
    /// Writes to a temporary file first, then renames over the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn save(path: &Path, config: &MonitorConfig) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = toml::to_string_pretty(config)?;
        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).map_err(write_err)?;
        fs::rename(&temp_path, path).map_err(write_err)?;
        Ok(())
    }

    /// Add an existing file to the configuration at `path`.
    ///
    /// The file is canonicalized before being stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, is already monitored, or
    /// the configuration cannot be loaded or saved.
    pub fn add_file(path: &Path, file: &Path) -> Result<PathBuf, ConfigError> {
        let file =
            fs::canonicalize(file).map_err(|_| ConfigError::MissingFile(file.to_path_buf()))?;
        let mut config = Self::load(path)?;
        config.add_file(file.clone())?;
        Self::save(path, &config)?;
        tracing::info!(
            config = %path.display(),
            file = %file.display(),
            "Added file to config"
        );
        Ok(file)
    }

    /// Remove a file from the configuration at `path`.
    ///
    /// `file` may name the entry through a symlink or a relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not monitored or the configuration
    /// cannot be loaded or saved.
    pub fn remove_file(path: &Path, file: &Path) -> Result<(), ConfigError> {
        let mut config = Self::load(path)?;
        // Entries added through `add_file` are canonical; hand-written ones
        // may not be.
        let file = fs::canonicalize(file)
            .ok()
            .filter(|canonical| config.contains(canonical))
            .unwrap_or_else(|| absolute(file));
        config.remove_file(&file)?;
        Self::save(path, &config)?;
        tracing::info!(
            config = %path.display(),
            file = %file.display(),
            "Removed file from config"
        );
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Make `path` absolute against the current directory without touching the
/// filesystem beyond that.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Errors that can occur during configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("File does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("File is already monitored: {0}")]
    AlreadyPresent(PathBuf),

    #[error("File is not monitored: {0}")]
    NotPresent(PathBuf),
}
