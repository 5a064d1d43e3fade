//! Locating, creating and reading `config.toml`.

use super::app_config::AppConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while locating or reading the configuration file.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("no configuration directory for this platform")]
    ConfigDirNotFound,
    #[error("config file {path} has no parent directory")]
    InvalidPath { path: PathBuf },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Owns the directory `config.toml` lives in.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform configuration directory for skincache.
    ///
    /// # Errors
    /// Returns `ConfigDirNotFound` when the platform has no home directory.
    pub fn new() -> Result<Self, ConfigError> {
        AppConfig::default_config_dir()
            .map(Self::with_dir)
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses `config_dir` instead of the platform directory.
    #[must_use]
    pub const fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Default location of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Creates the configuration directory if needed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!(dir = %self.config_dir.display(), "Creating configuration directory");
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Reads the configuration from `path_override` or the default location.
    ///
    /// A missing file is created with default values. A file that does not
    /// parse is left untouched and defaults are used instead.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or the default file cannot be
    /// written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => {
                self.ensure_config_dir()?;
                self.config_path()
            }
        };

        let mut config = if path.exists() {
            Self::read(&path)?
        } else {
            info!(path = %path.display(), "Config file not found, creating default");
            let config = AppConfig::default();
            Self::write_atomic(&path, &config)?;
            config
        };
        config.config = Some(path);
        Ok(config)
    }

    fn read(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
            AppConfig::default()
        }))
    }

    fn write_atomic(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
        let parent = path.parent().ok_or_else(|| ConfigError::InvalidPath {
            path: path.to_path_buf(),
        })?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(config)?;
        let mut staged = tempfile::NamedTempFile::new_in(parent)?;
        staged.write_all(content.as_bytes())?;
        staged.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "Wrote config file");
        Ok(())
    }
}
