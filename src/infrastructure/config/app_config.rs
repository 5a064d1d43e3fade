//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::services::TextureServiceConfig;

const APP_NAME: &str = "skincache";
const APP_QUALIFIER: &str = "org";
const APP_ORGANIZATION: &str = "skincache";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI
/// flags.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Query third-party providers when a player has no official cape.
    #[serde(default)]
    pub allow_third_party_capes: bool,

    /// Query third-party providers for ears.
    #[serde(default)]
    pub allow_third_party_ears: bool,

    /// Days to keep cached images on disk. Zero or less disables the disk
    /// cache.
    #[serde(default)]
    pub cache_images: i64,

    /// Disk cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding the bundled default skins and geometry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<PathBuf>,

    /// Fetch worker count. Derived from `allow_third_party_capes` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User-Agent sent with every texture request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(allow) = args.allow_third_party_capes {
            self.allow_third_party_capes = allow;
        }
        if let Some(allow) = args.allow_third_party_ears {
            self.allow_third_party_ears = allow;
        }
        if let Some(days) = args.cache_images {
            self.cache_images = days;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache_dir = Some(cache_dir.clone());
        }
        if let Some(resource_dir) = &args.resource_dir {
            self.resource_dir = Some(resource_dir.clone());
        }
        if let Some(workers) = args.worker_threads {
            self.worker_threads = Some(workers);
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default disk cache directory.
    #[must_use]
    pub fn default_cache_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.cache_dir().join("images"))
    }

    /// Returns effective disk cache directory.
    #[must_use]
    pub fn effective_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.clone().or_else(Self::default_cache_dir)
    }

    /// Returns effective resource directory, `./resources` when unset.
    #[must_use]
    pub fn effective_resource_dir(&self) -> PathBuf {
        self.resource_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("resources"))
    }

    /// Returns true if successful fetches should be written to disk.
    #[must_use]
    pub const fn disk_cache_enabled(&self) -> bool {
        self.cache_images > 0
    }

    /// Engine settings derived from this configuration.
    #[must_use]
    pub fn texture_service_config(&self) -> TextureServiceConfig {
        TextureServiceConfig {
            allow_third_party_capes: self.allow_third_party_capes,
            allow_third_party_ears: self.allow_third_party_ears,
            ..TextureServiceConfig::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            allow_third_party_capes: false,
            allow_third_party_ears: false,
            cache_images: 0,
            cache_dir: None,
            resource_dir: None,
            worker_threads: None,
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
            log_level = "debug"
            allow_third_party_capes = true
            cache_images = 7
            cache_dir = "/var/cache/skins"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.allow_third_party_capes);
        assert!(!config.allow_third_party_ears);
        assert!(config.disk_cache_enabled());
        assert_eq!(config.effective_cache_dir(), Some(PathBuf::from("/var/cache/skins")));
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.user_agent.starts_with("skincache/"));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert!(!config.disk_cache_enabled());
        assert_eq!(config.worker_threads, None);
        assert_eq!(config.effective_resource_dir(), PathBuf::from("resources"));
    }

    #[test]
    fn test_negative_retention_disables_disk_cache() {
        let config: AppConfig = toml::from_str("cache_images = -3").unwrap();
        assert!(!config.disk_cache_enabled());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config: AppConfig =
            toml::from_str("allow_third_party_capes = true\ncache_images = 7").unwrap();
        let args = CliArgs::parse_from([
            "skincache",
            "--allow-third-party-capes",
            "false",
            "--cache-images",
            "0",
            "--log-level",
            "trace",
            "069a79f4-44e9-4726-a5be-fca90e38aaf5",
        ]);

        config.merge_with_args(&args);

        assert!(!config.allow_third_party_capes);
        assert!(!config.disk_cache_enabled());
        assert_eq!(config.log_level, LogLevel::Trace);
        assert!(!config.texture_service_config().allow_third_party_capes);
    }
}
