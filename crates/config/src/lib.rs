#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for bubz2
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`./bubz2.toml` or `~/.config/bubz2/config.toml`)
//! - Environment variables
//! - CLI flags

pub mod constants;

use bubz2_errors::{ConfigError, Error};
use bubz2_types::{ColorChoice, CompressionLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub use constants::*;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub color: ColorChoice,
    #[serde(default)]
    pub jobs: usize, // 0 = auto-detect
}

/// What to mirror and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory with uncompressed files
    pub source: Option<PathBuf>,
    /// Directory receiving `.bz2` files
    pub destination: Option<PathBuf>,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// File with wildcard patterns of paths not to compress
    pub ignore_file: Option<PathBuf>,
    #[serde(default)]
    pub level: CompressionLevel,
    #[serde(default = "default_true")]
    pub follow_symlinks: bool,
    /// Forget recorded times of files that no longer exist
    #[serde(default = "default_true")]
    pub prune_state: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            jobs: 0,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            state_path: default_state_path(),
            ignore_file: None,
            level: CompressionLevel::Best,
            follow_symlinks: true,
            prune_state: true,
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Get the user config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// Looks for `bubz2.toml` in the working directory, then for the user
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_file(&local).await;
        }

        match Self::default_path() {
            Ok(config_path) if config_path.exists() => Self::load_from_file(&config_path).await,
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|name| std::env::var(name).ok())
    }

    /// Merge values looked up through `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // BUBZ2_LEVEL
        if let Some(level) = lookup(ENV_LEVEL) {
            self.sync.level =
                CompressionLevel::parse(&level).map_err(|_| ConfigError::InvalidValue {
                    field: ENV_LEVEL.to_string(),
                    value: level,
                })?;
        }

        // BUBZ2_JOBS
        if let Some(jobs) = lookup(ENV_JOBS) {
            self.general.jobs = jobs.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_JOBS.to_string(),
                value: jobs,
            })?;
        }

        // BUBZ2_COLOR
        if let Some(color) = lookup(ENV_COLOR) {
            self.general.color = color.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_COLOR.to_string(),
                value: color,
            })?;
        }

        // BUBZ2_STATE
        if let Some(state) = lookup(ENV_STATE) {
            if state.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_STATE.to_string(),
                    value: state,
                }
                .into());
            }
            self.sync.state_path = PathBuf::from(state);
        }

        Ok(())
    }

    /// Source directory, required for a sync
    ///
    /// # Errors
    ///
    /// Returns an error if no source directory was configured.
    pub fn source(&self) -> Result<&Path, Error> {
        self.sync.source.as_deref().ok_or_else(|| {
            ConfigError::MissingField {
                field: "source".to_string(),
            }
            .into()
        })
    }

    /// Destination directory, required for a sync
    ///
    /// # Errors
    ///
    /// Returns an error if no destination directory was configured.
    pub fn destination(&self) -> Result<&Path, Error> {
        self.sync.destination.as_deref().ok_or_else(|| {
            ConfigError::MissingField {
                field: "destination".to_string(),
            }
            .into()
        })
    }

    /// Directory debug logs are written to
    #[must_use]
    pub fn logs_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR).join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

/// Calculate compression jobs based on CPU count
#[must_use]
pub fn calculate_jobs(config_value: usize) -> usize {
    if config_value > 0 {
        config_value // User override
    } else {
        // Use 75% of CPUs, minimum 1
        let cpus = num_cpus::get();
        (cpus * 3 / 4).max(1)
    }
}
