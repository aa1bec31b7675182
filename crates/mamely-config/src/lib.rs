//! Configuration management for MAMEly
//!
//! The launcher configuration (`mamely.toml`) lists the platforms; each
//! platform directory carries a `key=value` file describing its emulator,
//! ROM and snapshot locations.

mod platform;

pub use platform::PlatformConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Default launcher configuration file name
pub const CONFIG_FILE: &str = "mamely.toml";

/// One emulator target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Display name
    pub name: String,

    /// Directory under `platforms_dir`
    pub folder: String,

    /// Platform config file name inside the folder
    #[serde(default = "default_platform_config")]
    pub config: String,
}

fn default_platform_config() -> String {
    "platform.cfg".to_string()
}

fn default_platforms_dir() -> PathBuf {
    PathBuf::from("platforms")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("mamely.log")
}

/// Main launcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Directory holding the platform folders, relative to the config file
    #[serde(default = "default_platforms_dir")]
    pub platforms_dir: PathBuf,

    /// Log file, relative to the config file
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default, rename = "platform")]
    pub platforms: Vec<PlatformEntry>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            platforms_dir: default_platforms_dir(),
            log_file: default_log_file(),
            platforms: Vec::new(),
        }
    }
}

impl LauncherConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => {
                tracing::warn!("No configuration file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for platform in &self.platforms {
            if platform.name.trim().is_empty() || platform.folder.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "platform entries need a name and a folder".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Directory of a platform, resolved against `base` (the config file's directory)
    pub fn platform_dir(&self, base: &Path, platform: &PlatformEntry) -> PathBuf {
        base.join(&self.platforms_dir).join(&platform.folder)
    }
}
