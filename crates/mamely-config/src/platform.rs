//! Per-platform `key=value` configuration

use crate::ConfigError;
use std::path::{Path, PathBuf};

const DEFAULT_CATALOG_FILE: &str = "MAMEly.xml";

/// Settings of one platform, read from its config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Emulator program, a path or a name looked up on `PATH`
    pub emulator_executable: String,

    /// ROM file extension including the dot
    pub rom_extension: String,

    /// Snapshot image extension including the dot
    pub snap_extension: String,

    pub emulator_base_path: PathBuf,

    pub rom_snap_directory: PathBuf,

    pub rom_directory: PathBuf,

    /// Explicit catalog location, `<platform dir>/MAMEly.xml` when unset
    pub catalog_path: Option<PathBuf>,

    /// Mask the catalog with the files present in `rom_directory`
    pub compare_catalog_to_roms: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            emulator_executable: String::new(),
            rom_extension: ".zip".to_string(),
            snap_extension: ".png".to_string(),
            emulator_base_path: PathBuf::new(),
            rom_snap_directory: PathBuf::new(),
            rom_directory: PathBuf::new(),
            catalog_path: None,
            compare_catalog_to_roms: false,
        }
    }
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix('~') {
        if let Some(home) = std::env::var_os("HOME") {
            let rest = rest.trim_start_matches('/');
            return if rest.is_empty() {
                PathBuf::from(home)
            } else {
                PathBuf::from(home).join(rest)
            };
        }
    }
    PathBuf::from(value)
}

impl PlatformConfig {
    /// Load a platform config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Loading platform config from {}", path.display());
        Ok(Self::parse(&contents))
    }

    /// Parse `key=value` lines. Unknown keys and lines without `=` are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut config = Self::default();

        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "emulatorExecutable" => {
                    config.emulator_executable = expand_home(value).to_string_lossy().into_owned();
                }
                "romExtension" => config.rom_extension = value.to_string(),
                "snapExtension" => config.snap_extension = value.to_string(),
                "emulatorBasePath" => config.emulator_base_path = expand_home(value),
                "romSnapDirectory" => config.rom_snap_directory = expand_home(value),
                "romDirectory" => config.rom_directory = expand_home(value),
                "MAMElyxmlPath" if !value.is_empty() => {
                    config.catalog_path = Some(expand_home(value));
                }
                "compareXMLtoRoms" => config.compare_catalog_to_roms = value == "True",
                _ => tracing::debug!("Ignoring platform config key {}", key),
            }
        }

        // Relative directories hang off the emulator base path
        if config.rom_snap_directory.is_relative() && !config.rom_snap_directory.as_os_str().is_empty() {
            config.rom_snap_directory = config.emulator_base_path.join(&config.rom_snap_directory);
        }
        if config.rom_directory.is_relative() && !config.rom_directory.as_os_str().is_empty() {
            config.rom_directory = config.emulator_base_path.join(&config.rom_directory);
        }

        config
    }

    /// Catalog file of the platform
    pub fn catalog_path(&self, platform_dir: &Path) -> PathBuf {
        self.catalog_path
            .clone()
            .unwrap_or_else(|| platform_dir.join(DEFAULT_CATALOG_FILE))
    }

    /// ROM file for a game id; ids that already end in the ROM extension
    /// are used as-is.
    pub fn rom_path(&self, id: &str) -> PathBuf {
        if !self.rom_extension.is_empty() && id.ends_with(&self.rom_extension) {
            self.rom_directory.join(id)
        } else {
            self.rom_directory.join(format!("{id}{}", self.rom_extension))
        }
    }

    /// Snapshot image locations to try, in order
    pub fn snap_candidates(&self, id: &str) -> [PathBuf; 2] {
        [
            self.rom_snap_directory
                .join(format!("{id}{}", self.snap_extension)),
            self.rom_snap_directory
                .join(id)
                .join(format!("0000{}", self.snap_extension)),
        ]
    }

    /// First snapshot candidate that exists on disk
    pub fn find_snap(&self, id: &str) -> Option<PathBuf> {
        self.snap_candidates(id).into_iter().find(|p| p.is_file())
    }
}
