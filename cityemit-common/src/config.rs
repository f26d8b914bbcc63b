//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing or invalid
//! file is never fatal: a warning is logged and compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "CITYEMIT_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "cityemit.db";

/// Default delay between producer cycles
pub const DEFAULT_EMISSION_INTERVAL_MS: u64 = 5000;

/// Default delay before a welcome notice is published
pub const DEFAULT_WELCOME_DELAY_MS: u64 = 2000;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub producer: ProducerConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Emission producer settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Delay between producer cycles in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl ProducerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Presentation settings
#[derive(Debug, Clone, Deserialize)]
pub struct PresentationConfig {
    /// Delay before a welcome notice is published, in milliseconds
    #[serde(default = "default_welcome_delay_ms")]
    pub welcome_delay_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            welcome_delay_ms: default_welcome_delay_ms(),
        }
    }
}

impl PresentationConfig {
    pub fn welcome_delay(&self) -> Duration {
        Duration::from_millis(self.welcome_delay_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_EMISSION_INTERVAL_MS
}

fn default_welcome_delay_ms() -> u64 {
    DEFAULT_WELCOME_DELAY_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Load the platform config file, falling back to defaults
    pub fn load_or_default() -> Self {
        match default_config_path() {
            Some(path) => Self::load_from_path_or_default(&path),
            None => {
                info!("No config directory on this platform, using compiled defaults");
                Self::default()
            }
        }
    }

    /// Load `path`, falling back to defaults when it is missing or invalid
    pub fn load_from_path_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {}, using compiled defaults", path.display());
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using compiled defaults", e);
                Self::default()
            }
        }
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Platform config file location (`<config dir>/cityemit/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cityemit").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cityemit"))
        .unwrap_or_else(|| PathBuf::from("./cityemit_data"))
}
