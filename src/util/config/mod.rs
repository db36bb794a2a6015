//! macrolower configuration system
//!
//! Supports user-level and project-level configuration.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. --config <PATH>
//! 3. Project-level (./macrolower.toml)
//! 4. User-level (~/.config/macrolower/config.toml)
//! 5. Default values
//! ```
//!
//! A file replaces the whole config; files are not merged with each other.
//!
//! # Usage
//!
//! ```rust
//! use macrolower::util::config::{load_user_config, LowerConfig};
//!
//! let config = load_user_config().unwrap_or_default();
//! let pipeline = config.pipeline.to_pipeline();
//! ```

use crate::middle::passes::{PassKind, Pipeline};
use crate::util::logger::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-level config file name
pub const PROJECT_CONFIG_FILE: &str = "macrolower.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LowerConfig {
    /// Pass selection
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Passes to run, in order
    #[serde(default = "default_passes")]
    pub passes: Vec<PassKind>,
}

fn default_passes() -> Vec<PassKind> {
    PassKind::ALL.to_vec()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
        }
    }
}

impl PipelineConfig {
    pub fn to_pipeline(&self) -> Pipeline {
        Pipeline::new(self.passes.iter().copied())
    }
}

/// Log configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LogConfig {
    /// Minimum level printed
    #[serde(default)]
    pub level: LogLevel,
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    // Try XDG config directory on Unix
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("macrolower"));
    }

    // Fallback to ~/.config/macrolower
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("macrolower"));
    }

    // On Windows, try %APPDATA%
    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("macrolower"));
    }

    None
}

/// Get the user config file path (~/.config/macrolower/config.toml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load a config file
pub fn load_config_file(path: &Path) -> Result<LowerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<LowerConfig, ConfigError> {
    match get_config_path() {
        Some(path) if path.exists() => load_config_file(&path),
        _ => Ok(LowerConfig::default()),
    }
}

/// Load `macrolower.toml` from `dir`, if there is one
pub fn load_project_config(dir: &Path) -> Result<Option<LowerConfig>, ConfigError> {
    let path = dir.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Resolve the effective config: explicit file, then project, then user
pub fn resolve_config(
    explicit: Option<&Path>,
    project_dir: &Path,
) -> Result<LowerConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    if let Some(config) = load_project_config(project_dir)? {
        return Ok(config);
    }
    load_user_config()
}

/// Save configuration to `path`, creating parent directories
pub fn save_config(
    path: &Path,
    config: &LowerConfig,
) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(ConfigError::IoError)?;
        }
    }

    let content = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
    fs::write(path, content).map_err(ConfigError::IoError)?;

    Ok(())
}

/// Save user-level configuration
pub fn save_user_config(config: &LowerConfig) -> Result<(), ConfigError> {
    let path = get_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_config(&path, config)
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(toml::de::Error),
    SerializeError(toml::ser::Error),
    NoConfigDir,
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Config serialize error: {}", e),
            ConfigError::NoConfigDir => write!(f, "Cannot determine config directory"),
        }
    }
}

impl std::error::Error for ConfigError {}
