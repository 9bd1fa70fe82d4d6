#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Stubgen Configuration
//!
//! This crate provides configuration management for stubgen.
//! It handles loading, saving, and managing configuration files that specify:
//! - Generation parameters (module root, output root, run-wide toggles, naming)
//! - Logging configuration
//!
//! Configuration is stored in TOML format. Every key has a default, so a
//! partial file (or none at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code generation settings
    pub generation: GenerationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Module root of the generated code; imports under it are dropped. May be empty.
    pub module: String,
    /// Root that resolved per-document output paths are joined onto
    pub output_path: PathBuf,
    /// Emit the high-performance encode/decode path
    pub fast_api: bool,
    /// Also emit a verbatim copy of every IDL source
    pub copy_idl: bool,
    /// Prefix of every generated document file name
    pub file_prefix: String,
    /// File name of the per-directory protection file
    pub protection_file: String,
    /// Identifier of the per-package protection symbol
    pub protection_symbol: String,
    /// Namespace key used to derive package names
    pub language: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            module: String::new(),
            output_path: PathBuf::from("."),
            fast_api: true,
            copy_idl: false,
            file_prefix: "generated-".to_string(),
            protection_file: "generated-consts.go".to_string(),
            protection_symbol: "UnusedProtection".to_string(),
            language: "go".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "info".to_string(), file: None } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the default path if that file
    /// exists, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Ok(default) if default.is_file() => Self::from_file(default),
            _ => Ok(Self::default()),
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/stubgen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("stubgen");
        Ok(config_dir.join("config.toml"))
    }
}
