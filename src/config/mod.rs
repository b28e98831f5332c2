//! Configuration management for querypad
//!
//! This module handles loading and managing configuration:
//! - Configuration file (TOML format)
//! - Default values
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Engine behavior configuration
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Snapshot storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted store snapshot
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (json, json-pretty, compact)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,

    /// Show execution time
    #[serde(default = "default_show_timing")]
    pub show_timing: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Compact JSON format (single-line)
    Json,

    /// Pretty-printed JSON format (multi-line)
    JsonPretty,

    /// Compact summary format: counts and ids only, not full documents
    Compact,
}

/// Engine behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Debounce window for repeated identical run requests, in
    /// milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

// Default value functions
fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("querypad")
        .join("store.json")
}

fn default_format() -> OutputFormat {
    OutputFormat::JsonPretty
}

fn default_color_output() -> bool {
    true
}

fn default_show_timing() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            display: DisplayConfig::default(),
            engine: EngineSettings::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color_output: default_color_output(),
            show_timing: default_show_timing(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(config)
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// The default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("querypad").join("config.toml"))
    }

    /// The configured debounce window
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.engine.debounce_ms)
    }
}
