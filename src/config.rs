//! Configuration management for colorbisect
//!
//! Settings live in an optional ~/.colorbisect/config.toml. The dialog
//! offset can also come from the FIND_COLOR_X_OFFSET or COLORBISECT_X_OFFSET
//! environment variables, which win over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables holding the horizontal offset of the first dialog,
/// in lookup order
pub const X_OFFSET_ENV_VARS: [&str; 2] = ["FIND_COLOR_X_OFFSET", "COLORBISECT_X_OFFSET"];

const MAX_X_OFFSET: i32 = 10_000;

/// colorbisect configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Dialog settings
    #[serde(default)]
    pub dialog: DialogConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogConfig {
    /// Pixels (window) or columns (terminal popup) to shift the first
    /// dialog by; negative moves it left
    #[serde(default)]
    pub x_offset: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a debug log to ~/.colorbisect/colorbisect.log
    #[serde(default)]
    pub debug: bool,
}

/// Directory holding the config file and debug log
pub fn config_dir() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home_dir.join(".colorbisect"))
}

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Parse configuration text
pub fn parse_config(config_str: &str) -> Result<Config> {
    toml::from_str(config_str).context("Failed to parse configuration")
}

/// Load configuration from `path`, falling back to defaults if it doesn't exist
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&config_str)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Load configuration from the default location
///
/// Without a home directory there is nowhere to look, so defaults apply.
pub fn load_config() -> Result<Config> {
    match config_file_path() {
        Ok(path) => load_config_from(&path),
        Err(_) => Ok(Config::default()),
    }
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if config.dialog.x_offset.unsigned_abs() > MAX_X_OFFSET.unsigned_abs() {
        anyhow::bail!(
            "Invalid x_offset: {} (must be between -{} and {})",
            config.dialog.x_offset,
            MAX_X_OFFSET,
            MAX_X_OFFSET
        );
    }

    Ok(())
}

/// Pick the dialog offset: the first set environment variable, else the config value
///
/// `lookup` reads one variable by name, normally `std::env::var(name).ok()`.
/// An unparsable value is reported and ignored.
pub fn resolve_x_offset<F>(config: &Config, lookup: F) -> i32
where
    F: Fn(&str) -> Option<String>,
{
    let Some((name, raw)) = X_OFFSET_ENV_VARS
        .iter()
        .find_map(|name| lookup(name).map(|value| (*name, value)))
    else {
        return config.dialog.x_offset;
    };

    match raw.trim().parse::<i32>() {
        Ok(offset) if offset.unsigned_abs() <= MAX_X_OFFSET.unsigned_abs() => offset,
        _ => {
            eprintln!(
                "Warning: ignoring {}={:?} (expected an integer between -{} and {})",
                name, raw, MAX_X_OFFSET, MAX_X_OFFSET
            );
            tracing::warn!(variable = name, value = %raw, "invalid dialog offset in environment");
            config.dialog.x_offset
        }
    }
}
