//! Configuration management for mcp-youtrack.
//!
//! Runtime settings are resolved from the environment:
//!
//! - `TRACKER_URL`: base URL of the YouTrack instance (required)
//! - `TRACKER_TOKEN`: permanent token used as bearer token (required)
//! - `TRACKER_TIMEOUT`: request timeout in seconds (default: 30)
//!
//! `YOUTRACK_URL` and `YOUTRACK_TOKEN` are accepted when the primary names
//! are unset. A `.env` file in the working directory is loaded first and never
//! overrides variables already present in the process environment.
//!
//! Non-secret defaults can also be kept in a TOML settings file:
//!
//! - **macOS/Linux**: `~/.config/mcp-youtrack/config.toml`
//! - **Windows**: `%APPDATA%\mcp-youtrack\config.toml`
//!
//! ```toml
//! [youtrack]
//! url = "https://youtrack.example.com"
//! timeout = 15.0
//! ```
//!
//! The token is never stored in the settings file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "mcp-youtrack";

/// Primary environment variable names.
pub const URL_VAR: &str = "TRACKER_URL";
pub const TOKEN_VAR: &str = "TRACKER_TOKEN";
pub const TIMEOUT_VAR: &str = "TRACKER_TIMEOUT";

/// Legacy environment variable names, consulted when the primary ones are unset.
const LEGACY_URL_VAR: &str = "YOUTRACK_URL";
const LEGACY_TOKEN_VAR: &str = "YOUTRACK_TOKEN";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

// =============================================================================
// Settings file
// =============================================================================

/// Contents of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// YouTrack connection defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtrack: Option<YouTrackSettings>,
}

/// Non-secret YouTrack settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YouTrackSettings {
    /// YouTrack instance URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns a default (empty) config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        debug!(path = ?path, "Saving config");

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        info!(path = ?path, "Config saved successfully");
        Ok(())
    }

    /// Set a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `youtrack.url`)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = split_key(key)?;

        match section {
            "youtrack" => {
                let settings = self.youtrack.get_or_insert_with(YouTrackSettings::default);
                match field {
                    "url" => settings.url = Some(value.to_string()),
                    "timeout" => settings.timeout = Some(parse_timeout(value)?),
                    "token" => {
                        return Err(Error::Config(format!(
                            "The token is not stored in the config file; set {} instead",
                            TOKEN_VAR
                        )))
                    }
                    _ => {
                        return Err(Error::Config(format!(
                            "Unknown YouTrack config field: {}",
                            field
                        )))
                    }
                }
            }
            _ => {
                return Err(Error::Config(format!("Unknown config section: {}", section)));
            }
        }

        Ok(())
    }

    /// Get a configuration value by key path.
    ///
    /// Key format: `section.field` (e.g., `youtrack.url`)
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field) = split_key(key)?;

        match section {
            "youtrack" => {
                let Some(settings) = &self.youtrack else {
                    return Ok(None);
                };
                match field {
                    "url" => Ok(settings.url.clone()),
                    "timeout" => Ok(settings.timeout.map(|t| t.to_string())),
                    _ => Err(Error::Config(format!(
                        "Unknown YouTrack config field: {}",
                        field
                    ))),
                }
            }
            _ => Err(Error::Config(format!("Unknown config section: {}", section))),
        }
    }
}

fn split_key(key: &str) -> Result<(&str, &str)> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        return Err(Error::Config(format!(
            "Invalid config key '{}'. Expected format: section.field",
            key
        )));
    }
    Ok((parts[0], parts[1]))
}

fn parse_timeout(value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(secs) if timeout_duration(secs).is_ok() => Ok(secs),
        _ => Err(invalid_timeout(value)),
    }
}

/// Positive timeout that fits in a [`Duration`].
fn timeout_duration(secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() => Ok(timeout),
        _ => Err(invalid_timeout(secs)),
    }
}

fn invalid_timeout(value: impl fmt::Display) -> Error {
    Error::Config(format!(
        "Invalid timeout '{}': expected a positive number of seconds",
        value
    ))
}

// =============================================================================
// Resolved runtime configuration
// =============================================================================

/// Connection settings used to build the tracker client.
#[derive(Clone)]
pub struct TrackerConfig {
    /// Base URL of the YouTrack instance
    pub url: String,
    /// Permanent token sent as bearer token
    pub token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TrackerConfig {
    /// Resolve configuration from `.env`, the process environment, and the
    /// settings file.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = ?path, "Loaded environment file"),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => return Err(Error::Config(format!("Failed to load .env file: {}", e))),
        }

        let file = Config::load()?;
        Self::resolve(&file, |name| std::env::var(name).ok())
    }

    /// Resolve configuration from a settings file and a variable lookup.
    ///
    /// Environment values win over file values. Empty values count as unset.
    pub fn resolve<F>(file: &Config, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let settings = file.youtrack.clone().unwrap_or_default();

        let url = var(URL_VAR)
            .or_else(|| var(LEGACY_URL_VAR))
            .or_else(|| settings.url.filter(|u| !u.trim().is_empty()))
            .ok_or_else(|| Error::Config(format!("{} is not set", URL_VAR)))?;

        let token = var(TOKEN_VAR)
            .or_else(|| var(LEGACY_TOKEN_VAR))
            .ok_or_else(|| Error::Config(format!("{} is not set", TOKEN_VAR)))?;

        let timeout = match var(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => settings.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            token,
            timeout: timeout_duration(timeout)?,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
