use crate::core::db::DatabaseCredentials;
use crate::core::{MyqueryError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure parsed from a TOML file.
///
/// Every section is optional; missing sections and keys take their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseCredentials,
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive for the tracing subscriber, e.g. `info` or `myquery=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Credentials of the `[database]` section
    pub fn credentials(&self) -> DatabaseCredentials {
        self.database.clone()
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Errors
///
/// Returns `MyqueryError::Config` if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| MyqueryError::Config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| MyqueryError::Config(format!("{}: {}", path.display(), e)))
}

/// `<config dir>/myquery/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("myquery").join("config.toml"))
}
