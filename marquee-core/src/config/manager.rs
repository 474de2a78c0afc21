//! Configuration manager for TOML file operations
//!
//! This module provides the `ConfigManager` which locates and loads the
//! config file, and writes a commented starting template on first run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

use super::settings::AppSettings;

const CONFIG_FILE: &str = "config.toml";

/// Starting configuration written by `write_template`
///
/// Kept as a literal so credentials never round-trip through a serializer.
const CONFIG_TEMPLATE: &str = r#"# Marquee configuration
#
# The database is reached through an SSH tunnel to the bastion host below.
# Authentication to the bastion uses the named key file, or the ssh agent
# when key_path is omitted.

[tunnel]
host = "bastion.example.edu"
port = 22
username = "your-ssh-user"
# key_path = "/home/you/.ssh/id_ed25519"
# connect_timeout_secs = 10

[database]
# Host and port as seen from the bastion, not from this machine.
host = "db.internal.example.edu"
port = 3306
username = "your-db-user"
password = "your-db-password"
database = "movienight"
# acquire_timeout_secs = 30
"#;

/// Configuration manager for Marquee
///
/// Loads settings from TOML. Configuration is stored in
/// `~/.config/marquee/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// The default directory is `~/.config/marquee/`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config")))?
            .join("marquee");
        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    ///
    /// This is useful for testing or non-standard configurations.
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path of the config file
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Loads the application settings
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the config file does not exist and
    /// `ConfigError::Parse` if it cannot be read or parsed.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        Self::load_settings_from(&self.config_path())
    }

    /// Loads application settings from an explicit file path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file does not exist and
    /// `ConfigError::Parse` if it cannot be read or parsed.
    pub fn load_settings_from(path: &Path) -> ConfigResult<AppSettings> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Writes a commented starting config file and returns its path
    ///
    /// Refuses to overwrite an existing config.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the file already
    /// exists, or the file cannot be written.
    pub fn write_template(&self) -> ConfigResult<PathBuf> {
        let path = self.config_path();
        if path.exists() {
            return Err(ConfigError::Write(format!(
                "Refusing to overwrite existing config at {}",
                path.display()
            )));
        }

        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }

        fs::write(&path, CONFIG_TEMPLATE)
            .map_err(|e| ConfigError::Write(format!("Failed to write {}: {}", path.display(), e)))?;

        Ok(path)
    }
}
