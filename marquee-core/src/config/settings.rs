//! Application settings model
//!
//! This module defines the settings stored in config.toml: the bastion host
//! the tunnel authenticates to, the database reachable only from it, and the
//! client timeouts.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Application-wide settings
///
/// Deserialize-only: the database password lands in a `SecretString` and is
/// never serialized back out. `ConfigManager::write_template` produces the
/// starting config file instead.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Secure tunnel to the bastion host
    pub tunnel: TunnelSettings,
    /// Database session opened through the tunnel
    pub database: DatabaseSettings,
}

/// Settings for the SSH tunnel to the bastion host
#[derive(Debug, Clone, Deserialize)]
pub struct TunnelSettings {
    /// Bastion host address
    pub host: String,
    /// SSH port on the bastion
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    /// Username for SSH authentication
    pub username: String,
    /// Path to the SSH private key file (falls back to the agent when unset)
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Seconds to wait for the forward to come up
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

const fn default_ssh_port() -> u16 {
    22
}

const fn default_connect_timeout() -> u64 {
    10
}

impl TunnelSettings {
    /// Builds the ssh argument list for a local forward to the database
    ///
    /// `-N` (no remote command) plus `BatchMode` and `ExitOnForwardFailure`
    /// so a failed login or a refused forward makes the child exit instead
    /// of hanging on a prompt. The forward listens on 127.0.0.1 only.
    #[must_use]
    pub fn forward_args(&self, local_port: u16, target_host: &str, target_port: u16) -> Vec<String> {
        let mut args = vec![
            "-N".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "ExitOnForwardFailure=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
            "-L".to_string(),
            format!("127.0.0.1:{local_port}:{target_host}:{target_port}"),
            "-p".to_string(),
            self.port.to_string(),
        ];

        // A named key pins authentication to that identity; without one the
        // ssh agent supplies whatever keys it holds
        if let Some(ref key_path) = self.key_path {
            if !key_path.as_os_str().is_empty() {
                args.push("-i".to_string());
                args.push(key_path.display().to_string());
                args.push("-o".to_string());
                args.push("IdentitiesOnly=yes".to_string());
            }
        }

        args.push(format!("{}@{}", self.username, self.host));
        args
    }
}

/// Settings for the database session
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database host as seen from the bastion
    pub host: String,
    /// Database port as seen from the bastion
    #[serde(default = "default_mysql_port")]
    pub port: u16,
    /// Username for database authentication
    pub username: String,
    /// Password for database authentication (redacted in Debug output)
    #[serde(default, deserialize_with = "deserialize_password")]
    pub password: Option<SecretString>,
    /// Name of the target database
    pub database: String,
    /// Seconds to wait for a session before a search fails
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

const fn default_mysql_port() -> u16 {
    3306
}

const fn default_acquire_timeout() -> u64 {
    30
}

fn deserialize_password<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const FULL_CONFIG: &str = r#"
        [tunnel]
        host = "bastion.example.edu"
        port = 2022
        username = "jvander"
        key_path = "/home/jvander/.ssh/id_ed25519"
        connect_timeout_secs = 5

        [database]
        host = "db.internal.example.edu"
        port = 3307
        username = "movies_ro"
        password = "hunter2"
        database = "movienight"
        acquire_timeout_secs = 15
    "#;

    const MINIMAL_CONFIG: &str = r#"
        [tunnel]
        host = "bastion.example.edu"
        username = "jvander"

        [database]
        host = "db.internal.example.edu"
        username = "movies_ro"
        database = "movienight"
    "#;

    #[test]
    fn test_parse_full_config() {
        let settings: AppSettings = toml::from_str(FULL_CONFIG).unwrap();
        assert_eq!(settings.tunnel.host, "bastion.example.edu");
        assert_eq!(settings.tunnel.port, 2022);
        assert_eq!(settings.tunnel.connect_timeout_secs, 5);
        assert_eq!(settings.database.port, 3307);
        assert_eq!(settings.database.database, "movienight");
        assert_eq!(
            settings.database.password.unwrap().expose_secret(),
            "hunter2"
        );
    }

    #[test]
    fn test_parse_minimal_config_applies_defaults() {
        let settings: AppSettings = toml::from_str(MINIMAL_CONFIG).unwrap();
        assert_eq!(settings.tunnel.port, 22);
        assert_eq!(settings.tunnel.connect_timeout_secs, 10);
        assert!(settings.tunnel.key_path.is_none());
        assert_eq!(settings.database.port, 3306);
        assert!(settings.database.password.is_none());
        assert_eq!(settings.database.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let settings: AppSettings = toml::from_str(FULL_CONFIG).unwrap();
        let debug = format!("{:?}", settings.database);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_forward_args_shape() {
        let settings: AppSettings = toml::from_str(MINIMAL_CONFIG).unwrap();
        let args = settings
            .tunnel
            .forward_args(43210, "db.internal.example.edu", 3306);

        assert_eq!(args[0], "-N");
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert!(args.contains(&"ExitOnForwardFailure=yes".to_string()));
        assert!(args.contains(&"ConnectTimeout=10".to_string()));
        assert!(args.contains(&"127.0.0.1:43210:db.internal.example.edu:3306".to_string()));
        assert_eq!(args.last().unwrap(), "jvander@bastion.example.edu");
        // No key configured, so no identity pinning
        assert!(!args.contains(&"-i".to_string()));
        assert!(!args.contains(&"IdentitiesOnly=yes".to_string()));
    }

    #[test]
    fn test_forward_args_with_key_path() {
        let settings: AppSettings = toml::from_str(FULL_CONFIG).unwrap();
        let args = settings.tunnel.forward_args(43210, "db", 3306);

        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[i_pos + 1], "/home/jvander/.ssh/id_ed25519");
        assert!(args.contains(&"IdentitiesOnly=yes".to_string()));
        assert!(args.contains(&"ConnectTimeout=5".to_string()));
        assert!(args.contains(&"-p".to_string()));
        assert!(args.contains(&"2022".to_string()));
    }
}
