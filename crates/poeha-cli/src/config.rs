//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the Steam build of Path of Exile 2 writes its client log.
pub const DEFAULT_LOG_FILE: &str =
    "C:/Program Files (x86)/Steam/steamapps/common/Path of Exile 2/logs/Client.txt";

const ENV_PREFIX: &str = "POE_HA_";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("missing required setting `{field}`; set it in {config_file} (see `poe-ha init`) or set {env}")]
    MissingField {
        field: &'static str,
        env: String,
        config_file: String,
    },
    /// A setting is present but unusable.
    #[error("invalid setting `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    /// An explicitly requested config file does not exist.
    #[error("config file not found at {}", .path.display())]
    FileNotFound { path: PathBuf },
    /// The configuration sources could not be parsed.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Display name sent with every event.
    pub player_name: String,
    /// Home Assistant `host:port` or base URL.
    pub address: String,
    /// Home Assistant long-lived access token.
    pub token: String,
    /// Path to the game client log.
    pub log_file: PathBuf,
    /// Log every line read.
    pub debug: bool,
    /// Idle wait between checks for new log data, in milliseconds.
    pub poll_interval_ms: u64,
    /// Notifications allowed to wait for delivery before new ones are dropped.
    pub queue_capacity: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("player_name", &self.player_name)
            .field("address", &self.address)
            .field("token", &"[REDACTED]")
            .field("log_file", &self.log_file)
            .field("debug", &self.debug)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            address: String::new(),
            token: String::new(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            debug: false,
            poll_interval_ms: 100,
            queue_capacity: poeha_notify::DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Sources, later ones winning: built-in defaults, the default config
    /// file, `config_path`, then `POE_HA_*` environment variables. Required
    /// settings are not checked here; see [`Config::validate`].
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = default_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment.extract().map_err(|err| ConfigError::Invalid(Box::new(err)))
    }

    /// Checks that every setting needed to watch and notify is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("player_name", &self.player_name),
            ("address", &self.address),
            ("token", &self.token),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field,
                    env: format!("{ENV_PREFIX}{}", field.to_uppercase()),
                    config_file: default_config_path().map_or_else(
                        || "the config file".to_string(),
                        |path| path.display().to_string(),
                    ),
                });
            }
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Returns the platform-specific config directory for poe-ha.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("poe-ha"))
}

/// Returns the default config file location.
///
/// On Linux: `~/.config/poe-ha/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs_config_path().map(|p| p.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn test_default_config_path_ends_with_file_name() {
        let path = default_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert_eq!(path.parent().unwrap().file_name().unwrap(), "poe-ha");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert!(!config.debug);
    }

    #[test]
    fn test_load_from_file() {
        let (_temp, path) = write_config(
            r#"
            player_name = "You"
            address = "homeassistant.local:8123"
            token = "abc"
            log_file = "/tmp/Client.txt"
            debug = true
            "#,
        );

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.player_name, "You");
        assert_eq!(config.address, "homeassistant.local:8123");
        assert_eq!(config.token, "abc");
        assert_eq!(config.log_file, PathBuf::from("/tmp/Client.txt"));
        assert!(config.debug);
        assert_eq!(config.poll_interval_ms, 100);
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_token_is_reported() {
        let (_temp, path) = write_config(
            r#"
            player_name = "You"
            address = "homeassistant.local:8123"
            "#,
        );

        let config = Config::load_from(Some(&path)).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "token", .. }));
        assert!(err.to_string().contains("POE_HA_TOKEN"));
        assert!(err.to_string().contains("poe-ha init"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config = Config {
            player_name: "  ".to_string(),
            address: "ha:8123".to_string(),
            token: "abc".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField {
                field: "player_name",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let config = Config {
            player_name: "You".to_string(),
            address: "ha:8123".to_string(),
            token: "abc".to_string(),
            poll_interval_ms: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "poll_interval_ms",
                ..
            }
        ));
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = Config::load_from(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_file_is_invalid() {
        let (_temp, path) = write_config("poll_interval_ms = \"soon\"");
        let err = Config::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            token: "super-secret".to_string(),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
