//! Configuration loading and validation.
//!
//! Values come from an optional TOML file, then `PLANETBOT__*` environment
//! variables (e.g. `PLANETBOT__SERVER__PORT=9000`), then defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment prefix for overrides.
pub const ENV_PREFIX: &str = "PLANETBOT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Chat platform configuration for outgoing notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// REST API base URL
    #[serde(default = "default_api_base")]
    pub api_base: Url,

    /// Channel completions are posted to; log only when unset
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Environment variable holding the bot credential
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> Url {
    Url::parse("https://discord.com/api/v10").expect("default API base is a valid URL")
}

fn default_token_env() -> String {
    "API_ACCESS".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            channel_id: None,
            token_env: default_token_env(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ChatConfig {
    /// The credential from the environment, if set and non-empty.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_reference_dir")]
    pub reference_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between upgrade scans
    #[serde(default = "default_scan_interval")]
    pub scan_interval_seconds: u64,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_reference_dir() -> PathBuf {
    PathBuf::from("./data/reference")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_scan_interval() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            reference_dir: default_reference_dir(),
            log_level: default_log_level(),
            scan_interval_seconds: default_scan_interval(),
            server: ServerConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from an optional TOML file plus environment overrides.
    /// A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Scan interval must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.chat.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Chat timeout must be greater than 0".to_string(),
            ));
        }

        if matches!(&self.chat.channel_id, Some(id) if id.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "Chat channel id must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_seconds)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.reference_dir, PathBuf::from("./data/reference"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.scan_interval_seconds, 60);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.chat.token_env, "API_ACCESS");
        assert!(config.chat.channel_id.is_none());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_interval() {
        let mut config = AppConfig::default();
        config.scan_interval_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_channel() {
        let mut config = AppConfig::default();
        config.chat.channel_id = Some("  ".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/srv/planets"
scan_interval_seconds = 30

[chat]
channel_id = "123456"
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/planets"));
        assert_eq!(config.scan_interval(), Duration::from_secs(30));
        assert_eq!(config.chat.channel_id.as_deref(), Some("123456"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "scan_interval_seconds = 0\n").unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = config.to_toml().unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.chat.api_base, parsed.chat.api_base);
    }
}
