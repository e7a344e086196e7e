use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BaristaError, Result};

/// Largest accepted value for `chat.max_message_length`.
pub const MAX_MESSAGE_LENGTH_CAP: usize = 1024 * 1024;

/// Top-level configuration for the Barista service.
///
/// Loaded from `~/.barista/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaristaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl BaristaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BaristaConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chat.default_limit == 0 {
            return Err(BaristaError::Config(
                "chat.default_limit must be at least 1".to_string(),
            ));
        }
        if self.chat.max_message_length > MAX_MESSAGE_LENGTH_CAP {
            return Err(BaristaError::Config(format!(
                "chat.max_message_length must be at most {}",
                MAX_MESSAGE_LENGTH_CAP
            )));
        }
        if self.chat.catalog_timeout_ms == 0 {
            return Err(BaristaError::Config(
                "chat.catalog_timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.sessions.shards == 0 {
            return Err(BaristaError::Config(
                "sessions.shards must be at least 1".to_string(),
            ));
        }
        if self.sessions.capacity == 0 {
            return Err(BaristaError::Config(
                "sessions.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite catalog.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// HTTP port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.barista/data".to_string(),
            log_level: "info".to_string(),
            port: 3040,
        }
    }
}

/// Recommendation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the chat endpoint answers at all.
    pub enabled: bool,
    /// Longest accepted message, in bytes.
    pub max_message_length: usize,
    /// Number of menu suggestions when no sort or energy pick applies.
    pub default_limit: usize,
    /// Upper bound on a single catalog read.
    pub catalog_timeout_ms: u64,
    /// Prefix for prices in replies.
    pub currency_symbol: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 2000,
            default_limit: 3,
            catalog_timeout_ms: 2000,
            currency_symbol: "$".to_string(),
        }
    }
}

/// In-memory session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is forgotten.
    pub ttl_minutes: u32,
    /// Maximum number of live sessions across all shards.
    pub capacity: usize,
    /// Number of independently locked shards.
    pub shards: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            capacity: 10_000,
            shards: 16,
        }
    }
}

/// HTTP layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Requests per second across all rate-limited routes.
    pub rate_limit_per_sec: u64,
    /// Extra CORS origins on top of the localhost defaults.
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_sec: 100,
            allowed_origins: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BaristaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.port, 3040);
        assert_eq!(config.chat.default_limit, 3);
        assert_eq!(config.sessions.shards, 16);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [chat]
            currency_symbol = "€"
        "#;
        let config: BaristaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.currency_symbol, "€");
        assert_eq!(config.chat.default_limit, 3);
        assert_eq!(config.sessions.ttl_minutes, 30);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: BaristaConfig = toml::from_str("").unwrap();
        assert!(config.chat.enabled);
        assert_eq!(config.api.rate_limit_per_sec, 100);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = BaristaConfig::default();
        config.chat.default_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BaristaError::Config(_)));
        assert!(err.to_string().contains("default_limit"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = BaristaConfig::default();
        config.chat.catalog_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_message_length() {
        let mut config = BaristaConfig::default();
        config.chat.max_message_length = MAX_MESSAGE_LENGTH_CAP;
        assert!(config.validate().is_ok());

        config.chat.max_message_length = MAX_MESSAGE_LENGTH_CAP + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_message_length"));
    }

    #[test]
    fn test_validate_rejects_zero_shards_and_capacity() {
        let mut config = BaristaConfig::default();
        config.sessions.shards = 0;
        assert!(config.validate().is_err());

        let mut config = BaristaConfig::default();
        config.sessions.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nport = 8099\n\n[sessions]\nttl_minutes = 5\n").unwrap();

        let loaded = BaristaConfig::load(&path).unwrap();
        assert_eq!(loaded.general.port, 8099);
        assert_eq!(loaded.sessions.ttl_minutes, 5);
        assert_eq!(loaded.chat.default_limit, 3);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BaristaConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, BaristaError::Io(_)));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\ndefault_limit = 0\n").unwrap();

        let err = BaristaConfig::load(&path).unwrap_err();
        assert!(matches!(err, BaristaError::Config(_)));
    }
}
