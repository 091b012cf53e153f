//! Configuration management for the super-admin console

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote hotel API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session storage configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote hotel API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme, host and port of the hotel API; paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Session storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// File backing the session store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Storage keys searched for the bearer token, highest priority first
    #[serde(default = "default_token_keys")]
    pub token_keys: Vec<String>,

    /// Storage key the resolved admin identity is cached under
    #[serde(default = "default_identity_cache_key")]
    pub identity_cache_key: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json or pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".superadmin-session.json")
}

fn default_token_keys() -> Vec<String> {
    vec![
        "jwt_token".to_string(),
        "token".to_string(),
        "accessToken".to_string(),
    ]
}

fn default_identity_cache_key() -> String {
    "adminEmail".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            token_keys: default_token_keys(),
            identity_cache_key: default_identity_cache_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from `superadmin.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or parsed.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of the default file when given
    ///
    /// An explicit path must exist; the default file is optional. Environment
    /// variables prefixed with `SUPERADMIN_` override file values, using `__`
    /// between nested keys (`SUPERADMIN_API__BASE_URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded, parsed or validated.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("superadmin").required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("SUPERADMIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| crate::Error::configuration(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| crate::Error::configuration(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise only fail at request time
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> crate::Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            return Err(crate::Error::validation("api.base_url", "must not be empty"));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(crate::Error::validation(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(crate::Error::validation(
                "api.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.api.connect_timeout_secs == 0 {
            return Err(crate::Error::validation(
                "api.connect_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.session.token_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(crate::Error::validation(
                "session.token_keys",
                "at least one storage key is required",
            ));
        }
        Ok(())
    }
}
