#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for lwdump
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/lwdump/config.toml)
//! - Environment variables
//! - CLI flags

pub mod core;

pub use self::core::{DownloadConfig, GeneralConfig, NetworkConfig, ProtocolConfig};

use lwdump_errors::{ConfigError, Error};
use lwdump_types::{FailurePolicy, Url, MAX_CONCURRENT_DOWNLOADS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub protocol: ProtocolConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("lwdump").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
        let invalid = |field: &str, value: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        };

        // LWDUMP_DUMP_DIR
        if let Some(dir) = lookup("LWDUMP_DUMP_DIR") {
            if dir.is_empty() {
                return Err(invalid("LWDUMP_DUMP_DIR", dir).into());
            }
            self.general.dump_dir = PathBuf::from(dir);
        }

        // LWDUMP_API_BASE
        if let Some(base) = lookup("LWDUMP_API_BASE") {
            self.protocol.api_base = base;
        }

        // LWDUMP_MAX_CONCURRENT
        if let Some(limit) = lookup("LWDUMP_MAX_CONCURRENT") {
            self.download.max_concurrent = limit
                .parse()
                .map_err(|_| invalid("LWDUMP_MAX_CONCURRENT", limit))?;
        }

        // LWDUMP_FAILURE_POLICY
        if let Some(policy) = lookup("LWDUMP_FAILURE_POLICY") {
            self.download.failure_policy = policy
                .parse::<FailurePolicy>()
                .map_err(|_| invalid("LWDUMP_FAILURE_POLICY", policy))?;
        }

        // LWDUMP_TIMEOUT
        if let Some(timeout) = lookup("LWDUMP_TIMEOUT") {
            self.network.timeout = timeout
                .parse()
                .map_err(|_| invalid("LWDUMP_TIMEOUT", timeout))?;
        }

        Ok(())
    }

    /// Check values that serde cannot reject on its own
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a concurrency limit outside `1..=16`,
    /// an API base that is not an http(s) URL, or a key that is not 16, 24 or
    /// 32 bytes.
    pub fn validate(&self) -> Result<(), Error> {
        let limit = self.download.max_concurrent;
        if !(1..=MAX_CONCURRENT_DOWNLOADS).contains(&limit) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "download.max_concurrent must be between 1 and {MAX_CONCURRENT_DOWNLOADS}, got {limit}"
                ),
            }
            .into());
        }

        self.api_base()?;

        let key_len = self.protocol.encryption_key.len();
        if !matches!(key_len, 16 | 24 | 32) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "protocol.encryption_key must be 16, 24 or 32 bytes, got {key_len}"
                ),
            }
            .into());
        }

        Ok(())
    }

    /// Parsed bootstrap API base
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the value is not an http(s) URL.
    pub fn api_base(&self) -> Result<Url, Error> {
        let invalid = |reason: String| ConfigError::Invalid {
            message: format!("protocol.api_base '{}': {reason}", self.protocol.api_base),
        };

        let url = Url::parse(&self.protocol.api_base).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {other}")).into()),
        }
    }

    /// Per-request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout)
    }

    /// Connection establishment timeout
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.network.connect_timeout)
    }

    /// Pause between GET retries
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.network.retry_delay)
    }
}
