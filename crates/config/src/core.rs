//! Configuration sections shared across crates

use lwdump_types::protocol::{
    APP_VERSION, DEFAULT_API_BASE, DEFAULT_ENCRYPTION_KEY, PLATFORM_TYPE, RESOURCE_VERSION,
    UNITY_VERSION, USER_AGENT,
};
use lwdump_types::{FailurePolicy, MAX_CONCURRENT_DOWNLOADS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root of everything written to disk
    #[serde(default = "default_dump_dir")]
    pub dump_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            dump_dir: default_dump_dir(),
        }
    }
}

/// Game API protocol settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Bootstrap address; replaced by the handshake response
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Key used until the server rotates it
    #[serde(default = "default_encryption_key")]
    pub encryption_key: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default = "default_app_version")]
    pub app_version: i32,
    #[serde(default = "default_resource_version")]
    pub resource_version: i32,
    #[serde(default = "default_platform_type")]
    pub platform_type: i32,
    #[serde(default = "default_unity_version")]
    pub unity_version: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            encryption_key: default_encryption_key(),
            device_id: None,
            app_version: APP_VERSION,
            resource_version: RESOURCE_VERSION,
            platform_type: PLATFORM_TYPE,
            unity_version: default_unity_version(),
            user_agent: default_user_agent(),
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    /// Extra attempts for idempotent GETs; API posts are never retried
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 300, // 5 minutes
            connect_timeout: 30,
            retries: 0,
            retry_delay: 1,
        }
    }
}

/// Bulk download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Categories to dump, in order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            failure_policy: FailurePolicy::default(),
            categories: default_categories(),
        }
    }
}

// Default value functions for serde
fn default_dump_dir() -> PathBuf {
    PathBuf::from("dump")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_encryption_key() -> String {
    DEFAULT_ENCRYPTION_KEY.to_string()
}

fn default_app_version() -> i32 {
    APP_VERSION
}

fn default_resource_version() -> i32 {
    RESOURCE_VERSION
}

fn default_platform_type() -> i32 {
    PLATFORM_TYPE
}

fn default_unity_version() -> String {
    UNITY_VERSION.to_string()
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

fn default_max_concurrent() -> usize {
    MAX_CONCURRENT_DOWNLOADS
}

fn default_categories() -> Vec<String> {
    vec![
        "resource".to_string(),
        "master".to_string(),
        "assetbundle".to_string(),
    ]
}
