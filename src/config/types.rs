use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote user API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the `/api/...` paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Total request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// Connection timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Freshness and retention of cached query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a user list stays fresh after a fetch (default: 30).
    #[serde(default = "default_collection_stale")]
    pub collection_stale_seconds: u64,
    /// How long a single user stays fresh after a fetch (default: 60).
    #[serde(default = "default_item_stale")]
    pub item_stale_seconds: u64,
    /// Inactivity window before an unobserved entry is dropped (default: 300).
    #[serde(default = "default_gc")]
    pub gc_seconds: u64,
    /// How often the background collector runs (default: 60).
    #[serde(default = "default_gc_interval")]
    pub gc_interval_seconds: u64,
}

/// Local files kept between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Session file; defaults to `<data_dir>/user-console/session.json`.
    #[serde(default)]
    pub session_path: Option<PathBuf>,
    /// Draft directory; defaults to `<data_dir>/user-console/drafts`.
    #[serde(default)]
    pub drafts_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_collection_stale() -> u64 {
    30
}

fn default_item_stale() -> u64 {
    60
}

fn default_gc() -> u64 {
    300
}

fn default_gc_interval() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_seconds))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            collection_stale_seconds: default_collection_stale(),
            item_stale_seconds: default_item_stale(),
            gc_seconds: default_gc(),
            gc_interval_seconds: default_gc_interval(),
        }
    }
}

impl CacheConfig {
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_seconds)
    }
}

impl StorageConfig {
    fn app_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("user-console")
    }

    pub fn session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| Self::app_data_dir().join("session.json"))
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.drafts_dir
            .clone()
            .unwrap_or_else(|| Self::app_data_dir().join("drafts"))
    }
}
