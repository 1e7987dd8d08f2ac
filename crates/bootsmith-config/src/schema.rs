//! Configuration schema definitions.
//!
//! Presence-driven enablement: the database, cache, storage and queue
//! services only register when their section carries the required
//! settings. The transport services (http, socket), scheduler and event
//! bus are on by default and can be disabled individually.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub socket: SocketConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub queue: QueueConfig,
}

impl Config {
    /// Application source root where convention directories live.
    pub fn app_root(&self) -> PathBuf {
        PathBuf::from(&self.server.app_root)
    }
}

/// Server (shared listener) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Root of the application tree holding the convention directories.
    #[serde(default = "default_app_root")]
    pub app_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            app_root: default_app_root(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_app_root() -> String {
    "src".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_directory")]
    pub directory: String,

    #[serde(default)]
    pub debug: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            debug: false,
        }
    }
}

fn default_log_directory() -> String {
    "./logs".to_string()
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub disabled: bool,

    /// JSON body size ceiling in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            body_limit: default_body_limit(),
        }
    }
}

fn default_body_limit() -> usize {
    100 * 1024 * 1024
}

/// WebSocket transport configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocketConfig {
    #[serde(default)]
    pub disabled: bool,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub disabled: bool,
}

/// Event bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub disabled: bool,

    /// Default timeout for `emit_async`, in milliseconds.
    #[serde(default = "default_event_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            timeout_ms: default_event_timeout_ms(),
        }
    }
}

fn default_event_timeout_ms() -> u64 {
    30_000
}

/// Database configuration. Registered only when `url` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Cache configuration. Registered only when `url` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub url: Option<String>,
}

/// Object storage configuration. Registered only when `root` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub root: Option<String>,
}

/// Job queue configuration. Registered only when `queues` is non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueConfig {
    #[serde(default)]
    pub queues: Vec<String>,
}
