//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the catalog service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Where the catalog lives.
    pub storage: StorageConfig,

    /// Request log sinks and process log level.
    pub logging: LoggingConfig,

    /// Span export settings.
    pub tracing: TracingConfig,

    /// Prometheus endpoint settings.
    pub metrics: MetricsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Catalog storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON catalog file. Created on first write.
    pub catalog_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: "course_catalog.json".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Process log filter (trace, debug, info, warn, error or an EnvFilter directive).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,

    /// Rotating request log file. `None` disables the file sink.
    pub file: Option<String>,

    /// Rotate the request log once it would exceed this many bytes.
    pub max_bytes: u64,

    /// Number of rotated files to keep. Zero disables rotation.
    pub backup_count: usize,

    /// Mirror request records to the console.
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("app_log_rotating.json".to_string()),
            max_bytes: 5 * 1024 * 1024, // 5MB
            backup_count: 5,
            console: true,
        }
    }
}

/// Span export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Enable span export. When disabled, spans are still built but discarded.
    pub enabled: bool,

    /// `service.name` attached to every span.
    pub service_name: String,

    /// Export once this many spans are queued.
    pub max_batch_size: usize,

    /// Export queued spans at least this often, in milliseconds.
    pub flush_interval_ms: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "course-catalog-service".to_string(),
            max_batch_size: 512,
            flush_interval_ms: 5000,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus endpoint.
    pub enabled: bool,

    /// Metrics endpoint bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "127.0.0.1:9090".to_string(),
        }
    }
}
