//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the demo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Relay front-end settings.
    pub relay: RelayConfig,

    /// Session cache settings.
    pub cache: CacheConfig,

    /// Indexed field extraction settings.
    pub extraction: ExtractionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9001").
    pub bind_address: String,

    /// Maximum accepted request body in bytes (multipart uploads included).
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9001".to_string(),
            max_body_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Relay front-end configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Host[:port] of the relay server, without scheme.
    pub server_base: String,

    /// Path on the relay server that accepts injected results.
    pub injection_path: String,

    /// Outbound request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server_base: "localhost:8000".to_string(),
            injection_path: "/event".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Session cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root under which session directories are created.
    pub root: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: std::env::temp_dir()
                .join("vision-relay")
                .to_string_lossy()
                .into_owned(),
        }
    }
}

/// Indexed field extraction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound on indices scanned per prefix.
    pub max_indexed_fields: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_indexed_fields: 256,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time to handle a request) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
