//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the telemetry
//! pipeline. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the telemetry pipeline and its demo host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Host HTTP server settings.
    pub server: ServerConfig,

    /// Metrics sink and reporting interval.
    pub metrics: MetricsConfig,

    /// Log sink and capture limits.
    pub logging: LoggingConfig,

    /// Retry and timeout policy shared by both sinks.
    pub delivery: DeliveryConfig,

    /// Local diagnostics (tracing level, self-metrics endpoint).
    pub observability: ObservabilityConfig,
}

/// Host HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Metrics sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable periodic metric reporting.
    pub enabled: bool,

    /// Value of the `source` tag on every measurement line.
    pub source: String,

    /// Push endpoint for newline-delimited measurement lines.
    pub url: String,

    /// User identifier half of the bearer credential.
    pub user_id: String,

    /// API key half of the bearer credential.
    pub api_key: String,

    /// Reporting interval in seconds.
    pub interval_secs: u64,
}

impl MetricsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source: "jwt-pizza-service-dev".to_string(),
            url: String::new(),
            user_id: String::new(),
            api_key: String::new(),
            interval_secs: 60,
        }
    }
}

/// Log sink configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable shipping of log records to the log sink.
    pub enabled: bool,

    /// `component` label attached to every stream.
    pub component: String,

    /// Push endpoint for log streams.
    pub url: String,

    /// User identifier half of the bearer credential.
    pub user_id: String,

    /// API key half of the bearer credential.
    pub api_key: String,

    /// Maximum characters kept from a redacted field.
    pub max_field_len: usize,

    /// Largest request/response body (bytes) buffered for capture.
    pub max_capture_bytes: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            component: "jwt-pizza-service-dev".to_string(),
            url: String::new(),
            user_id: String::new(),
            api_key: String::new(),
            max_field_len: 200,
            max_capture_bytes: 1024 * 1024,
        }
    }
}

/// Retry configuration for sink delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Maximum number of attempts per payload (first try included).
    pub max_attempts: u32,

    /// Base delay for linear backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay in milliseconds.
    pub max_delay_ms: u64,

    /// Deadline for one attempt in seconds.
    pub attempt_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            attempt_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Expose the pipeline's own counters for Prometheus scraping.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9464".to_string(),
        }
    }
}
