//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the director.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Method name of the OTLP trace export call.
pub const OTLP_TRACE_EXPORT: &str = "/opentelemetry.proto.collector.trace.v1.TraceService/Export";

/// Root configuration for the director.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// The single backend all recognized calls are forwarded to.
    pub backend: BackendConfig,

    /// Methods the director forwards.
    pub routes: Vec<RouteConfig>,

    /// Dial retry configuration.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            routes: default_routes(),
            retries: RetryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend address (e.g., "localhost:4317").
    pub target: String,

    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Optional TLS settings. Plaintext HTTP/2 when absent.
    pub tls: Option<TlsConfig>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            target: "localhost:4317".to_string(),
            connect_timeout_ms: 5_000,
            tls: None,
        }
    }
}

/// TLS configuration for the backend connection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to a CA certificate bundle (PEM) used to verify the backend.
    pub ca_cert_path: Option<String>,

    /// Server name to verify against, if it differs from the target host.
    pub domain_name: Option<String>,
}

/// A forwarded method.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Fully qualified method, e.g. "/pkg.Service/Method".
    pub method: String,
}

fn default_routes() -> Vec<RouteConfig> {
    vec![RouteConfig {
        name: "otlp-traces".to_string(),
        method: OTLP_TRACE_EXPORT.to_string(),
    }]
}

/// Dial retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Consecutive failed dials before giving up until restart.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
