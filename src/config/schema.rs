//! Configuration schema definitions.
//!
//! Collector configuration, deserialized from TOML. Every field has a
//! default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Default UDP port flow records are sent to.
pub const DEFAULT_COLLECTOR_PORT: u16 = 9995;

/// Largest payload a UDP datagram can carry.
pub const MAX_UDP_PAYLOAD: usize = 65_535;

/// Root configuration for the collector.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct CollectorConfig {
    /// UDP listener configuration.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// UDP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9995").
    pub bind_address: String,

    /// Receive buffer size; larger datagrams are truncated and rejected.
    pub max_datagram_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", DEFAULT_COLLECTOR_PORT),
            max_datagram_size: MAX_UDP_PAYLOAD,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
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
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
