//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (port, bind address, connection limit).
    pub listener: ListenerConfig,

    /// Buffer and chunk size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port to listen on, on all interfaces (dual-stack when available).
    pub port: u16,

    /// Explicit bind address (e.g., "127.0.0.1:8080"); overrides `port`.
    pub bind_address: Option<String>,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_address: None,
            max_connections: 1024,
        }
    }
}

/// Size limits for the per-connection buffers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request head size, in bytes.
    pub max_request_bytes: usize,

    /// Size of each upstream read while relaying.
    pub relay_chunk_bytes: usize,

    /// Capacity of the response header accumulator.
    pub response_header_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_bytes: 32 * 1024,
            relay_chunk_bytes: 8 * 1024,
            response_header_bytes: 16 * 1024,
        }
    }
}

/// Timeout configuration for various operations. `0` disables a timeout.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for the client to send a complete request head.
    pub client_read_secs: u64,

    /// Per-address upstream connection establishment timeout.
    pub connect_secs: u64,

    /// Time allowed to forward the request upstream.
    pub write_secs: u64,

    /// Maximum stall of any single read or write while relaying.
    pub idle_secs: u64,

    /// Time to wait for in-flight connections after a shutdown signal.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_read_secs: 30,
            connect_secs: 10,
            write_secs: 30,
            idle_secs: 60,
            shutdown_grace_secs: 10,
        }
    }
}

impl TimeoutConfig {
    pub fn client_read(&self) -> Option<Duration> {
        secs(self.client_read_secs)
    }

    pub fn connect(&self) -> Option<Duration> {
        secs(self.connect_secs)
    }

    pub fn write(&self) -> Option<Duration> {
        secs(self.write_secs)
    }

    pub fn idle(&self) -> Option<Duration> {
        secs(self.idle_secs)
    }

    pub fn shutdown_grace(&self) -> Option<Duration> {
        secs(self.shutdown_grace_secs)
    }
}

fn secs(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
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
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
