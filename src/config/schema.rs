//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.
//! The database connection string is deliberately absent: it is read from
//! the process environment at startup (see [`DatabaseConfig::dsn_env`]).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pool::PoolBounds;
use crate::resilience::retries::RetryPolicy;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Connection pool settings.
    pub database: DatabaseConfig,

    /// Retry behaviour while opening the pool at startup.
    pub startup: StartupConfig,

    /// Readiness probe settings.
    pub readiness: ReadinessConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Per-request timeout applied by the HTTP layer.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Name of the environment variable holding the connection string.
    pub dsn_env: String,

    /// Connections kept open at all times.
    pub min_connections: u32,

    /// Upper bound on open connections.
    pub max_connections: u32,

    /// How long a caller may wait for a free connection.
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn bounds(&self) -> PoolBounds {
        PoolBounds {
            min_size: self.min_connections,
            max_size: self.max_connections,
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn_env: "DATABASE_DSN".to_string(),
            min_connections: 1,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

/// Startup retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Total attempts to open the pool before giving up.
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds).
    pub retry_delay_ms: u64,
}

impl StartupConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            retry_delay_ms: 1000,
        }
    }
}

/// Readiness probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Deadline for a single probe (acquire + round trip), in milliseconds.
    pub probe_timeout_ms: u64,
}

impl ReadinessConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
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
    /// Output format for log lines.
    pub log_format: LogFormat,

    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "analytics_api=info,tower_http=info".to_string(),
        }
    }
}
