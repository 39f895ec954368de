//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and returns every
//! problem found rather than stopping at the first one.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("listener.request_timeout_secs must be greater than zero")]
    RequestTimeout,

    #[error("database.dsn_env must name an environment variable")]
    DsnEnv,

    #[error("database.min_connections must be at least 1")]
    MinConnections,

    #[error("database.max_connections ({max}) must be >= min_connections ({min})")]
    MaxConnections { min: u32, max: u32 },

    #[error("database.acquire_timeout_secs must be greater than zero")]
    AcquireTimeout,

    #[error("startup.max_attempts must be at least 1")]
    MaxAttempts,

    #[error("readiness.probe_timeout_ms must be greater than zero")]
    ProbeTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    let db = &config.database;
    if db.dsn_env.trim().is_empty() {
        errors.push(ValidationError::DsnEnv);
    }
    if db.min_connections < 1 {
        errors.push(ValidationError::MinConnections);
    }
    if db.max_connections < db.min_connections {
        errors.push(ValidationError::MaxConnections {
            min: db.min_connections,
            max: db.max_connections,
        });
    }
    if db.acquire_timeout_secs == 0 {
        errors.push(ValidationError::AcquireTimeout);
    }

    if config.startup.max_attempts == 0 {
        errors.push(ValidationError::MaxAttempts);
    }
    if config.readiness.probe_timeout_ms == 0 {
        errors.push(ValidationError::ProbeTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
