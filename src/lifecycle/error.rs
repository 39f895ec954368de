//! Errors that abort or refuse a lifecycle transition.

use thiserror::Error;

use crate::config::ConfigError;
use crate::pool::PoolUnavailable;

/// Startup and lifecycle errors.
///
/// `Configuration` and `PoolUnavailable` are fatal: the process must not
/// serve traffic after either.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Missing or invalid configuration. Never retried.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The backing store stayed unreachable for every attempt.
    #[error(transparent)]
    PoolUnavailable(#[from] PoolUnavailable),

    #[error("connection pool already started")]
    AlreadyStarted,

    /// The pool was closed; a process run does not reopen it.
    #[error("connection pool lifecycle already stopped")]
    Stopped,

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl LifecycleError {
    /// True for errors that must end the process before it serves traffic.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LifecycleError::Configuration(_)
                | LifecycleError::PoolUnavailable(_)
                | LifecycleError::Bind { .. }
        )
    }
}
