//! Readiness probing.
//!
//! # Responsibilities
//! - Answer "can the backing store be reached through the pool right now?"
//! - Report the underlying failure as text for the `/ready` response
//!
//! # Design Decisions
//! - Point-in-time: never cached, never retried
//! - One failed probe says nothing about the pool; it stays published
//! - No I/O when the pool has not been published

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::lifecycle::manager::PoolLifecycle;
use crate::pool::PoolError;
use crate::resilience::timeouts::with_deadline;

/// Why a single probe failed. Recoverable; the next probe starts fresh.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("pool-not-initialized")]
    NotInitialized,

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("readiness probe timed out after {0:?}")]
    TimedOut(Duration),
}

/// Body of the `/ready` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReadinessReport {
    pub fn ready() -> Self {
        Self {
            ready: true,
            reason: None,
        }
    }

    pub fn not_ready(reason: impl Into<String>) -> Self {
        Self {
            ready: false,
            reason: Some(reason.into()),
        }
    }
}

impl From<Result<(), ProbeError>> for ReadinessReport {
    fn from(result: Result<(), ProbeError>) -> Self {
        match result {
            Ok(()) => Self::ready(),
            Err(e) => Self::not_ready(e.to_string()),
        }
    }
}

/// Probes the published pool with one real round trip.
#[derive(Debug, Clone)]
pub struct ReadinessProber {
    lifecycle: Arc<PoolLifecycle>,
    timeout: Duration,
}

impl ReadinessProber {
    pub fn new(lifecycle: Arc<PoolLifecycle>, timeout: Duration) -> Self {
        Self { lifecycle, timeout }
    }

    /// Borrow a connection, run the scalar echo, return the connection.
    pub async fn check(&self) -> Result<(), ProbeError> {
        let pool = self.lifecycle.current().ok_or(ProbeError::NotInitialized)?;

        with_deadline(self.timeout, pool.ping())
            .await
            .map_err(|elapsed| ProbeError::TimedOut(elapsed.0))??;
        Ok(())
    }

    pub async fn probe(&self) -> ReadinessReport {
        let start = Instant::now();
        let result = self.check().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => tracing::debug!(elapsed_ms, "Readiness probe succeeded"),
            Err(ProbeError::NotInitialized) => {
                tracing::debug!(status = %self.lifecycle.status(), "Readiness probe: pool not published")
            }
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "Readiness probe failed"),
        }

        result.into()
    }
}
