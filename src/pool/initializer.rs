//! Opening the pool against a store that may not be up yet.
//!
//! The backing store may come up after this service does, so opening is
//! retried with a constant delay up to a bounded number of attempts.

use thiserror::Error;

use crate::pool::handle::{PoolBounds, PoolConnector, PoolError, PoolHandle};
use crate::resilience::retries::{retry_fixed, RetryPolicy, Succeeded};

/// Every attempt to open the pool failed. Fatal to startup.
#[derive(Debug, Error)]
#[error("pool unavailable after {attempts} attempt(s): {source}")]
pub struct PoolUnavailable {
    pub attempts: u32,
    #[source]
    pub source: PoolError,
}

/// Open a pool via `connector`, retrying per `policy`.
///
/// On success the returned value carries the attempt that succeeded. Failed
/// attempts leave no open connections; the connector cleans up after itself.
pub async fn open_with_retries(
    connector: &dyn PoolConnector,
    dsn: &str,
    bounds: PoolBounds,
    policy: &RetryPolicy,
) -> Result<Succeeded<PoolHandle>, PoolUnavailable> {
    tracing::info!(
        min_size = bounds.min_size,
        max_size = bounds.max_size,
        max_attempts = policy.max_attempts(),
        delay = ?policy.delay(),
        max_wait = ?policy.total_delay(),
        "Opening connection pool"
    );

    let opened = retry_fixed(policy, "open_pool", |attempt| {
        tracing::debug!(attempt, "Connecting to backing store");
        connector.open(dsn, bounds)
    })
    .await
    .map_err(|exhausted| PoolUnavailable {
        attempts: exhausted.attempts,
        source: exhausted.last_error,
    })?;

    tracing::info!(
        attempts = opened.attempts,
        size = opened.value.size(),
        idle = opened.value.num_idle(),
        "Connection pool ready"
    );
    Ok(opened)
}
