//! Timeout enforcement.
//!
//! Every call that reaches the database on a request path gets a deadline.
//! Timeout errors are distinct from the operation's own errors.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Run `fut`, failing with [`Elapsed`] if it does not finish within `limit`.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Elapsed(limit))
}
