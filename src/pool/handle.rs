//! Pool handle and the contract expected from a pooling backend.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Errors surfaced by the pooling layer.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Driver-level failure (connect, acquire timeout, query).
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The handle has been closed; no further acquisition is possible.
    #[error("pool is closed")]
    Closed,

    /// The round trip returned something other than the echoed scalar.
    #[error("unexpected reply to round trip: expected 1, got {0}")]
    UnexpectedReply(i64),

    /// Backend-specific failure that is not a driver error.
    #[error("{0}")]
    Backend(String),
}

/// Minimum and maximum number of connections a pool may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolBounds {
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for PoolBounds {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 5,
        }
    }
}

/// A connection borrowed from a pool. Dropping it returns it to the pool.
#[async_trait]
pub trait PooledConnection: Send {
    /// Issue a schema-free scalar echo (`SELECT 1`) and return the scalar.
    async fn select_one(&mut self) -> Result<i64, PoolError>;
}

/// The pooling library behind a [`PoolHandle`].
///
/// Queueing, reuse and admission are the backend's business.
#[async_trait]
pub trait PoolBackend: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn PooledConnection>, PoolError>;

    async fn close(&self) -> Result<(), PoolError>;

    /// Open connections (idle + in use).
    fn size(&self) -> u32;

    fn num_idle(&self) -> usize;
}

/// Opens pools. Implementations must not leave connections open when
/// `open` fails.
#[async_trait]
pub trait PoolConnector: Send + Sync {
    async fn open(&self, dsn: &str, bounds: PoolBounds) -> Result<PoolHandle, PoolError>;
}

/// Result of [`PoolHandle::close`].
#[derive(Debug)]
pub enum CloseResult {
    Closed,
    AlreadyClosed,
    Failed(PoolError),
}

/// An opened, bounded set of connections to one backing store.
///
/// Once closed, every acquisition fails with [`PoolError::Closed`].
pub struct PoolHandle {
    backend: Box<dyn PoolBackend>,
    bounds: PoolBounds,
    closed: AtomicBool,
}

impl PoolHandle {
    pub fn new(backend: Box<dyn PoolBackend>, bounds: PoolBounds) -> Self {
        Self {
            backend,
            bounds,
            closed: AtomicBool::new(false),
        }
    }

    pub fn bounds(&self) -> PoolBounds {
        self.bounds
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn size(&self) -> u32 {
        self.backend.size()
    }

    pub fn num_idle(&self) -> usize {
        self.backend.num_idle()
    }

    /// Borrow one connection.
    pub async fn acquire(&self) -> Result<Box<dyn PooledConnection>, PoolError> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }
        self.backend.acquire().await
    }

    /// Acquire a connection, run the scalar echo, and give the connection back.
    pub async fn ping(&self) -> Result<(), PoolError> {
        let mut conn = self.acquire().await?;
        let reply = conn.select_one().await;
        drop(conn);

        match reply? {
            1 => Ok(()),
            other => Err(PoolError::UnexpectedReply(other)),
        }
    }

    /// Close the pool. Only the first call reaches the backend.
    pub async fn close(&self) -> CloseResult {
        if self.closed.swap(true, Ordering::AcqRel) {
            return CloseResult::AlreadyClosed;
        }
        match self.backend.close().await {
            Ok(()) => CloseResult::Closed,
            Err(e) => CloseResult::Failed(e),
        }
    }
}

impl fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHandle")
            .field("bounds", &self.bounds)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
