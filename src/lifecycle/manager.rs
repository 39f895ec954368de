//! Ownership of the process-wide connection pool.
//!
//! [`PoolLifecycle`] is the only writer of the shared pool slot. The slot is
//! written twice per process run: once when `start` publishes an opened
//! handle, once when `stop` empties it. Request handlers only ever take
//! snapshots through [`PoolLifecycle::current`].

use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{dsn_from_env, require_dsn, DatabaseConfig};
use crate::health::state::PoolStatus;
use crate::lifecycle::error::LifecycleError;
use crate::pool::{open_with_retries, CloseResult, PoolConnector, PoolError, PoolHandle};
use crate::resilience::retries::RetryPolicy;

/// What happened when the lifecycle was stopped.
#[derive(Debug)]
pub enum StopOutcome {
    /// The published pool was closed.
    Closed,
    /// Closing failed. The slot is empty regardless; the error was logged.
    CloseFailed(PoolError),
    /// A previous `stop` already closed the pool.
    AlreadyStopped,
    /// Nothing was ever published.
    NeverStarted,
}

/// Owns the single shared pool for the running lifetime of the service.
pub struct PoolLifecycle {
    connector: Arc<dyn PoolConnector>,
    database: DatabaseConfig,
    policy: RetryPolicy,
    slot: ArcSwapOption<PoolHandle>,
    stopped: AtomicBool,
}

impl PoolLifecycle {
    pub fn new(
        connector: Arc<dyn PoolConnector>,
        database: DatabaseConfig,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            connector,
            database,
            policy,
            slot: ArcSwapOption::empty(),
            stopped: AtomicBool::new(false),
        }
    }

    /// Read the connection string from the environment and open the pool.
    pub async fn start(&self) -> Result<(), LifecycleError> {
        let dsn = dsn_from_env(&self.database.dsn_env)?;
        self.open_and_publish(&dsn).await
    }

    /// Same as [`start`](Self::start) with an explicitly supplied value.
    pub async fn start_with_dsn(&self, dsn: Option<String>) -> Result<(), LifecycleError> {
        let dsn = require_dsn(dsn, &self.database.dsn_env)?;
        self.open_and_publish(&dsn).await
    }

    async fn open_and_publish(&self, dsn: &str) -> Result<(), LifecycleError> {
        match self.status() {
            PoolStatus::Live => return Err(LifecycleError::AlreadyStarted),
            PoolStatus::Closed => return Err(LifecycleError::Stopped),
            PoolStatus::Uninitialized => {}
        }

        let opened = open_with_retries(
            self.connector.as_ref(),
            dsn,
            self.database.bounds(),
            &self.policy,
        )
        .await?;

        let handle = Arc::new(opened.value);
        if self.stopped.load(Ordering::Acquire) {
            Self::discard(&handle).await;
            return Err(LifecycleError::Stopped);
        }

        let previous = self
            .slot
            .compare_and_swap(&None::<Arc<PoolHandle>>, Some(handle.clone()));
        if previous.is_some() {
            // A concurrent start published first; this handle was never visible.
            Self::discard(&handle).await;
            return Err(LifecycleError::AlreadyStarted);
        }
        tracing::info!(attempts = opened.attempts, "Connection pool published");
        Ok(())
    }

    async fn discard(handle: &PoolHandle) {
        if let CloseResult::Failed(e) = handle.close().await {
            tracing::warn!(error = %e, "Failed to close surplus connection pool");
        }
    }

    /// Close the published pool, if any. Safe to call more than once.
    ///
    /// A close failure is logged and reported in the outcome but never
    /// returned as an error.
    pub async fn stop(&self) -> StopOutcome {
        if self.slot.load().is_none() {
            return if self.stopped.load(Ordering::Acquire) {
                tracing::debug!("Connection pool already stopped");
                StopOutcome::AlreadyStopped
            } else {
                tracing::debug!("No connection pool to stop");
                StopOutcome::NeverStarted
            };
        }

        // Marked stopped before the slot empties, so observers go straight
        // from Live to Closed.
        self.stopped.store(true, Ordering::Release);
        let Some(handle) = self.slot.swap(None) else {
            tracing::debug!("Connection pool already stopped");
            return StopOutcome::AlreadyStopped;
        };

        let outcome = match handle.close().await {
            CloseResult::Closed => {
                tracing::info!("Connection pool closed");
                StopOutcome::Closed
            }
            CloseResult::AlreadyClosed => StopOutcome::AlreadyStopped,
            CloseResult::Failed(e) => {
                tracing::error!(error = %e, "Failed to close connection pool");
                StopOutcome::CloseFailed(e)
            }
        };

        // Let close-related work the pool spawned make progress before
        // the caller moves on to exit.
        tokio::task::yield_now().await;
        outcome
    }

    /// Snapshot of the published pool, if live.
    pub fn current(&self) -> Option<Arc<PoolHandle>> {
        self.slot.load_full()
    }

    pub fn status(&self) -> PoolStatus {
        if self.slot.load().is_some() {
            PoolStatus::Live
        } else if self.stopped.load(Ordering::Acquire) {
            PoolStatus::Closed
        } else {
            PoolStatus::Uninitialized
        }
    }
}

impl std::fmt::Debug for PoolLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolLifecycle")
            .field("status", &self.status())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::pool::{PoolBackend, PoolBounds, PooledConnection};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct Backend {
        closes: Arc<AtomicUsize>,
        fail_close: bool,
    }

    #[async_trait]
    impl PoolBackend for Backend {
        async fn acquire(&self) -> Result<Box<dyn PooledConnection>, PoolError> {
            Err(PoolError::Backend("unused".into()))
        }
        async fn close(&self) -> Result<(), PoolError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                Err(PoolError::Backend("socket already gone".into()))
            } else {
                Ok(())
            }
        }
        fn size(&self) -> u32 {
            1
        }
        fn num_idle(&self) -> usize {
            1
        }
    }

    struct Connector {
        opens: AtomicUsize,
        closes: Arc<AtomicUsize>,
        fail_close: bool,
    }

    impl Connector {
        fn new(fail_close: bool) -> Arc<Self> {
            Arc::new(Self {
                opens: AtomicUsize::new(0),
                closes: Arc::new(AtomicUsize::new(0)),
                fail_close,
            })
        }
    }

    #[async_trait]
    impl PoolConnector for Connector {
        async fn open(&self, _dsn: &str, bounds: PoolBounds) -> Result<PoolHandle, PoolError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            // Lets concurrent starts interleave on a single-threaded runtime.
            tokio::task::yield_now().await;
            Ok(PoolHandle::new(
                Box::new(Backend {
                    closes: self.closes.clone(),
                    fail_close: self.fail_close,
                }),
                bounds,
            ))
        }
    }

    fn lifecycle(connector: Arc<Connector>) -> PoolLifecycle {
        PoolLifecycle::new(
            connector,
            DatabaseConfig::default(),
            RetryPolicy::fixed(2, Duration::from_millis(1)),
        )
    }

    #[tokio::test]
    async fn test_missing_dsn_is_configuration_error() {
        let connector = Connector::new(false);
        let lifecycle = lifecycle(connector.clone());

        for dsn in [None, Some(String::new())] {
            let err = lifecycle.start_with_dsn(dsn).await.unwrap_err();
            assert!(matches!(
                err,
                LifecycleError::Configuration(ConfigError::MissingDsn { .. })
            ));
        }
        assert_eq!(connector.opens.load(Ordering::SeqCst), 0);
        assert_eq!(lifecycle.status(), PoolStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_start_publishes_and_stop_clears() {
        let connector = Connector::new(false);
        let lifecycle = lifecycle(connector.clone());
        assert!(lifecycle.current().is_none());

        lifecycle.start_with_dsn(Some("postgres://db".into())).await.unwrap();
        assert_eq!(lifecycle.status(), PoolStatus::Live);
        let snapshot = lifecycle.current().unwrap();

        assert!(matches!(lifecycle.stop().await, StopOutcome::Closed));
        assert!(lifecycle.current().is_none());
        assert!(snapshot.is_closed());
        assert_eq!(lifecycle.status(), PoolStatus::Closed);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let connector = Connector::new(false);
        let lifecycle = lifecycle(connector.clone());
        lifecycle.start_with_dsn(Some("postgres://db".into())).await.unwrap();

        assert!(matches!(lifecycle.stop().await, StopOutcome::Closed));
        assert!(matches!(lifecycle.stop().await, StopOutcome::AlreadyStopped));
        assert_eq!(connector.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_failure_is_swallowed() {
        let connector = Connector::new(true);
        let lifecycle = lifecycle(connector.clone());
        lifecycle.start_with_dsn(Some("postgres://db".into())).await.unwrap();

        assert!(matches!(lifecycle.stop().await, StopOutcome::CloseFailed(_)));
        assert_eq!(lifecycle.status(), PoolStatus::Closed);
        assert!(matches!(lifecycle.stop().await, StopOutcome::AlreadyStopped));
        assert_eq!(connector.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stop_before_start_leaves_state_untouched() {
        let lifecycle = lifecycle(Connector::new(false));
        assert!(matches!(lifecycle.stop().await, StopOutcome::NeverStarted));
        assert_eq!(lifecycle.status(), PoolStatus::Uninitialized);
    }

    #[tokio::test]
    async fn test_no_restart_after_stop() {
        let connector = Connector::new(false);
        let lifecycle = lifecycle(connector.clone());
        lifecycle.start_with_dsn(Some("postgres://db".into())).await.unwrap();

        let again = lifecycle.start_with_dsn(Some("postgres://db".into())).await;
        assert!(matches!(again, Err(LifecycleError::AlreadyStarted)));
        assert!(!again.unwrap_err().is_fatal());

        lifecycle.stop().await;
        let reopen = lifecycle.start_with_dsn(Some("postgres://db".into())).await;
        assert!(matches!(reopen, Err(LifecycleError::Stopped)));
        assert_eq!(connector.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_starts_publish_one_pool() {
        let connector = Connector::new(false);
        let lifecycle = lifecycle(connector.clone());

        let (a, b) = tokio::join!(
            lifecycle.start_with_dsn(Some("postgres://db".into())),
            lifecycle.start_with_dsn(Some("postgres://db".into())),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(LifecycleError::AlreadyStarted))));
        assert_eq!(connector.opens.load(Ordering::SeqCst), 2);
        // The losing handle is closed, the published one is untouched.
        assert_eq!(connector.closes.load(Ordering::SeqCst), 1);
        assert_eq!(lifecycle.status(), PoolStatus::Live);
        assert!(!lifecycle.current().unwrap().is_closed());
    }

    #[tokio::test]
    async fn test_concurrent_stops_close_once() {
        let connector = Connector::new(false);
        let lifecycle = lifecycle(connector.clone());
        lifecycle.start_with_dsn(Some("postgres://db".into())).await.unwrap();

        let (first, second, observed) = tokio::join!(lifecycle.stop(), lifecycle.stop(), async {
            lifecycle.status()
        });

        assert!(matches!(first, StopOutcome::Closed));
        assert!(matches!(second, StopOutcome::AlreadyStopped));
        assert_eq!(observed, PoolStatus::Closed);
        assert_eq!(connector.closes.load(Ordering::SeqCst), 1);
        assert_eq!(lifecycle.status(), PoolStatus::Closed);
    }
}
