//! Shared utilities for integration testing.
//!
//! `SimStore` stands in for the database: its reachability can be flipped
//! at runtime and it counts every open, acquire and close.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use analytics_api::config::ServiceConfig;
use analytics_api::pool::{
    PoolBackend, PoolBounds, PoolConnector, PoolError, PoolHandle, PooledConnection,
};

#[derive(Default)]
pub struct SimStore {
    reachable: AtomicBool,
    stalled: AtomicBool,
    fail_close: AtomicBool,
    failures_left: AtomicU32,
    pub opens: AtomicU32,
    pub acquires: AtomicU32,
    pub closes: AtomicU32,
}

impl SimStore {
    /// A reachable store.
    pub fn new() -> Arc<Self> {
        let store = Self::default();
        store.reachable.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    /// A store that refuses the first `n` pool opens.
    pub fn failing_first(n: u32) -> Arc<Self> {
        let store = Self::new();
        store.failures_left.store(n, Ordering::SeqCst);
        store
    }

    /// A store that refuses every pool open.
    pub fn never_reachable() -> Arc<Self> {
        Self::failing_first(u32::MAX)
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Acquisitions hang until un-stalled.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub fn connector(self: &Arc<Self>) -> Arc<dyn PoolConnector> {
        Arc::new(SimConnector(self.clone()))
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn acquires(&self) -> u32 {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }
}

struct SimConnector(Arc<SimStore>);

#[async_trait]
impl PoolConnector for SimConnector {
    async fn open(&self, _dsn: &str, bounds: PoolBounds) -> Result<PoolHandle, PoolError> {
        let store = &self.0;
        store.opens.fetch_add(1, Ordering::SeqCst);

        let refused = store
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(PoolError::Backend("connection refused".into()));
        }
        Ok(PoolHandle::new(Box::new(SimBackend(store.clone())), bounds))
    }
}

struct SimBackend(Arc<SimStore>);

#[async_trait]
impl PoolBackend for SimBackend {
    async fn acquire(&self) -> Result<Box<dyn PooledConnection>, PoolError> {
        let store = &self.0;
        store.acquires.fetch_add(1, Ordering::SeqCst);

        while store.stalled.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if !store.reachable.load(Ordering::SeqCst) {
            return Err(PoolError::Backend("server closed the connection unexpectedly".into()));
        }
        Ok(Box::new(SimConnection(store.clone())))
    }

    async fn close(&self) -> Result<(), PoolError> {
        self.0.closes.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_close.load(Ordering::SeqCst) {
            return Err(PoolError::Backend("close interrupted".into()));
        }
        Ok(())
    }

    fn size(&self) -> u32 {
        1
    }

    fn num_idle(&self) -> usize {
        1
    }
}

struct SimConnection(Arc<SimStore>);

#[async_trait]
impl PooledConnection for SimConnection {
    async fn select_one(&mut self) -> Result<i64, PoolError> {
        if self.0.reachable.load(Ordering::SeqCst) {
            Ok(1)
        } else {
            Err(PoolError::Backend("terminating connection due to administrator command".into()))
        }
    }
}

/// Config bound to an ephemeral loopback port with a short retry delay.
pub fn test_config(max_attempts: u32, retry_delay_ms: u64) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.startup.max_attempts = max_attempts;
    config.startup.retry_delay_ms = retry_delay_ms;
    config.readiness.probe_timeout_ms = 500;
    config
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
