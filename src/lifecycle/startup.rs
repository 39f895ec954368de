//! Startup orchestration.
//!
//! # Responsibilities
//! - Open and publish the connection pool before anything else
//! - Bind the listener only once the pool is live
//! - Tear the pool down on every exit path after it was published
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, and no socket is bound before
//!   the pool is ready, so a failed start serves nothing
//! - The pool is stopped only after the HTTP server has drained

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServiceConfig;
use crate::health::ReadinessProber;
use crate::http::HttpServer;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::manager::{PoolLifecycle, StopOutcome};
use crate::pool::PoolConnector;

/// A started service: pool live, listener bound, not yet serving.
pub struct Application {
    lifecycle: Arc<PoolLifecycle>,
    listener: TcpListener,
    server: HttpServer,
}

impl Application {
    /// Start with the connection string taken from the environment.
    pub async fn build(
        config: ServiceConfig,
        connector: Arc<dyn PoolConnector>,
    ) -> Result<Self, LifecycleError> {
        let lifecycle = Self::lifecycle_for(&config, connector);
        lifecycle.start().await?;
        Self::bind(config, lifecycle).await
    }

    /// Start with an explicitly supplied connection string.
    pub async fn build_with_dsn(
        config: ServiceConfig,
        connector: Arc<dyn PoolConnector>,
        dsn: Option<String>,
    ) -> Result<Self, LifecycleError> {
        let lifecycle = Self::lifecycle_for(&config, connector);
        lifecycle.start_with_dsn(dsn).await?;
        Self::bind(config, lifecycle).await
    }

    fn lifecycle_for(config: &ServiceConfig, connector: Arc<dyn PoolConnector>) -> Arc<PoolLifecycle> {
        Arc::new(PoolLifecycle::new(
            connector,
            config.database.clone(),
            config.startup.retry_policy(),
        ))
    }

    async fn bind(config: ServiceConfig, lifecycle: Arc<PoolLifecycle>) -> Result<Self, LifecycleError> {
        let address = config.listener.bind_address.clone();
        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(source) => {
                lifecycle.stop().await;
                return Err(LifecycleError::Bind { address, source });
            }
        };

        let prober = Arc::new(ReadinessProber::new(
            lifecycle.clone(),
            config.readiness.probe_timeout(),
        ));
        let server = HttpServer::new(&config.listener, prober);

        Ok(Self {
            lifecycle,
            listener,
            server,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn lifecycle(&self) -> Arc<PoolLifecycle> {
        self.lifecycle.clone()
    }

    /// Serve until `shutdown` fires, then close the pool.
    pub async fn run(self, shutdown: broadcast::Receiver<()>) -> Result<StopOutcome, LifecycleError> {
        let served = self.server.run(self.listener, shutdown).await;
        let outcome = self.lifecycle.stop().await;

        served.map_err(LifecycleError::Serve)?;
        Ok(outcome)
    }
}
