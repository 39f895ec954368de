//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the three fixed endpoints
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a bound listener until shutdown is signalled

use axum::{
    extract::{Request, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::health::{ReadinessProber, ReadinessReport};
use crate::http::request::{request_id_of, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::{HealthStatus, Welcome};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub prober: Arc<ReadinessProber>,
}

/// HTTP server exposing liveness and readiness.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ListenerConfig, prober: Arc<ReadinessProber>) -> Self {
        let state = AppState { prober };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuidV4))
            // Outside the timeout so 408 responses still carry the id.
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id_of(request)
                )
            }))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)));

        Router::new()
            .route("/", get(root))
            .route("/health", get(health))
            .route("/ready", get(ready))
            .with_state(state)
            .layer(middleware)
    }

    /// The router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn root() -> Json<Welcome> {
    Json(Welcome::default())
}

/// Liveness: no dependency is consulted.
async fn health() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessReport>) {
    let report = state.prober.probe().await;
    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
