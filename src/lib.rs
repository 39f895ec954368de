//! Analytics API service library.
//!
//! Liveness and readiness over HTTP on top of a shared PostgreSQL
//! connection pool that is opened with retries at startup and closed once
//! at shutdown.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod resilience;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, PoolLifecycle, Shutdown};
