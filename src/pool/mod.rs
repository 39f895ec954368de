//! Connection pool subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     initializer.rs (retry loop)
//!     → PoolConnector::open (postgres.rs in production)
//!     → PoolHandle (opened, bounded)
//!
//! Request path:
//!     PoolHandle::ping
//!     → acquire one connection → SELECT 1 → connection dropped back
//! ```
//!
//! # Design Decisions
//! - Queueing and connection reuse stay inside the pooling library
//! - The handle owns the closed flag, so "closed means no acquisition"
//!   holds for every backend, not just the ones that enforce it

pub mod handle;
pub mod initializer;
pub mod postgres;

pub use handle::{
    CloseResult, PoolBackend, PoolBounds, PoolConnector, PoolError, PoolHandle, PooledConnection,
};
pub use initializer::{open_with_retries, PoolUnavailable};
pub use postgres::PgConnector;
