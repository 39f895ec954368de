//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Startup, opening the pool:
//!     → retries.rs (fixed-delay retry, bounded attempts)
//!
//! Request path, readiness probe:
//!     → timeouts.rs (deadline around acquire + round trip)
//!     → never retried; the orchestrator polling /ready is the retry loop
//! ```

pub mod retries;
pub mod timeouts;

pub use retries::{retry_fixed, Exhausted, RetryPolicy, Succeeded};
pub use timeouts::{with_deadline, Elapsed};
