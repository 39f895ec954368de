//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Read DSN → open pool with retries (manager.rs) → publish → bind listener
//!
//! Running:
//!     Request handlers read the published pool (manager.rs::current)
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → server drains → pool closed once
//! ```
//!
//! # Design Decisions
//! - The pool slot is written exactly twice per run: publish, then clear
//! - Startup errors abort the run; close errors are logged and swallowed

pub mod error;
pub mod manager;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use error::LifecycleError;
pub use manager::{PoolLifecycle, StopOutcome};
pub use shutdown::Shutdown;
pub use startup::Application;
