//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (attempt, error, elapsed_ms)
//!     → per-request spans carrying the request ID (http::server)
//!
//! logging.rs:
//!     → stdout, pretty or JSON
//! ```

pub mod logging;
