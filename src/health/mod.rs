//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health (liveness):
//!     → always ok once the process serves HTTP; no dependency touched
//!
//! GET /ready (readiness.rs):
//!     → snapshot of the published pool (lifecycle)
//!     → acquire → SELECT 1 → release, under a deadline
//!     → ReadinessReport
//!
//! state.rs:
//!     Uninitialized → Live → Closed
//! ```
//!
//! # Design Decisions
//! - Liveness never touches the database
//! - Readiness is the only place backing-store health is visible

pub mod readiness;
pub mod state;

pub use readiness::{ProbeError, ReadinessProber, ReadinessReport};
pub use state::PoolStatus;
