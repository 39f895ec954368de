//! Pool status as seen from the readiness probe.
//!
//! # State Transitions
//! ```text
//! Uninitialized → Live:  lifecycle start succeeds
//! Live → Live:           any probe, successful or not
//! Live → Closed:         lifecycle stop
//! Closed:                terminal for the process run
//! ```
//!
//! A failed startup never leaves `Uninitialized`.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Uninitialized,
    Live,
    Closed,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Uninitialized => "uninitialized",
            PoolStatus::Live => "live",
            PoolStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
