//! JSON response bodies for the fixed endpoints.

use serde::{Deserialize, Serialize};

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Welcome {
    pub ok: bool,
    pub msg: String,
}

impl Default for Welcome {
    fn default() -> Self {
        Self {
            ok: true,
            msg: "Welcome".to_string(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
