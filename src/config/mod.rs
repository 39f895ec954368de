//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! process environment
//!     → loader::dsn_from_env (connection string, read once at startup)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults, so running without a file is valid
//! - The connection string never lives in the file; a missing value is a
//!   configuration error, not a connectivity error

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{dsn_from_env, load_config, load_or_default, require_dsn, ConfigError};
pub use schema::{
    DatabaseConfig, ListenerConfig, LogFormat, ObservabilityConfig, ReadinessConfig,
    ServiceConfig, StartupConfig,
};
pub use validation::ValidationError;
