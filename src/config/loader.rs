//! Configuration loading from disk and the process environment.

use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
///
/// Every variant is fatal at startup and is never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// The connection string variable is unset or blank.
    #[error("{var} not set")]
    MissingDsn { var: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the file at `path` if given, otherwise validated defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ServiceConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Read the connection string from the environment variable `var`.
pub fn dsn_from_env(var: &str) -> Result<String, ConfigError> {
    require_dsn(env::var(var).ok(), var)
}

/// Accept `value` as a connection string only if it is present and non-blank.
pub fn require_dsn(value: Option<String>, var: &str) -> Result<String, ConfigError> {
    match value {
        Some(dsn) if !dsn.trim().is_empty() => Ok(dsn),
        _ => Err(ConfigError::MissingDsn {
            var: var.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_require_dsn() {
        assert_eq!(
            require_dsn(Some("postgres://db/app".into()), "DATABASE_DSN").unwrap(),
            "postgres://db/app"
        );
        assert!(matches!(
            require_dsn(None, "DATABASE_DSN"),
            Err(ConfigError::MissingDsn { .. })
        ));

        let err = require_dsn(Some("   ".into()), "DATABASE_DSN").unwrap_err();
        assert_eq!(err.to_string(), "DATABASE_DSN not set");
    }

    #[test]
    fn test_dsn_from_unset_env() {
        let err = dsn_from_env("ANALYTICS_API_TEST_UNSET_DSN").unwrap_err();
        assert!(matches!(err, ConfigError::MissingDsn { ref var } if var == "ANALYTICS_API_TEST_UNSET_DSN"));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = env::temp_dir().join(format!("analytics-api-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[listener]\nbind_address = \"127.0.0.1:9100\"\n[startup]\nmax_attempts = 3").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");
        assert_eq!(config.startup.max_attempts, 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let path = env::temp_dir().join(format!("analytics-api-bad-{}.toml", std::process::id()));
        fs::write(&path, "[database]\nmin_connections = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errs) if errs.len() == 1));

        fs::remove_file(&path).unwrap();
    }
}
