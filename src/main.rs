//! Analytics API service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 ANALYTICS API                │
//!                        │                                              │
//!   GET / /health /ready │  ┌─────────┐    ┌───────────┐                │
//!   ─────────────────────┼─▶│  http   │───▶│ readiness │                │
//!                        │  │ server  │    │  prober   │                │
//!                        │  └─────────┘    └─────┬─────┘                │
//!                        │                       │ snapshot             │
//!                        │                       ▼                      │
//!                        │  ┌───────────┐  ┌───────────┐   SELECT 1     │
//!                        │  │ lifecycle │─▶│ pool slot │────────────────┼──▶ PostgreSQL
//!                        │  │  manager  │  │ (ArcSwap) │                │
//!                        │  └─────┬─────┘  └───────────┘                │
//!                        │        │ start: open with retries            │
//!                        │        │ stop:  close once                   │
//!                        └────────┴─────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use analytics_api::config::{self, validation::validate_config, ConfigError, ObservabilityConfig};
use analytics_api::lifecycle::{signals, Application, Shutdown};
use analytics_api::observability::logging;
use analytics_api::pool::PgConnector;

#[derive(Parser)]
#[command(name = "analytics-api")]
#[command(about = "Liveness and readiness service backed by a PostgreSQL pool", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = config::load_or_default(cli.config.as_deref());
    match &loaded {
        Ok(config) => logging::init(&config.observability),
        Err(_) => logging::init(&ObservabilityConfig::default()),
    }
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        min_connections = config.database.min_connections,
        max_connections = config.database.max_connections,
        max_attempts = config.startup.max_attempts,
        "analytics-api starting"
    );

    let connector = Arc::new(PgConnector::new(config.database.acquire_timeout()));
    let app = match Application::build(config, connector).await {
        Ok(app) => app,
        Err(e) => {
            if e.is_fatal() {
                tracing::error!(error = %e, "Startup failed");
            } else {
                tracing::warn!(error = %e, "Startup aborted");
            }
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::forward_to(shutdown.clone()));

    tracing::info!(address = %app.local_addr()?, "Listening for connections");
    let outcome = app.run(server_shutdown).await?;

    tracing::info!(pool = ?outcome, "Shutdown complete");
    Ok(())
}
