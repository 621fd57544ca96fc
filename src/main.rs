//! Route planner service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client request        ┌──────────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http::server ──▶ pipeline::Planner                 │
//!                           │                      │                               │
//!                           │       ┌──────────────┼───────────────┐               │
//!                           │       ▼              ▼               ▼               │
//!                           │   resolver ──▶   matrix  ──▶   optimizer             │
//!                           │   (+ cache)         │               │               │
//!                           │       │             │               │               │
//!                           │       ▼             ▼               ▼               │
//!                           │   upstream: geocode / places / matrix / solver ──────┼──▶ providers
//!                           │                                                      │
//!                           │   config · observability · resilience · lifecycle    │
//!                           └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use route_planner::config::load_or_default;
use route_planner::lifecycle::{spawn_signal_handler, Shutdown};
use route_planner::observability::{init_logging, metrics};
use route_planner::upstream::Providers;
use route_planner::{HttpServer, Planner};

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "PLANNER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "planner.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_or_default(&config_path)?;

    init_logging(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "route-planner starting"
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_stops = config.limits.max_stops,
        brands = config.brands.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<std::net::SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let providers = match Providers::from_config(&config) {
        Ok(providers) => providers,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build upstream clients");
            return Err(e.into());
        }
    };
    let planner = Arc::new(Planner::new(&config, providers));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    spawn_signal_handler(shutdown.clone());

    HttpServer::new(config, planner)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
