//! Demo host for the telemetry pipeline.
//!
//! Serves a welcome route and an unknown-endpoint fallback behind the capture
//! middleware, and reports metrics on the configured interval.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use pizza_telemetry::config::{load_config, TelemetryConfig};
use pizza_telemetry::observability::{logging, metrics};
use pizza_telemetry::{HttpServer, Telemetry};

#[derive(Parser)]
#[command(name = "pizza-telemetry")]
#[command(about = "JWT Pizza service telemetry pipeline", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TelemetryConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("pizza-telemetry v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let telemetry = Telemetry::start(&config)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, &telemetry);
    server.run(listener, shutdown_signal()).await?;

    telemetry.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
