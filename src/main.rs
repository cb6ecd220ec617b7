//! Binary entry point: startup and shutdown sequencing.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use broadcast_server::config::{load_config, ServerConfig};
use broadcast_server::lifecycle::{signals, ShutdownCoordinator};
use broadcast_server::observability::metrics;
use broadcast_server::{Broadcaster, HttpServer, Registry};

/// Persistent-connection broadcast server.
#[derive(Debug, Parser)]
#[command(name = "broadcast-server")]
struct Args {
    /// Path to a TOML configuration file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "broadcast_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        broadcast_interval_secs = config.broadcast.interval_secs,
        drain_timeout_secs = config.shutdown.drain_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = Arc::new(Registry::new());
    let coordinator = Arc::new(ShutdownCoordinator::new(registry.clone(), &config.shutdown));

    let broadcaster = Broadcaster::new(registry.clone(), &config.broadcast);
    let broadcaster_task = tokio::spawn(broadcaster.run(coordinator.completed()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(registry.clone(), coordinator.clone());
    let server_task = tokio::spawn(server.run(listener, coordinator.completed()));

    signals::wait_for_termination().await;

    // Drain, but let a repeated signal cut the wait short.
    tokio::select! {
        _ = coordinator.begin() => {}
        _ = signals::wait_for_termination() => {
            tracing::warn!("Second termination signal, forcing shutdown");
            return Ok(());
        }
    }

    // Drain finished; wait for the broadcaster so no broadcast is mid-flight
    // when the process goes away.
    let _ = broadcaster_task.await;

    // The server stopped accepting at Complete, but clients still attached
    // past the deadline keep its future alive. Abandoning them here is the
    // designed deadline fallback.
    server_task.abort();
    let _ = server_task.await;

    tracing::info!("Shutdown complete, exiting");
    Ok(())
}
