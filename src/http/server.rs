//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the `/ws` and `/status` handlers
//! - Wire up middleware (tracing)
//! - Serve until the shutdown coordinator reaches Complete

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::http::{status, websocket};
use crate::lifecycle::ShutdownCoordinator;
use crate::registry::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub coordinator: Arc<ShutdownCoordinator>,
}

/// HTTP server for the broadcast service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the shared registry and coordinator.
    pub fn new(registry: Arc<Registry>, coordinator: Arc<ShutdownCoordinator>) -> Self {
        let state = AppState {
            registry,
            coordinator,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/ws", get(websocket::ws_handler))
            .route("/status", get(status::status_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server. Stops accepting connections once `complete` observes
    /// `true`; connections still open at that point are torn down by the
    /// caller exiting.
    pub async fn run(
        self,
        listener: TcpListener,
        mut complete: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = complete.wait_for(|done| *done).await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
