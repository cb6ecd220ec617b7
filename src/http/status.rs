//! Read-only status endpoint.
//!
//! Combines the registry count with the coordinator's shutdown state. The
//! two reads are taken independently, so a snapshot racing a connect or a
//! shutdown request may mix values from slightly different instants; good
//! enough for a status endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::server::AppState;
use crate::lifecycle::ShutdownCoordinator;
use crate::registry::Registry;

/// Point-in-time view of the server for `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Connections currently registered.
    pub active_connections: usize,
    /// Whether shutdown has been requested (draining or complete).
    pub shutdown_requested: bool,
    /// RFC 3339 time of the first shutdown request, absent while running.
    pub shutdown_requested_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// Capture the current server state.
    pub fn capture(registry: &Registry, coordinator: &ShutdownCoordinator) -> Self {
        Self {
            active_connections: registry.count(),
            shutdown_requested: coordinator.shutdown_requested(),
            shutdown_requested_at: coordinator.requested_at(),
        }
    }
}

/// Handler for `GET /status`.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(StatusSnapshot::capture(&state.registry, &state.coordinator))
}
