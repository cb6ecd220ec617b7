//! Metrics collection and exposition.
//!
//! # Metrics
//! - `broadcast_active_connections` (gauge): current registry size
//! - `broadcast_messages_delivered_total` (counter): successful sends
//! - `broadcast_send_failures_total` (counter): sends that evicted a client

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr` and describe our metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_gauge!(
                "broadcast_active_connections",
                "Current number of registered connections"
            );
            describe_counter!(
                "broadcast_messages_delivered_total",
                "Messages successfully handed to a connection's writer"
            );
            describe_counter!(
                "broadcast_send_failures_total",
                "Broadcast sends that failed and evicted the connection"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Update the active-connections gauge. No-op when no recorder is installed.
pub fn record_active_connections(count: usize) {
    gauge!("broadcast_active_connections").set(count as f64);
}

/// Record the outcome of one broadcast pass.
pub fn record_broadcast(delivered: usize, failed: usize) {
    counter!("broadcast_messages_delivered_total").increment(delivered as u64);
    if failed > 0 {
        counter!("broadcast_send_failures_total").increment(failed as u64);
    }
}
