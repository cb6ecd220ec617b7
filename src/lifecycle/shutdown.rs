//! Shutdown coordination: the drain-then-terminate sequence.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::ShutdownConfig;
use crate::registry::Registry;

/// Where the process is in its shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPhase {
    /// Normal operation; no shutdown requested.
    Running,
    /// Shutdown requested; waiting for clients to disconnect.
    Draining,
    /// Drain finished (registry empty or deadline elapsed); the process is
    /// free to terminate.
    Complete,
}

#[derive(Debug)]
struct DrainState {
    phase: DrainPhase,
    requested_at: Option<DateTime<Utc>>,
}

/// Coordinator for graceful shutdown.
///
/// Holds the `Running → Draining → Complete` phase machine and drives the
/// drain loop. `begin` is idempotent: the first caller runs the sequence,
/// later callers return immediately and can observe completion via
/// [`ShutdownCoordinator::wait_complete`].
pub struct ShutdownCoordinator {
    registry: Arc<Registry>,
    state: Mutex<DrainState>,
    drain_timeout: Duration,
    poll_interval: Duration,
    drain_message: String,
    complete_tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    /// Create a coordinator in the `Running` phase.
    pub fn new(registry: Arc<Registry>, config: &ShutdownConfig) -> Self {
        let (complete_tx, _) = watch::channel(false);
        Self {
            registry,
            state: Mutex::new(DrainState {
                phase: DrainPhase::Running,
                requested_at: None,
            }),
            drain_timeout: config.drain_timeout(),
            poll_interval: config.poll_interval(),
            drain_message: config.drain_message.clone(),
            complete_tx,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DrainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current phase.
    pub fn phase(&self) -> DrainPhase {
        self.lock().phase
    }

    /// Whether shutdown has been requested (Draining or Complete).
    pub fn shutdown_requested(&self) -> bool {
        self.lock().phase != DrainPhase::Running
    }

    /// Wall-clock time of the first shutdown request, if any.
    pub fn requested_at(&self) -> Option<DateTime<Utc>> {
        self.lock().requested_at
    }

    /// Subscribe to completion. The receiver observes `true` once the
    /// coordinator reaches `Complete`, including subscribers created after
    /// the fact.
    pub fn completed(&self) -> watch::Receiver<bool> {
        self.complete_tx.subscribe()
    }

    /// Wait until the coordinator reaches `Complete`.
    pub async fn wait_complete(&self) {
        let mut rx = self.completed();
        // Err means the coordinator was dropped, which only happens at
        // teardown; nothing left to wait for either way.
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Run the drain sequence: warn every connected client once, then wait
    /// for the registry to empty or the drain deadline to pass, then mark
    /// shutdown complete.
    ///
    /// Only the first caller does any of this; concurrent or repeated calls
    /// while already Draining or Complete return immediately without
    /// re-broadcasting or resetting the deadline.
    pub async fn begin(&self) {
        {
            let mut state = self.lock();
            if state.phase != DrainPhase::Running {
                return;
            }
            state.phase = DrainPhase::Draining;
            state.requested_at = Some(Utc::now());
        }
        // The deadline is monotonic so wall-clock jumps cannot shorten or
        // extend the drain; requested_at above is wall-clock for reporting.
        let deadline = Instant::now() + self.drain_timeout;

        tracing::info!(
            clients = self.registry.count(),
            drain_timeout_secs = self.drain_timeout.as_secs(),
            "Shutdown requested, waiting for clients to disconnect"
        );
        self.registry.broadcast(&self.drain_message);

        loop {
            if self.registry.is_empty() {
                tracing::info!("All clients disconnected, shutting down now");
                break;
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    remaining = self.registry.count(),
                    "Drain deadline elapsed with clients still connected"
                );
                break;
            }
            tracing::info!(
                clients = self.registry.count(),
                time_left_secs = (deadline - now).as_secs(),
                "Waiting for clients to disconnect"
            );
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }

        self.lock().phase = DrainPhase::Complete;
        let _ = self.complete_tx.send(true);
        tracing::info!("Shutdown complete");
    }
}
