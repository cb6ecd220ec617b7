//! Periodic notification fan-out.
//!
//! # Responsibilities
//! - Tick on a fixed interval and broadcast the notification message
//! - Skip ticks while the registry is empty
//! - Stop cleanly once the shutdown coordinator reaches Complete
//!
//! # Design Decisions
//! - Single task, so broadcasts can never overlap; missed ticks are skipped
//!   rather than allowed to pile up

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::BroadcastConfig;
use crate::registry::Registry;

/// Drives `Registry::broadcast` on a fixed interval.
pub struct Broadcaster {
    registry: Arc<Registry>,
    interval: Duration,
    message: String,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>, config: &BroadcastConfig) -> Self {
        Self {
            registry,
            interval: config.interval(),
            message: config.message.clone(),
        }
    }

    /// Run until `complete` observes `true` (or its sender goes away).
    pub async fn run(self, mut complete: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Broadcaster starting"
        );

        // First notification goes out one full period after startup.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let count = self.registry.count();
                    if count == 0 {
                        continue;
                    }
                    tracing::info!(clients = count, "Broadcasting notification");
                    self.registry.broadcast(&self.message);
                }
                _ = complete.wait_for(|done| *done) => {
                    tracing::info!("Broadcaster stopping, shutdown complete");
                    break;
                }
            }
        }
    }
}
