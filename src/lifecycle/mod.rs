//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger received → Draining (warn clients) → poll until empty or
//!     deadline → Complete → broadcaster stops, server exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → first triggers graceful drain, second forces exit
//! ```
//!
//! # Design Decisions
//! - The coordinator, not its callers, owns shutdown state; everything else
//!   observes it through a watch channel
//! - The drain deadline is enforced by wall-clock comparison in a poll loop,
//!   so the loop wakes near the deadline even if no client ever disconnects
//! - Draining is monotonic: once requested, there is no way back to Running

pub mod shutdown;
pub mod signals;

pub use shutdown::{DrainPhase, ShutdownCoordinator};
