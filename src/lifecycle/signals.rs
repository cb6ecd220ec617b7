//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT; Ctrl+C on Windows)
//! - Translate the first signal into a graceful drain
//! - Let a repeated signal force shutdown (handled by the caller)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe); the handler does no work
//!   beyond resolving a future the shutdown sequencer is waiting on

/// Wait for a termination signal (SIGINT or SIGTERM on Unix, Ctrl+C
/// elsewhere).
pub async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => tracing::info!("SIGINT received"),
            _ = sigterm.recv() => tracing::info!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!("Ctrl+C received");
    }
}
