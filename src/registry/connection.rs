//! Connection identity and the send/close handle held by the registry.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Decouple registry membership from socket ownership
//! - Surface send failure as the authoritative liveness signal

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection, stable for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Frame queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// A text payload to deliver to the client.
    Text(String),
    /// Ask the writer task to close the socket.
    Close,
}

/// The connection's writer task is gone (remote disconnected or the socket
/// write half failed), so nothing can be delivered anymore.
#[derive(Debug, thiserror::Error)]
#[error("connection is gone or its outbound channel is closed")]
pub struct SendError;

/// Send/close capability for one live connection.
///
/// The handle never touches the socket itself: it pushes frames onto an
/// unbounded queue owned by the connection's writer task. A failed push
/// means the writer task has exited, which the registry treats as the
/// connection being dead.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
}

impl ConnectionHandle {
    /// Create a handle with a fresh ID and the receiver its writer task
    /// should consume.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: ConnectionId::new(),
                outbound: tx,
            },
            rx,
        )
    }

    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a text message for delivery.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.outbound
            .send(OutboundFrame::Text(text.into()))
            .map_err(|_| SendError)
    }

    /// Ask the writer task to close the socket. Best-effort: a writer that
    /// already exited has nothing left to close.
    pub fn close(&self) {
        let _ = self.outbound.send(OutboundFrame::Close);
    }
}
