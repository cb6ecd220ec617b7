//! WebSocket attach point.
//!
//! # Responsibilities
//! - Complete the upgrade handshake
//! - Register a handle for the connection and spawn its writer task
//! - Block on receive purely to keep the connection alive / detect disconnect
//! - Deregister on disconnect
//!
//! # Design Decisions
//! - The writer task is the sole owner of the socket's write half; everyone
//!   else reaches it through the registry handle's queue, so broadcast and
//!   disconnect can never race on the socket itself

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::http::server::AppState;
use crate::registry::{ConnectionHandle, OutboundFrame};

/// Upgrade handler for `GET /ws`.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (handle, outbound) = ConnectionHandle::channel();
    let id = handle.id();

    if let Err(err) = state.registry.add(handle) {
        // Double-accept of the same identity is a bug in this accept path;
        // drop the socket, keep the process.
        tracing::error!(connection_id = %id, error = %err, "Refusing connection");
        return;
    }
    tracing::info!(
        connection_id = %id,
        total = state.registry.count(),
        "Client connected"
    );

    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(write_outbound(sink, outbound));

    // Inbound payloads are ignored; this loop exists to notice the
    // disconnect.
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    state.registry.remove(id);
    tracing::info!(
        connection_id = %id,
        remaining = state.registry.count(),
        "Client disconnected"
    );

    // Deregistering dropped the last queue sender, so the writer drains any
    // queued frames and exits.
    let _ = writer.await;
}

/// Forward queued frames to the socket until the queue closes, a send fails,
/// or a close is requested.
async fn write_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::UnboundedReceiver<OutboundFrame>,
) {
    while let Some(frame) = outbound.recv().await {
        match frame {
            OutboundFrame::Text(text) => {
                if sink.send(Message::Text(text.into())).await.is_err() {
                    // Socket is gone; the registry learns of it when its
                    // next send to this queue fails.
                    break;
                }
            }
            OutboundFrame::Close => break,
        }
    }
    let _ = sink.close().await;
}
