//! End-to-end tests over real sockets: WebSocket clients plus the status
//! endpoint, with intervals shrunk to keep the tests fast.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use broadcast_server::config::{BroadcastConfig, ShutdownConfig};
use broadcast_server::lifecycle::DrainPhase;

mod common;

const RECV_TIMEOUT: Duration = Duration::from_secs(10);

fn fast_broadcast() -> BroadcastConfig {
    BroadcastConfig {
        interval_secs: 1,
        message: "Test notification".into(),
    }
}

fn fast_shutdown() -> ShutdownConfig {
    ShutdownConfig {
        drain_timeout_secs: 30,
        poll_interval_secs: 1,
        drain_message: "Server is shutting down soon. Please reconnect later.".into(),
    }
}

async fn next_text<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let message = timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = message {
            return text.to_string();
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn clients_receive_periodic_notifications() {
    let server = common::start_server(fast_broadcast(), fast_shutdown()).await;

    let (mut first, _) = connect_async(server.ws_url()).await.unwrap();
    let (mut second, _) = connect_async(server.ws_url()).await.unwrap();

    assert_eq!(next_text(&mut first).await, "Test notification");
    assert_eq!(next_text(&mut second).await, "Test notification");

    let status: serde_json::Value = reqwest::get(server.status_url())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["active_connections"], 2);
    assert_eq!(status["shutdown_requested"], false);
    assert!(status["shutdown_requested_at"].is_null());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn drain_warns_clients_and_completes_when_they_leave() {
    let server = common::start_server(
        // Long interval so only the drain warning reaches the client.
        BroadcastConfig {
            interval_secs: 600,
            message: "Test notification".into(),
        },
        fast_shutdown(),
    )
    .await;

    let (mut client, _) = connect_async(server.ws_url()).await.unwrap();

    // Let the connect register before draining.
    timeout(RECV_TIMEOUT, async {
        while server.registry.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let drain = tokio::spawn({
        let coordinator = server.coordinator.clone();
        async move { coordinator.begin().await }
    });

    assert_eq!(
        next_text(&mut client).await,
        "Server is shutting down soon. Please reconnect later."
    );

    // Mid-drain, the status endpoint reports the request and its timestamp.
    let status: serde_json::Value = reqwest::get(server.status_url())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["shutdown_requested"], true);
    assert!(status["shutdown_requested_at"].is_string());

    client.close(None).await.unwrap();
    timeout(RECV_TIMEOUT, drain).await.unwrap().unwrap();

    assert_eq!(server.coordinator.phase(), DrainPhase::Complete);
    assert!(server.registry.is_empty());

    // The broadcaster observes completion and stops on its own.
    timeout(RECV_TIMEOUT, server.broadcaster_task)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn closed_client_is_deregistered() {
    let server = common::start_server(fast_broadcast(), fast_shutdown()).await;

    let (mut client, _) = connect_async(server.ws_url()).await.unwrap();
    assert_eq!(next_text(&mut client).await, "Test notification");
    assert_eq!(server.registry.count(), 1);

    client.close(None).await.unwrap();

    // The read loop notices the close and deregisters.
    timeout(RECV_TIMEOUT, async {
        while !server.registry.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}
