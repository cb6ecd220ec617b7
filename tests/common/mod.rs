//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use broadcast_server::config::{BroadcastConfig, ShutdownConfig};
use broadcast_server::lifecycle::ShutdownCoordinator;
use broadcast_server::{Broadcaster, HttpServer, Registry};

/// A fully wired server running on an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<Registry>,
    pub coordinator: Arc<ShutdownCoordinator>,
    pub server_task: JoinHandle<Result<(), std::io::Error>>,
    pub broadcaster_task: JoinHandle<()>,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn status_url(&self) -> String {
        format!("http://{}/status", self.addr)
    }
}

/// Start registry, coordinator, broadcaster and HTTP server, mirroring the
/// wiring in `main.rs`.
pub async fn start_server(broadcast: BroadcastConfig, shutdown: ShutdownConfig) -> TestServer {
    let registry = Arc::new(Registry::new());
    let coordinator = Arc::new(ShutdownCoordinator::new(registry.clone(), &shutdown));

    let broadcaster = Broadcaster::new(registry.clone(), &broadcast);
    let broadcaster_task = tokio::spawn(broadcaster.run(coordinator.completed()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(registry.clone(), coordinator.clone());
    let server_task = tokio::spawn(server.run(listener, coordinator.completed()));

    TestServer {
        addr,
        registry,
        coordinator,
        server_task,
        broadcaster_task,
    }
}
