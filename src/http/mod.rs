//! HTTP surface: WebSocket attach point and status endpoint.
//!
//! # Data Flow
//! ```text
//! GET /ws      → websocket.rs (upgrade, register, keep-alive, deregister)
//! GET /status  → status.rs (snapshot of registry + coordinator state)
//! ```

pub mod server;
pub mod status;
pub mod websocket;

pub use server::{AppState, HttpServer};
pub use status::StatusSnapshot;
