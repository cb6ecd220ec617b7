//! Persistent-connection broadcast server.
//!
//! Clients attach over a long-lived WebSocket, the server pushes a periodic
//! notification to every attached client, and on a termination signal the
//! server drains clients gracefully within a bounded window before forcing
//! shutdown.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌─────────────────────────────────────────────┐
//!                       │              BROADCAST SERVER                │
//!                       │                                              │
//!   WebSocket client    │  ┌─────────┐       ┌─────────────────────┐  │
//!   ────────────────────┼─▶│  http   │──add─▶│      registry       │  │
//!      (GET /ws)        │  │  /ws    │◀remove│  live connections   │  │
//!                       │  └─────────┘       └─────────┬───────────┘  │
//!                       │                              │              │
//!   Status client       │  ┌─────────┐                 │broadcast     │
//!   ────────────────────┼─▶│  http   │◀──snapshot──────┤              │
//!      (GET /status)    │  │ /status │                 │              │
//!                       │  └─────────┘       ┌─────────┴───────────┐  │
//!                       │                    │     broadcaster     │  │
//!                       │                    │  (periodic timer)   │  │
//!                       │                    └─────────────────────┘  │
//!                       │                                              │
//!   SIGTERM / SIGINT    │  ┌────────────────────────────────────────┐ │
//!   ────────────────────┼─▶│  lifecycle: ShutdownCoordinator         │ │
//!                       │  │  Running → Draining → Complete          │ │
//!                       │  └────────────────────────────────────────┘ │
//!                       └─────────────────────────────────────────────┘
//! ```
//!
//! The registry is the only shared mutable resource; all structural access
//! goes through one mutex. The coordinator owns the drain sequence and is
//! the single source of truth for whether shutdown has finished.

// Core subsystems
pub mod broadcaster;
pub mod config;
pub mod http;
pub mod registry;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use broadcaster::Broadcaster;
pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::ShutdownCoordinator;
pub use registry::Registry;
