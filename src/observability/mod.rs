//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`, initialized in `main`
//! - Metrics are cheap atomic updates; the Prometheus exporter is optional
//!   and disabled by default

pub mod metrics;
