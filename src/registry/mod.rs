//! Thread-safe registry of live connections.
//!
//! # Responsibilities
//! - Track the set of connections believed live, keyed by ID
//! - Fan a message out to every member (best-effort)
//! - Evict members whose send fails
//!
//! # Design Decisions
//! - One mutex over one map is the entire synchronization story; no caller
//!   ever sees a partially mutated set
//! - Broadcast snapshots the membership under the lock and sends outside it,
//!   so a slow pass never blocks connects/disconnects
//! - A connection added mid-broadcast is skipped that cycle; broadcast is
//!   periodic and best-effort, so it catches the next one

pub mod connection;

pub use connection::{ConnectionHandle, ConnectionId, OutboundFrame, SendError};

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::observability::metrics;

/// Error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The same connection ID was registered twice. Indicates a bug in the
    /// accept path, not a condition the caller can recover from.
    #[error("connection {0} is already registered")]
    Duplicate(ConnectionId),
}

/// The set of live connections, shared by the accept path, the broadcaster,
/// the shutdown coordinator and the status endpoint.
///
/// Membership means "believed live": it may lag the true socket state by one
/// broadcast cycle, since a failed send during broadcast is what evicts a
/// dead connection.
#[derive(Debug, Default)]
pub struct Registry {
    connections: Mutex<HashMap<ConnectionId, ConnectionHandle>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ConnectionId, ConnectionHandle>> {
        // Nothing panics while holding this lock, so poisoning carries no
        // torn state worth propagating.
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a connection. Fails if the ID is already present.
    pub fn add(&self, handle: ConnectionHandle) -> Result<(), RegistryError> {
        let mut connections = self.lock();
        if connections.contains_key(&handle.id()) {
            return Err(RegistryError::Duplicate(handle.id()));
        }
        connections.insert(handle.id(), handle);
        metrics::record_active_connections(connections.len());
        Ok(())
    }

    /// Deregister a connection. Returns false if it was already gone, which
    /// is the normal outcome when a disconnect races broadcast cleanup.
    pub fn remove(&self, id: ConnectionId) -> bool {
        let mut connections = self.lock();
        let removed = connections.remove(&id).is_some();
        if removed {
            metrics::record_active_connections(connections.len());
        }
        removed
    }

    /// Number of connections currently registered.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Send `message` to every current member, evicting members whose send
    /// fails. Returns the number of successful deliveries.
    ///
    /// Failures are logged and contained here; one dead client never aborts
    /// the pass or surfaces to the caller.
    pub fn broadcast(&self, message: &str) -> usize {
        let members: Vec<ConnectionHandle> = self.lock().values().cloned().collect();
        if members.is_empty() {
            return 0;
        }

        let mut failed: Vec<ConnectionId> = Vec::new();
        let mut delivered = 0;
        for handle in &members {
            match handle.send(message) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(connection_id = %handle.id(), error = %err, "Broadcast send failed");
                    failed.push(handle.id());
                }
            }
        }

        // Evict after the full pass so enumeration never observes its own
        // mutation.
        if !failed.is_empty() {
            let mut connections = self.lock();
            for id in &failed {
                connections.remove(id);
            }
            metrics::record_active_connections(connections.len());
        }

        metrics::record_broadcast(delivered, failed.len());
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_remove_count() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        let (a, _rx_a) = ConnectionHandle::channel();
        let (b, _rx_b) = ConnectionHandle::channel();
        let a_id = a.id();

        registry.add(a).unwrap();
        registry.add(b).unwrap();
        assert_eq!(registry.count(), 2);

        assert!(registry.remove(a_id));
        assert_eq!(registry.count(), 1);

        // Removing again is a no-op, not an error.
        assert!(!registry.remove(a_id));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let registry = Registry::new();
        let (handle, _rx) = ConnectionHandle::channel();
        let dup = handle.clone();

        registry.add(handle).unwrap();
        let err = registry.add(dup).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn broadcast_on_empty_registry_is_noop() {
        let registry = Registry::new();
        assert_eq!(registry.broadcast("hello"), 0);
    }

    #[test]
    fn broadcast_delivers_to_all_members() {
        let registry = Registry::new();
        let (a, mut rx_a) = ConnectionHandle::channel();
        let (b, mut rx_b) = ConnectionHandle::channel();
        registry.add(a).unwrap();
        registry.add(b).unwrap();

        assert_eq!(registry.broadcast("ping"), 2);
        assert_eq!(rx_a.try_recv().unwrap(), OutboundFrame::Text("ping".into()));
        assert_eq!(rx_b.try_recv().unwrap(), OutboundFrame::Text("ping".into()));
    }

    #[test]
    fn failed_send_evicts_member_after_pass() {
        let registry = Registry::new();
        let (alive, mut rx_alive) = ConnectionHandle::channel();
        let (dead, rx_dead) = ConnectionHandle::channel();
        registry.add(alive).unwrap();
        registry.add(dead).unwrap();
        drop(rx_dead);

        assert_eq!(registry.count(), 2);
        assert_eq!(registry.broadcast("ping"), 1);
        assert_eq!(registry.count(), 1);
        assert_eq!(
            rx_alive.try_recv().unwrap(),
            OutboundFrame::Text("ping".into())
        );
    }
}
