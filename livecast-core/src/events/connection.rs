//! Bookkeeping for open SSE connections

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// An open event-stream connection
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub opened_at: DateTime<Utc>,
}

/// Registry of open SSE connections. Lost on restart.
#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    connections: Arc<Mutex<HashMap<Uuid, ConnectionInfo>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection. It stays registered until the guard is
    /// closed or dropped.
    pub fn open(&self) -> ConnectionGuard {
        let info = ConnectionInfo {
            id: Uuid::new_v4(),
            opened_at: Utc::now(),
        };
        let id = info.id;
        self.lock().insert(id, info);
        debug!(connection_id = %id, "Registered SSE connection");

        ConnectionGuard {
            id,
            closed: AtomicBool::new(false),
            manager: self.clone(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    pub fn is_open(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    fn unregister(&self, id: Uuid) {
        if let Some(info) = self.lock().remove(&id) {
            let open_secs = (Utc::now() - info.opened_at).num_seconds();
            debug!(connection_id = %id, open_secs, "Unregistered SSE connection");
        }
    }

    // A panic while holding the lock cannot leave the map half-updated
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ConnectionInfo>> {
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owns one registered connection. Cleanup runs at most once, whether
/// triggered by [`ConnectionGuard::close`] or by drop.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: Uuid,
    closed: AtomicBool,
    manager: ConnectionManager,
}

impl ConnectionGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Close the connection. Returns `true` only for the call that actually
    /// performed cleanup; later calls are no-ops.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.manager.unregister(self.id);
        true
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.close();
    }
}
