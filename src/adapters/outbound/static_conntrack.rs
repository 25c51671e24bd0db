//! Static Conntrack Source
//!
//! In-memory ConntrackSource holding a fixed snapshot. Used by tests and
//! local demos where no kernel conntrack table is available.

use crate::domain::entities::TcpConnection;
use crate::domain::ports::{ConntrackError, ConntrackSource};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Conntrack source returning a fixed, swappable snapshot.
pub struct StaticConntrackSource {
    connections: Mutex<Vec<TcpConnection>>,
}

#[allow(dead_code)]
impl StaticConntrackSource {
    /// Create a source that returns the given snapshot on every pull.
    pub fn new(connections: Vec<TcpConnection>) -> Self {
        Self {
            connections: Mutex::new(connections),
        }
    }

    /// Create a source with no connections.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Replace the snapshot returned by subsequent pulls.
    pub fn set_connections(&self, connections: Vec<TcpConnection>) {
        *self.connections.lock() = connections;
    }
}

#[async_trait]
impl ConntrackSource for StaticConntrackSource {
    async fn connections(&self) -> Result<Vec<TcpConnection>, ConntrackError> {
        Ok(self.connections.lock().clone())
    }
}
