//! Conntrack Source Port
//!
//! Defines the interface to the kernel's connection-tracking subsystem.

use crate::domain::entities::TcpConnection;
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a conntrack source.
///
/// A failed pull is transient: the sync cycle that hit it is skipped and
/// nothing else changes.
#[derive(Debug, Error)]
pub enum ConntrackError {
    /// Reading the conntrack table failed.
    #[error("failed to read conntrack table: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of currently established TCP connections.
///
/// This is an outbound port implemented by the connection-tracking
/// adapter. The counter service pulls a point-in-time snapshot from it
/// on every sync cycle; each returned connection describes one
/// established flow by its local and remote address.
#[async_trait]
pub trait ConntrackSource: Send + Sync {
    /// Get the currently established TCP connections.
    async fn connections(&self) -> Result<Vec<TcpConnection>, ConntrackError>;
}
