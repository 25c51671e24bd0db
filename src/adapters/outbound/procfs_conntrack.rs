//! Procfs Conntrack Source
//!
//! Reads established TCP connections from the kernel conntrack table
//! exposed under procfs. Handles both the `nf_conntrack` layout (with an
//! address-family prefix) and the older `ip_conntrack` layout.

use crate::domain::entities::TcpConnection;
use crate::domain::ports::{ConntrackError, ConntrackSource};
use async_trait::async_trait;

/// Conntrack source backed by a procfs table file.
pub struct ProcfsConntrackSource {
    path: String,
}

impl ProcfsConntrackSource {
    /// Create a source reading from the given table path
    /// (typically `/proc/net/nf_conntrack`).
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Parse one conntrack table line.
    ///
    /// `nf_conntrack` lines carry an `ipv4 2` prefix before the protocol
    /// name; `ip_conntrack` lines start at the protocol name. Only tcp
    /// entries in ESTABLISHED state are kept. The first `src=`/`dst=`
    /// pair describes the original direction: src is the local side.
    /// Malformed lines are skipped.
    fn parse_line(line: &str) -> Option<TcpConnection> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if !tokens.iter().take(3).any(|t| *t == "tcp") {
            return None;
        }
        if !tokens.contains(&"ESTABLISHED") {
            return None;
        }

        let local = tokens.iter().find_map(|t| t.strip_prefix("src="))?;
        let remote = tokens.iter().find_map(|t| t.strip_prefix("dst="))?;

        Some(TcpConnection::new(local, remote))
    }
}

#[async_trait]
impl ConntrackSource for ProcfsConntrackSource {
    async fn connections(&self) -> Result<Vec<TcpConnection>, ConntrackError> {
        let table = tokio::fs::read_to_string(&self.path).await?;

        let connections: Vec<TcpConnection> =
            table.lines().filter_map(Self::parse_line).collect();

        tracing::trace!(
            "conntrack table {}: {} established tcp connections",
            self.path,
            connections.len()
        );
        Ok(connections)
    }
}
