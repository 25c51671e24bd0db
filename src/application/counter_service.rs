//! Counter Service - Main application use case
//!
//! Orchestrates the counting flow: endpoint-set updates rebuild the
//! registry and trigger an immediate sync, periodic and on-demand syncs
//! pull from the conntrack source, and the reporting boundary reads
//! snapshots. This is the primary interface for the inbound adapter.

use crate::domain::entities::{EndpointSet, ServiceConnections};
use crate::domain::ports::ConntrackSource;
use crate::domain::services::ConnectionCounter;
use std::sync::Arc;
use std::time::Instant;

/// Counter service - main application use case.
///
/// Owns the connection counter and the conntrack port. All call paths
/// (update feed, periodic sync, reporting reads) go through this service
/// and may overlap freely; the counter serializes them internally.
pub struct CounterService {
    counter: ConnectionCounter,
    conntrack: Arc<dyn ConntrackSource>,
}

impl CounterService {
    /// Create a new counter service backed by the given conntrack source.
    pub fn new(conntrack: Arc<dyn ConntrackSource>) -> Self {
        Self {
            counter: ConnectionCounter::new(),
            conntrack,
        }
    }

    /// Handle a full endpoint-set update from the discovery feed.
    ///
    /// Rebuilds the registry wholesale, then syncs immediately so
    /// connections already active against newly registered endpoints are
    /// counted without waiting for the next periodic cycle.
    ///
    /// # Returns
    /// The number of addresses in the rebuilt registry.
    pub async fn on_endpoints_update(&self, endpoint_sets: &[EndpointSet]) -> usize {
        let start = Instant::now();

        self.counter.rebuild_endpoints(endpoint_sets);
        self.sync().await;

        let registered = self.counter.registered_addresses();
        tracing::debug!(
            "endpoints update took {:?} for {} sets ({} addresses)",
            start.elapsed(),
            endpoint_sets.len(),
            registered
        );
        registered
    }

    /// Pull the current conntrack snapshot and fold it into the counts.
    ///
    /// The pull is awaited outside the counter lock; the returned
    /// snapshot is attributed and counted in one atomic step. A failed
    /// pull skips this cycle: logged, no retry, no state change.
    pub async fn sync(&self) {
        match self.conntrack.connections().await {
            Ok(connections) => {
                if !connections.is_empty() {
                    self.counter.ingest(&connections);
                }
            }
            Err(e) => {
                tracing::warn!("conntrack pull failed, sync skipped: {}", e);
            }
        }
    }

    /// Read-only snapshot for the reporting boundary.
    pub fn snapshot(&self) -> Vec<ServiceConnections> {
        self.counter.snapshot()
    }

    /// Build the snapshot, then clear counts and restart the window.
    ///
    /// The returned records reflect the state before the reset.
    pub fn snapshot_and_reset(&self) -> Vec<ServiceConnections> {
        let records = self.counter.snapshot();
        self.counter.reset();
        records
    }

    /// Direct access to the underlying counter.
    pub fn counter(&self) -> &ConnectionCounter {
        &self.counter
    }
}
