//! Connection Counter Service
//!
//! The core counting engine: maps raw connection observations to service
//! identities, accumulates per-service per-endpoint counts across sync
//! cycles, and derives connections-per-second rates over the window since
//! the last reset.

use crate::domain::entities::{EndpointSet, ServiceConnections, TcpConnection};
use crate::domain::value_objects::ServiceId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;

/// Mutable counter state, guarded by the single lock in
/// [`ConnectionCounter`]. No operation observes a partially updated view.
#[derive(Default)]
struct CounterState {
    /// Endpoint address -> owning service. Replaced wholesale on every
    /// endpoint-set update, never merged.
    endpoints: HashMap<String, ServiceId>,
    /// Service key -> endpoint address -> connections counted since the
    /// last reset. Counts only grow between resets.
    counts: HashMap<String, HashMap<String, u64>>,
    /// Start of the current measurement window. `None` until the first
    /// reset; rates are undefined before that.
    window_started: Option<Instant>,
}

impl CounterState {
    fn increment(&mut self, service_key: &str, address: &str) {
        let count = self
            .counts
            .entry(service_key.to_string())
            .or_default()
            .entry(address.to_string())
            .or_insert(0);
        *count += 1;
    }
}

/// Per-service, per-endpoint connection counter.
///
/// One instance lives for the process lifetime. The endpoint registry,
/// the count table, and the window start share one exclusive lock; each
/// public operation takes it once for its full critical section.
pub struct ConnectionCounter {
    state: Mutex<CounterState>,
}

impl ConnectionCounter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CounterState::default()),
        }
    }

    /// Replace the endpoint registry with a fresh mapping built from the
    /// given endpoint sets.
    ///
    /// Every address in every subset is assigned to its set's service
    /// identity. Never fails: malformed or empty input yields a partial
    /// or empty registry.
    pub fn rebuild_endpoints(&self, endpoint_sets: &[EndpointSet]) {
        let mut endpoints = HashMap::new();
        for set in endpoint_sets {
            for subset in &set.subsets {
                for address in &subset.addresses {
                    endpoints.insert(address.clone(), set.service.clone());
                }
            }
        }

        tracing::debug!(
            "endpoint registry rebuilt: {} addresses from {} sets",
            endpoints.len(),
            endpoint_sets.len()
        );

        self.state.lock().endpoints = endpoints;
    }

    /// Look up the service owning an endpoint address.
    #[allow(dead_code)]
    pub fn lookup(&self, address: &str) -> Option<ServiceId> {
        self.state.lock().endpoints.get(address).cloned()
    }

    /// Number of addresses currently in the registry.
    pub fn registered_addresses(&self) -> usize {
        self.state.lock().endpoints.len()
    }

    /// Number of services with at least one tracked endpoint count.
    pub fn tracked_services(&self) -> usize {
        self.state.lock().counts.len()
    }

    /// Increment the count for each `(service key, endpoint address)`
    /// pair by one.
    ///
    /// Missing service or endpoint entries are initialized to zero first;
    /// duplicate pairs in one call simply accumulate.
    pub fn count(&self, pairs: &[(String, String)]) {
        let mut state = self.state.lock();
        for (service_key, address) in pairs {
            state.increment(service_key, address);
        }
    }

    /// Attribute a batch of connection observations and count them.
    ///
    /// Local and remote addresses are looked up independently in the
    /// registry; each side that resolves contributes one increment, so a
    /// connection between two known endpoints counts once per side.
    /// Unmatched sides are excluded. Attribution and increment happen
    /// under a single lock acquisition.
    pub fn ingest(&self, connections: &[TcpConnection]) {
        let mut state = self.state.lock();
        let mut matched = 0usize;
        for conn in connections {
            for address in [conn.local.as_str(), conn.remote.as_str()] {
                if let Some(key) = state.endpoints.get(address).map(|s| s.to_string()) {
                    state.increment(&key, address);
                    matched += 1;
                }
            }
        }

        if matched > 0 {
            tracing::debug!(
                "ingested {} connections, {} endpoint matches",
                connections.len(),
                matched
            );
        }
    }

    /// Clear the count table and start a new measurement window.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.counts = HashMap::new();
        state.window_started = Some(Instant::now());
        tracing::debug!("connection counter reset");
    }

    /// Immutable read of the count table as per-service records.
    ///
    /// Rates are absolute counts divided by whole elapsed seconds since
    /// the last reset, with elapsed floored at one second so a snapshot
    /// taken inside the first second of a window stays finite. Returns an
    /// empty list before the first-ever reset: without a window start
    /// there is no rate to derive.
    pub fn snapshot(&self) -> Vec<ServiceConnections> {
        let state = self.state.lock();

        let started = match state.window_started {
            Some(started) => started,
            None => return Vec::new(),
        };
        let elapsed_secs = started.elapsed().as_secs().max(1);

        let mut records = Vec::with_capacity(state.counts.len());
        for (service_key, endpoints) in &state.counts {
            let mut endpoint_counter = HashMap::with_capacity(endpoints.len());
            let mut endpoint_abs = HashMap::with_capacity(endpoints.len());
            for (address, count) in endpoints {
                endpoint_counter.insert(address.clone(), *count as f64 / elapsed_secs as f64);
                endpoint_abs.insert(address.clone(), *count);
            }
            records.push(ServiceConnections {
                service_id: service_key.clone(),
                endpoint_counter,
                endpoint_abs,
            });
        }

        records
    }

    /// Move the window start back in time. Test hook for rate math.
    #[cfg(test)]
    pub(crate) fn backdate_window(&self, by: std::time::Duration) {
        let mut state = self.state.lock();
        if let Some(started) = state.window_started {
            state.window_started = Some(started - by);
        }
    }
}

impl Default for ConnectionCounter {
    fn default() -> Self {
        Self::new()
    }
}
