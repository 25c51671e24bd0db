//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the connection counting
//! domain. They have no external dependencies and contain only business
//! logic.

use crate::domain::value_objects::ServiceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One group of addresses within an endpoint set.
///
/// Subsets mirror the shape of the upstream discovery feed; an empty
/// subset is valid and simply contributes nothing to the registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointSubset {
    /// Endpoint IP addresses in this subset
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// The full endpoint set for one service.
///
/// The discovery feed always delivers the complete current list of
/// endpoint sets; there is no incremental diffing.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSet {
    /// Identity of the owning service
    pub service: ServiceId,
    /// Address subsets backing the service
    #[serde(default)]
    pub subsets: Vec<EndpointSubset>,
}

impl EndpointSet {
    /// Build an endpoint set from a flat address list (single subset).
    #[allow(dead_code)]
    pub fn with_addresses(service: ServiceId, addresses: Vec<String>) -> Self {
        Self {
            service,
            subsets: vec![EndpointSubset { addresses }],
        }
    }
}

/// One established TCP connection reported by the tracking subsystem.
///
/// Observations are consumed immediately into count increments and never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConnection {
    /// Address of the local side
    pub local: String,
    /// Address of the remote side
    pub remote: String,
}

impl TcpConnection {
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }
}

/// Per-service snapshot record exposed at the reporting boundary.
///
/// `endpoint_counter` maps endpoint address to connections per second
/// over the current window; `endpoint_abs` maps endpoint address to the
/// absolute count since the last reset. Empty members are omitted from
/// the wire document.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceConnections {
    /// Rendered service identity (`namespace/name`)
    #[serde(rename = "serviceID", skip_serializing_if = "String::is_empty")]
    pub service_id: String,
    /// Endpoint address -> rate (connections/sec)
    #[serde(rename = "endpointCounter", skip_serializing_if = "HashMap::is_empty")]
    pub endpoint_counter: HashMap<String, f64>,
    /// Endpoint address -> absolute count
    #[serde(rename = "endpointAbs", skip_serializing_if = "HashMap::is_empty")]
    pub endpoint_abs: HashMap<String, u64>,
}
