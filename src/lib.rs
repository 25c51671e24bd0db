//! conntrack-agent Library
//!
//! This module exposes the conntrack-agent components for use in
//! integration tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::CounterService;
pub use config::load_config;
pub use domain::entities::{EndpointSet, EndpointSubset, ServiceConnections, TcpConnection};
pub use domain::ports::{ConntrackError, ConntrackSource};
pub use domain::services::ConnectionCounter;
pub use domain::value_objects::ServiceId;
pub use infrastructure::start_sync_task;
