//! conntrack-agent - Node-local connection counting service
//!
//! This is the composition root that wires together all the components.

mod adapters;
mod application;
mod config;
mod domain;
mod infrastructure;

use crate::adapters::inbound::ApiServer;
use crate::adapters::outbound::ProcfsConntrackSource;
use crate::application::CounterService;
use crate::config::load_config;
use crate::infrastructure::start_sync_task;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting conntrack-agent listen={} conntrack={}",
        cfg.listen_addr,
        cfg.conntrack_path
    );

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Outbound adapter: kernel conntrack table
    let conntrack = Arc::new(ProcfsConntrackSource::new(cfg.conntrack_path.clone()));

    // 2. Application service
    let service = Arc::new(CounterService::new(conntrack));

    // 3. Periodic conntrack sync
    if cfg.sync_interval_secs > 0 {
        start_sync_task(
            service.clone(),
            Duration::from_secs(cfg.sync_interval_secs),
        );
    }

    // 4. Inbound adapter: reporting + endpoint-update API
    let server = ApiServer::new(cfg.listen_addr.clone(), service);

    server.run().await
}
