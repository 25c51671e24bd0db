//! Sync Scheduler
//!
//! Periodic conntrack synchronization trigger.

use crate::application::CounterService;
use std::sync::Arc;
use std::time::Duration;

/// Start the periodic sync task.
///
/// Every `interval` the counter service pulls the current conntrack
/// snapshot and folds it into the count table. The first tick fires
/// immediately. The task runs for the process lifetime.
pub fn start_sync_task(service: Arc<CounterService>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            service.sync().await;
        }
    });
}
