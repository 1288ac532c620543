//! Periodic expiry sweep
//!
//! Evicts entries nobody reads any more. Started and stopped explicitly by
//! the owner of the cache.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::PermissionCache;

/// Running sweeper task
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the task and wait for it to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Permission sweeper exited abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run `cleanup` every `interval` until stopped
///
/// The first sweep happens one full interval after start.
pub fn spawn_sweeper(cache: Arc<PermissionCache>, interval: Duration) -> SweeperHandle {
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = interval.as_secs(), "Permission sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = cache.cleanup();
                    if removed > 0 {
                        debug!(removed = removed, "Swept expired permission entries");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Permission sweeper stopped");
    });

    SweeperHandle { shutdown, task }
}
