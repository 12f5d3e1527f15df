//! Expiration Sweep Task
//!
//! Background task that periodically purges expired cache rows.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::scheduler::SweepTarget;

/// Spawns a background task that sweeps `target` every `interval`.
///
/// The first sweep happens one full interval after the call, not immediately.
/// A failed sweep is logged and retried on the next tick.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task("lake-cache-sweep".into(), cache.clone(), Duration::from_secs(43_200));
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(
    task_id: String,
    target: Arc<dyn SweepTarget>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting sweep task '{}' with interval of {} seconds",
            task_id,
            interval.as_secs()
        );

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match target.sweep().await {
                Ok(removed) if removed > 0 => {
                    info!("Sweep '{}': removed {} expired entries", task_id, removed)
                }
                Ok(_) => debug!("Sweep '{}': no expired entries found", task_id),
                Err(e) => warn!("Sweep '{}' failed: {}", task_id, e),
            }
        }
    })
}
