//! Idempotent registration of repeating maintenance tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::cleanup::spawn_sweep_task;
use crate::error::{CacheError, Result};

/// Something that can purge its own expired state on demand.
#[async_trait]
pub trait SweepTarget: Send + Sync {
    /// Runs one sweep and returns the number of rows removed.
    async fn sweep(&self) -> Result<usize>;
}

/// Platform capability for repeating triggers.
pub trait Scheduler: Send + Sync {
    /// Registers `target` to be swept every `interval` under `task_id`.
    ///
    /// Returns `Ok(false)` without touching anything when a live trigger is
    /// already registered under the same id.
    fn register_repeating(
        &self,
        task_id: &str,
        interval: Duration,
        target: Arc<dyn SweepTarget>,
    ) -> Result<bool>;

    /// Whether a live trigger exists for `task_id`.
    fn is_registered(&self, task_id: &str) -> bool;
}

// == Interval Scheduler ==
/// In-process scheduler running one tokio task per registered id.
///
/// Registrations last for the life of the scheduler; dropping it aborts every
/// task it started.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, JoinHandle<()>>>> {
        self.tasks
            .lock()
            .map_err(|_| CacheError::Scheduler("task table lock poisoned".to_string()))
    }

    /// Number of live triggers.
    pub fn active_tasks(&self) -> usize {
        self.lock()
            .map(|tasks| tasks.values().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Aborts the trigger registered under `task_id`; returns whether one existed.
    pub fn cancel(&self, task_id: &str) -> bool {
        match self.lock() {
            Ok(mut tasks) => match tasks.remove(task_id) {
                Some(handle) => {
                    handle.abort();
                    info!("Cancelled task '{}'", task_id);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Aborts every trigger.
    pub fn shutdown(&self) {
        if let Ok(mut tasks) = self.lock() {
            for (task_id, handle) in tasks.drain() {
                handle.abort();
                debug!("Aborted task '{}'", task_id);
            }
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn register_repeating(
        &self,
        task_id: &str,
        interval: Duration,
        target: Arc<dyn SweepTarget>,
    ) -> Result<bool> {
        if interval.is_zero() {
            return Err(CacheError::Scheduler(format!(
                "task '{}' needs a non-zero interval",
                task_id
            )));
        }

        let mut tasks = self.lock()?;
        if let Some(handle) = tasks.get(task_id) {
            if !handle.is_finished() {
                debug!("Task '{}' already registered", task_id);
                return Ok(false);
            }
        }

        let handle = spawn_sweep_task(task_id.to_string(), target, interval);
        tasks.insert(task_id.to_string(), handle);
        Ok(true)
    }

    fn is_registered(&self, task_id: &str) -> bool {
        self.lock()
            .map(|tasks| tasks.get(task_id).is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
