//! Background eviction of rows found stale by readers.
//!
//! Readers never wait for these deletes. Commands are handled in order by a
//! single detached task, so a barrier completes only after every eviction
//! queued before it has run.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::storage::{Predicate, StorageGateway};

enum Command {
    Evict { key: String, cutoff_ms: i64 },
    Barrier(oneshot::Sender<()>),
}

#[derive(Debug, Clone)]
pub(crate) struct Reaper {
    tx: mpsc::UnboundedSender<Command>,
}

impl Reaper {
    /// Starts the worker on the current tokio runtime.
    ///
    /// The worker exits once every `Reaper` handle has been dropped.
    pub fn spawn(gateway: Arc<dyn StorageGateway>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();

        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Evict { key, cutoff_ms } => {
                        let predicate = Predicate::KeyExpiredBefore {
                            key: key.clone(),
                            cutoff_ms,
                        };
                        match gateway.delete_where(predicate).await {
                            Ok(removed) => {
                                debug!("Lazy eviction of '{}' removed {} row(s)", key, removed)
                            }
                            // Left for the next sweep or the next read
                            Err(e) => warn!("Lazy eviction of '{}' failed: {}", key, e),
                        }
                    }
                    Command::Barrier(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("Eviction worker stopped");
        });

        Self { tx }
    }

    /// Queues deletion of the rows for `key` that expired before `cutoff_ms`.
    pub fn evict(&self, key: &str, cutoff_ms: i64) {
        let command = Command::Evict {
            key: key.to_string(),
            cutoff_ms,
        };
        if self.tx.send(command).is_err() {
            warn!("Eviction worker is gone, '{}' left for the sweep", key);
        }
    }

    /// Resolves once all previously queued evictions have been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Barrier(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}
