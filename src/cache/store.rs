//! Timeout Cache Module
//!
//! Write-through cache over a [`StorageGateway`] where every entry carries an
//! absolute expiration instant. Stale entries are dropped lazily on read and
//! in bulk by a periodic sweep.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::entry::{encode, is_stale, CacheEntry};
use super::reaper::Reaper;
use super::stats::{CacheStats, StatsRecorder};
use crate::config::{Config, UpdatePolicy};
use crate::error::Result;
use crate::storage::{Predicate, StorageGateway, StoredRow};
use crate::tasks::{Scheduler, SweepTarget};

/// Stable identifier of the periodic sweep trigger.
pub const SWEEP_TASK_ID: &str = "lake-cache-sweep";

/// Outcome of looking a key up in storage.
enum Lookup {
    Missing,
    Expired,
    Live(StoredRow),
}

// == Timeout Cache ==
/// Persisted cache of one value type keyed by string.
///
/// Every operation round-trips to the gateway; there is no in-memory copy.
/// `size` counts physical rows, so expired rows that have not been evicted
/// yet are included.
pub struct TimeoutCache<V> {
    gateway: Arc<dyn StorageGateway>,
    clock: Arc<dyn Clock>,
    default_timeout: Duration,
    update_policy: UpdatePolicy,
    /// Instance-wide gate consulted by `UpdatePolicy::Gated`
    update_gate: AtomicBool,
    /// Serializes the read-decide-write sequence of puts on this instance
    write_lock: Mutex<()>,
    reaper: Reaper,
    stats: StatsRecorder,
    _value: PhantomData<fn() -> V>,
}

impl<V> std::fmt::Debug for TimeoutCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutCache")
            .field("gateway", &self.gateway)
            .field("default_timeout", &self.default_timeout)
            .field("update_policy", &self.update_policy)
            .field("update_gate", &self.update_gate.load(Ordering::SeqCst))
            .finish()
    }
}

impl<V> TimeoutCache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache on the system clock and registers its sweep.
    ///
    /// Must be called from within a tokio runtime. Registration is idempotent:
    /// if `scheduler` already has a live sweep trigger, none is added.
    pub fn new(
        gateway: Arc<dyn StorageGateway>,
        scheduler: &dyn Scheduler,
        config: &Config,
    ) -> Result<Arc<Self>> {
        Self::with_clock(gateway, scheduler, config, Arc::new(SystemClock))
    }

    /// Like [`TimeoutCache::new`] with an explicit time source.
    pub fn with_clock(
        gateway: Arc<dyn StorageGateway>,
        scheduler: &dyn Scheduler,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>> {
        let cache = Arc::new(Self {
            reaper: Reaper::spawn(Arc::clone(&gateway)),
            gateway,
            clock,
            default_timeout: config.default_timeout_duration(),
            update_policy: config.update_policy,
            update_gate: AtomicBool::new(false),
            write_lock: Mutex::new(()),
            stats: StatsRecorder::default(),
            _value: PhantomData,
        });

        let target: Arc<dyn SweepTarget> = cache.clone();
        if scheduler.register_repeating(SWEEP_TASK_ID, config.sweep_interval_duration(), target)? {
            info!(
                "Registered '{}' every {} seconds",
                SWEEP_TASK_ID, config.sweep_interval
            );
        } else {
            debug!("'{}' already registered, reusing it", SWEEP_TASK_ID);
        }

        Ok(cache)
    }

    // == Put ==
    /// Stores `value` under `key` with the default timeout.
    ///
    /// Inserts when the key has no live entry. Otherwise the live entry is
    /// overwritten only as the update policy allows; a refused overwrite is
    /// silently dropped and the stored value stays as it was.
    pub async fn put(&self, key: &str, value: V) -> Result<()> {
        self.put_impl(key, value, self.default_timeout).await
    }

    /// Stores `value` under `key`, expiring `timeout_secs` seconds from now.
    pub async fn put_with_timeout(&self, key: &str, value: V, timeout_secs: u32) -> Result<()> {
        self.put_impl(key, value, Duration::from_secs(u64::from(timeout_secs)))
            .await
    }

    async fn put_impl(&self, key: &str, value: V, timeout: Duration) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // One instant decides liveness and targets the update
        let now = self.clock.now_ms();
        let lookup = self.lookup(key, now).await?;
        let row = CacheEntry::new(key, value, now, timeout).to_row()?;

        if !matches!(lookup, Lookup::Live(_)) {
            return self.insert_row(key, row).await;
        }

        if !self.take_update_permit() {
            self.stats.record_dropped_update();
            debug!("Update gate closed, kept cached '{}'", key);
            return Ok(());
        }

        let predicate = Predicate::KeyLiveAt {
            key: key.to_string(),
            now_ms: now,
        };
        match self.gateway.update_where(predicate, row.clone()).await {
            Ok(0) => {
                // The live row was removed between lookup and update
                self.return_update_permit();
                debug!("Live '{}' vanished before update, inserting", key);
                self.insert_row(key, row).await
            }
            Ok(_) => {
                self.stats.record_update();
                debug!("Updated '{}'", key);
                Ok(())
            }
            Err(e) => {
                self.return_update_permit();
                Err(e)
            }
        }
    }

    async fn insert_row(&self, key: &str, row: StoredRow) -> Result<()> {
        self.gateway.insert(row).await?;
        self.stats.record_insert();
        debug!("Inserted '{}'", key);
        Ok(())
    }

    // == Get ==
    /// Retrieves the live value for `key`.
    ///
    /// Returns `Ok(None)` when there is no entry or it has expired. An expired
    /// row is handed to the background evictor and may stay physically present
    /// for a short while after this returns.
    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        match self.lookup(key, self.clock.now_ms()).await? {
            Lookup::Live(row) => {
                let entry = CacheEntry::<V>::from_row(row)?;
                self.stats.record_hit();
                Ok(Some(entry.value))
            }
            Lookup::Expired => {
                self.stats.record_expired_read();
                Ok(None)
            }
            Lookup::Missing => {
                self.stats.record_miss();
                Ok(None)
            }
        }
    }

    /// Reads every row for `key` and judges the one expiring last at `now`.
    ///
    /// Rows found stale are queued for eviction.
    async fn lookup(&self, key: &str, now: i64) -> Result<Lookup> {
        let rows = self
            .gateway
            .query_where(Predicate::KeyEquals(key.to_string()))
            .await?;

        let has_stale = rows.iter().any(|r| is_stale(r.expires_at_ms, now));
        if has_stale {
            self.reaper.evict(key, now);
        }

        match rows.into_iter().max_by_key(|r| r.expires_at_ms) {
            None => Ok(Lookup::Missing),
            Some(row) if is_stale(row.expires_at_ms, now) => {
                debug!("'{}' expired, queued for eviction", key);
                Ok(Lookup::Expired)
            }
            Some(row) => Ok(Lookup::Live(row)),
        }
    }

    // == Compare And Swap ==
    /// Replaces the live value for `key` only if it still equals `expected`.
    ///
    /// Independent of the update gate. Equality is judged on the encoded
    /// payload, so `V` must encode deterministically. The new entry gets the
    /// default timeout. Returns whether the swap happened.
    pub async fn compare_and_swap(&self, key: &str, expected: &V, new: V) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let now = self.clock.now_ms();
        let predicate = Predicate::KeyWithPayload {
            key: key.to_string(),
            payload: encode(expected)?,
            live_at_ms: now,
        };
        let row = CacheEntry::new(key, new, now, self.default_timeout).to_row()?;

        let swapped = self.gateway.update_where(predicate, row).await? > 0;
        if swapped {
            self.stats.record_update();
        }
        debug!("Compare-and-swap on '{}': swapped={}", key, swapped);
        Ok(swapped)
    }
}

impl<V> TimeoutCache<V> {
    // == Remove ==
    /// Deletes every row for `key`. Removing an absent key is not an error.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let removed = self
            .gateway
            .delete_where(Predicate::KeyEquals(key.to_string()))
            .await?;
        debug!("Removed '{}' ({} row(s))", key, removed);
        Ok(())
    }

    // == Size ==
    /// Number of stored rows, including expired rows not yet evicted.
    pub async fn size(&self) -> Result<u64> {
        self.gateway.count().await
    }

    // == Remove Expired ==
    /// Deletes every row whose expiration instant is at or before now.
    ///
    /// Expired keys are collected first, then deleted one by one; each delete
    /// commits on its own, so concurrent reads and writes keep flowing. A row
    /// written for the same key in the meantime is never touched.
    ///
    /// Returns the number of rows removed.
    pub async fn remove_expired_entries(&self) -> Result<usize> {
        let now = self.clock.now_ms();
        let expired = self
            .gateway
            .query_where(Predicate::ExpiresAtOrBefore(now))
            .await?;

        let keys: BTreeSet<String> = expired.into_iter().map(|row| row.key).collect();
        let mut removed = 0usize;
        for key in keys {
            let predicate = Predicate::KeyExpiredBefore {
                key,
                cutoff_ms: now.saturating_add(1),
            };
            removed += self.gateway.delete_where(predicate).await? as usize;
        }

        self.stats.record_sweep(removed);
        if removed > 0 {
            info!("Removed {} expired entries", removed);
        }
        Ok(removed)
    }

    // == Update Gate ==
    /// Allows the next overwrite of a live entry under `UpdatePolicy::Gated`.
    pub fn open_update_gate(&self) {
        self.update_gate.store(true, Ordering::SeqCst);
    }

    pub fn is_update_gate_open(&self) -> bool {
        self.update_gate.load(Ordering::SeqCst)
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    /// Consumes the gate atomically, so one opening admits exactly one update.
    fn take_update_permit(&self) -> bool {
        match self.update_policy {
            UpdatePolicy::Upsert => true,
            UpdatePolicy::Gated => self
                .update_gate
                .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok(),
        }
    }

    /// Reopens the gate for a permit that did not result in an update.
    fn return_update_permit(&self) {
        if self.update_policy == UpdatePolicy::Gated {
            self.update_gate.store(true, Ordering::SeqCst);
        }
    }

    /// Waits until every eviction queued by earlier reads has been attempted.
    pub async fn flush_evictions(&self) {
        self.reaper.flush().await;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

#[async_trait]
impl<V> SweepTarget for TimeoutCache<V> {
    async fn sweep(&self) -> Result<usize> {
        self.remove_expired_entries().await
    }
}
