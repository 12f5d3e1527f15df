//! Cache Statistics Module
//!
//! Tracks read outcomes, write outcomes and sweep activity.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found no row at all
    pub misses: u64,
    /// Reads that found an expired row and queued its eviction
    pub expired_reads: u64,
    /// Puts that inserted a new row
    pub inserts: u64,
    /// Puts or swaps that overwrote a live row
    pub updates: u64,
    /// Puts silently dropped because the update gate was closed
    pub dropped_updates: u64,
    /// Completed sweeps
    pub sweeps: u64,
    /// Rows deleted by sweeps
    pub swept_entries: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses + expired reads), or 0.0 if no reads happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expired_reads;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by concurrent callers.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    expired_reads: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    dropped_updates: AtomicU64,
    sweeps: AtomicU64,
    swept_entries: AtomicU64,
}

impl StatsRecorder {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired_read(&self) {
        self.expired_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_update(&self) {
        self.dropped_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.swept_entries
            .fetch_add(removed as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired_reads: self.expired_reads.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            dropped_updates: self.dropped_updates.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            swept_entries: self.swept_entries.load(Ordering::Relaxed),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsRecorder::default().snapshot();
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_expired_reads_as_misses() {
        let recorder = StatsRecorder::default();
        recorder.record_hit();
        recorder.record_miss();
        recorder.record_expired_read();
        recorder.record_hit();

        let stats = recorder.snapshot();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_sweep() {
        let recorder = StatsRecorder::default();
        recorder.record_sweep(3);
        recorder.record_sweep(0);

        let stats = recorder.snapshot();
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.swept_entries, 3);
    }

    #[test]
    fn test_write_counters() {
        let recorder = StatsRecorder::default();
        recorder.record_insert();
        recorder.record_update();
        recorder.record_dropped_update();
        recorder.record_dropped_update();

        let stats = recorder.snapshot();
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.dropped_updates, 2);
    }
}
