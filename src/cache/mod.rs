//! Cache Module
//!
//! Persisted key/value cache with per-entry expiration, lazy eviction on read
//! and a periodic sweep.

mod clock;
mod entry;
mod reaper;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{TimeoutCache, SWEEP_TASK_ID};
