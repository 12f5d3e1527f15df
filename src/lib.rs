//! Lake Cache - a persisted, time-expiring cache of lake conditions
//!
//! Every entry carries an absolute expiration instant. Stale entries are
//! evicted lazily on read and purged in bulk by a periodic sweep. Storage is
//! reached only through the [`storage::StorageGateway`] CRUD boundary.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{TimeoutCache, SWEEP_TASK_ID};
pub use config::{Config, UpdatePolicy};
pub use error::{CacheError, Result};
pub use models::LakeConditions;
pub use tasks::{IntervalScheduler, Scheduler};

/// The cache as deployed: lake conditions keyed by lake id.
pub type LakeCache = TimeoutCache<LakeConditions>;
