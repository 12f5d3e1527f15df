//! Gateway trait, row shape and selection predicates.

use async_trait::async_trait;

use crate::error::Result;

// == Stored Row ==
/// One physical row of the cache table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    /// Lookup key (a lake identifier)
    pub key: String,
    /// Encoded value
    pub payload: String,
    /// Absolute expiration instant (Unix milliseconds)
    pub expires_at_ms: i64,
}

impl StoredRow {
    pub fn new(key: impl Into<String>, payload: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            expires_at_ms,
        }
    }
}

// == Predicate ==
/// Row selection used by update, delete and query calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `key = ?`
    KeyEquals(String),
    /// `expires_at_ms <= ?`, the sweep's bulk selection
    ExpiresAtOrBefore(i64),
    /// `key = ? AND expires_at_ms < ?`
    ///
    /// Lazy eviction deletes with this so that a row re-inserted for the same
    /// key after the stale one was observed survives.
    KeyExpiredBefore { key: String, cutoff_ms: i64 },
    /// `key = ? AND expires_at_ms >= ?`, the rows still served at that instant
    KeyLiveAt { key: String, now_ms: i64 },
    /// `key = ? AND payload = ? AND expires_at_ms >= ?`, the guard of compare-and-swap
    KeyWithPayload {
        key: String,
        payload: String,
        live_at_ms: i64,
    },
}

impl Predicate {
    /// Evaluates the predicate against a row held in memory.
    pub fn matches(&self, row: &StoredRow) -> bool {
        match self {
            Predicate::KeyEquals(key) => row.key == *key,
            Predicate::ExpiresAtOrBefore(at) => row.expires_at_ms <= *at,
            Predicate::KeyExpiredBefore { key, cutoff_ms } => {
                row.key == *key && row.expires_at_ms < *cutoff_ms
            }
            Predicate::KeyLiveAt { key, now_ms } => {
                row.key == *key && row.expires_at_ms >= *now_ms
            }
            Predicate::KeyWithPayload {
                key,
                payload,
                live_at_ms,
            } => row.key == *key && row.payload == *payload && row.expires_at_ms >= *live_at_ms,
        }
    }
}

// == Storage Gateway ==
/// Abstract durable CRUD boundary.
///
/// Every call is individually atomic; nothing spans calls. The gateway
/// enforces no uniqueness on `key`. Any failure is reported as
/// [`CacheError::Storage`](crate::error::CacheError::Storage); an empty query
/// result is not a failure.
#[async_trait]
pub trait StorageGateway: Send + Sync + std::fmt::Debug {
    /// Inserts a row and returns its row id.
    async fn insert(&self, row: StoredRow) -> Result<i64>;

    /// Overwrites every row matching `predicate` with `row`; returns rows affected.
    async fn update_where(&self, predicate: Predicate, row: StoredRow) -> Result<u64>;

    /// Deletes every row matching `predicate`; returns rows affected.
    async fn delete_where(&self, predicate: Predicate) -> Result<u64>;

    /// Returns matching rows in insertion order.
    async fn query_where(&self, predicate: Predicate) -> Result<Vec<StoredRow>>;

    /// Counts all rows, expired or not.
    async fn count(&self) -> Result<u64>;
}
