//! Cache Entry Module
//!
//! Defines a decoded cache entry and its mapping to and from a storage row.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;
use crate::storage::StoredRow;

// == Cache Entry ==
/// A single cached value with its absolute expiration instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// Lookup key
    pub key: String,
    /// The cached value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at_ms: i64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `timeout` after `now_ms`.
    pub fn new(key: impl Into<String>, value: V, now_ms: i64, timeout: Duration) -> Self {
        Self {
            key: key.into(),
            value,
            expires_at_ms: expiry_for(now_ms, timeout),
        }
    }
}

impl<V: Serialize> CacheEntry<V> {
    /// Encodes the entry into a storage row.
    pub fn to_row(&self) -> Result<StoredRow> {
        Ok(StoredRow {
            key: self.key.clone(),
            payload: encode(&self.value)?,
            expires_at_ms: self.expires_at_ms,
        })
    }
}

impl<V: DeserializeOwned> CacheEntry<V> {
    /// Decodes a storage row.
    pub fn from_row(row: StoredRow) -> Result<Self> {
        Ok(Self {
            value: serde_json::from_str(&row.payload)?,
            key: row.key,
            expires_at_ms: row.expires_at_ms,
        })
    }
}

// == Utility Functions ==
/// Absolute expiration instant for a write at `now_ms`.
pub fn expiry_for(now_ms: i64, timeout: Duration) -> i64 {
    now_ms.saturating_add(timeout.as_millis().min(i64::MAX as u128) as i64)
}

/// `true` when a row expiring at `expires_at_ms` must not be served at `now_ms`.
pub fn is_stale(expires_at_ms: i64, now_ms: i64) -> bool {
    expires_at_ms < now_ms
}

/// Encodes a value as the row payload.
pub fn encode<V: Serialize>(value: &V) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
