//! Response DTOs for the lake cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use super::LakeConditions;
use crate::cache::CacheStats;

/// Response body for `GET /lakes/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The cached record
    pub value: LakeConditions,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: LakeConditions) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /lakes/:key`
///
/// The message does not reveal whether a gated overwrite was dropped.
#[derive(Debug, Clone, Serialize)]
pub struct PutResponse {
    /// Success message
    pub message: String,
    /// The key that was written
    pub key: String,
}

impl PutResponse {
    /// Creates a new PutResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' stored", key),
            key,
        }
    }
}

/// Response body for `DELETE /lakes/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed", key),
            key,
        }
    }
}

/// Response body for `GET /size`
#[derive(Debug, Clone, Serialize)]
pub struct SizeResponse {
    /// Stored rows, including expired rows awaiting eviction
    pub entries: u64,
}

/// Response body for `POST /sweep`
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    /// Rows removed by this sweep
    pub removed: usize,
}

/// Response body for `GET /stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / all reads)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_response_serialize() {
        let resp = PutResponse::new("ME");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("ME"));
        assert!(json.contains("stored"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("MO");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("MO"));
        assert!(json.contains("removed"));
    }

    #[test]
    fn test_stats_response_is_flat() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(StatsResponse::new(stats)).unwrap();
        assert_eq!(json["hits"], 3);
        assert_eq!(json["misses"], 1);
        assert!((json["hit_rate"].as_f64().unwrap() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
