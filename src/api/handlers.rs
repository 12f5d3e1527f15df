//! API Handlers
//!
//! HTTP request handlers for each lake cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, GetResponse, HealthResponse, PutRequest, PutResponse,
    SizeResponse, StatsResponse, SweepResponse,
};
use crate::storage::SqliteGateway;
use crate::tasks::Scheduler;
use crate::LakeCache;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The cache; internally synchronized
    pub cache: Arc<LakeCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Arc<LakeCache>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the SQLite database at `config.db_path` and registers the sweep
    /// with `scheduler`.
    pub fn from_config(config: &Config, scheduler: &dyn Scheduler) -> Result<Self> {
        let gateway = Arc::new(SqliteGateway::open(&config.db_path)?);
        let cache = LakeCache::new(gateway, scheduler, config)?;
        Ok(Self::new(cache))
    }
}

fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /lakes/:key
///
/// Stores conditions under `key`, honoring the cache's update policy.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    check_key(&key)?;

    match req.timeout {
        Some(timeout) => state.cache.put_with_timeout(&key, req.value, timeout).await?,
        None => state.cache.put(&key, req.value).await?,
    }

    Ok(Json(PutResponse::new(key)))
}

/// Handler for POST /lakes/:key/refresh
///
/// Opens the update gate, then stores like `PUT`, so a live entry is replaced.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Json<PutResponse>> {
    check_key(&key)?;
    state.cache.open_update_gate();
    put_handler(State(state), Path(key), Json(req)).await
}

/// Handler for GET /lakes/:key
///
/// Returns 404 when the key is absent or expired.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /lakes/:key
///
/// Succeeds whether or not the key was present.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.remove(&key).await?;
    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /size
pub async fn size_handler(State(state): State<AppState>) -> Result<Json<SizeResponse>> {
    let entries = state.cache.size().await?;
    Ok(Json(SizeResponse { entries }))
}

/// Handler for POST /sweep
///
/// Runs an expiration sweep immediately.
pub async fn sweep_handler(State(state): State<AppState>) -> Result<Json<SweepResponse>> {
    let removed = state.cache.remove_expired_entries().await?;
    Ok(Json(SweepResponse { removed }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LakeConditions;
    use crate::storage::MemoryGateway;
    use crate::tasks::IntervalScheduler;

    fn conditions(lake_id: &str, water_temp: f64) -> LakeConditions {
        LakeConditions {
            sample_date: "2015-07-04".to_string(),
            lake_name: "Lake Mendota".to_string(),
            lake_id: lake_id.to_string(),
            air_temp: 24.0,
            water_temp,
            wind_speed: 3.0,
            wind_dir: 270,
            secchi_est: 1.8,
            phyco_median: 900.0,
            thermocline_depth: 9.0,
        }
    }

    fn test_state(scheduler: &IntervalScheduler) -> AppState {
        let cache = LakeCache::new(
            Arc::new(MemoryGateway::new()),
            scheduler,
            &Config::default(),
        )
        .unwrap();
        AppState::new(cache)
    }

    fn put_request(water_temp: f64) -> PutRequest {
        PutRequest {
            value: conditions("ME", water_temp),
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_put_and_get_handler() {
        let scheduler = IntervalScheduler::new();
        let state = test_state(&scheduler);

        let result = put_handler(
            State(state.clone()),
            Path("ME".to_string()),
            Json(put_request(22.5)),
        )
        .await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("ME".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value.water_temp, 22.5);
    }

    #[tokio::test]
    async fn test_refresh_replaces_live_entry() {
        let scheduler = IntervalScheduler::new();
        let state = test_state(&scheduler);

        put_handler(State(state.clone()), Path("ME".into()), Json(put_request(20.0)))
            .await
            .unwrap();
        put_handler(State(state.clone()), Path("ME".into()), Json(put_request(21.0)))
            .await
            .unwrap();
        let response = get_handler(State(state.clone()), Path("ME".into()))
            .await
            .unwrap();
        assert_eq!(response.value.water_temp, 20.0);

        refresh_handler(State(state.clone()), Path("ME".into()), Json(put_request(23.0)))
            .await
            .unwrap();
        let response = get_handler(State(state), Path("ME".into())).await.unwrap();
        assert_eq!(response.value.water_temp, 23.0);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let scheduler = IntervalScheduler::new();
        let state = test_state(&scheduler);

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler_is_idempotent() {
        let scheduler = IntervalScheduler::new();
        let state = test_state(&scheduler);

        let result = delete_handler(State(state.clone()), Path("ghost".to_string())).await;
        assert!(result.is_ok());

        let size = size_handler(State(state)).await.unwrap();
        assert_eq!(size.entries, 0);
    }

    #[tokio::test]
    async fn test_put_invalid_key() {
        let scheduler = IntervalScheduler::new();
        let state = test_state(&scheduler);

        let result = put_handler(State(state), Path(" ".to_string()), Json(put_request(1.0))).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_sweep_and_stats_handlers() {
        let scheduler = IntervalScheduler::new();
        let state = test_state(&scheduler);

        let swept = sweep_handler(State(state.clone())).await.unwrap();
        assert_eq!(swept.removed, 0);

        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.stats.sweeps, 1);
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
