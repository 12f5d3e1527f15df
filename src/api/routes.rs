//! API Routes
//!
//! Configures the Axum router with all lake cache endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, put_handler, refresh_handler, size_handler,
    stats_handler, sweep_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /lakes/:key` - Store conditions for a lake
/// - `GET /lakes/:key` - Retrieve live conditions for a lake
/// - `DELETE /lakes/:key` - Remove a lake's entry
/// - `POST /lakes/:key/refresh` - Open the update gate and store
/// - `GET /size` - Stored row count
/// - `POST /sweep` - Purge expired entries now
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/lakes/:key",
            put(put_handler).get(get_handler).delete(delete_handler),
        )
        .route("/lakes/:key/refresh", post(refresh_handler))
        .route("/size", get(size_handler))
        .route("/sweep", post(sweep_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryGateway;
    use crate::tasks::IntervalScheduler;
    use crate::LakeCache;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app(scheduler: &IntervalScheduler) -> Router {
        let cache = LakeCache::new(
            Arc::new(MemoryGateway::new()),
            scheduler,
            &Config::default(),
        )
        .unwrap();
        create_router(AppState::new(cache))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let scheduler = IntervalScheduler::new();
        let app = create_test_app(&scheduler);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_size_endpoint() {
        let scheduler = IntervalScheduler::new();
        let app = create_test_app(&scheduler);

        let response = app
            .oneshot(Request::builder().uri("/size").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let scheduler = IntervalScheduler::new();
        let app = create_test_app(&scheduler);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/lakes/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_rejects_malformed_body() {
        let scheduler = IntervalScheduler::new();
        let app = create_test_app(&scheduler);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/lakes/ME")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"value":{"lake_id":"ME"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
