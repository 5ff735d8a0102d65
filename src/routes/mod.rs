use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::FavoritesStore,
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{providers::MetadataProvider, recommendations::RecommendationEngine},
};

pub mod favorites;
pub mod recommendations;
pub mod titles;

/// Shared state handed to every handler
pub struct AppState {
    pub engine: RecommendationEngine,
    pub metadata_provider: Arc<dyn MetadataProvider>,
    pub favorites: Arc<FavoritesStore>,
    /// Limit applied when a recommendation request does not set one
    pub default_limit: usize,
    /// Size of the trending sample when the request does not set one
    pub trending_count: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles", get(titles::list))
        .route("/titles/trending", get(titles::trending))
        .route("/recommendations", post(recommendations::recommend))
        .route(
            "/favorites",
            get(favorites::list)
                .post(favorites::add)
                .delete(favorites::remove),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Runs blocking storage work off the async executor
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}
