//! Router configuration for the web server.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/status", get(handlers::api_status))
        .route("/ocr", post(handlers::ocr_image))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
