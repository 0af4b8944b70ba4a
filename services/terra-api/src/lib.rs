//! TerraSight API Service Library
//!
//! HTTP server for browsing Earth Engine datasets: a gallery, a per-dataset
//! viewer, a JSON image endpoint and a full-page image view with legend.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod pages;
pub mod pipeline;
pub mod state;

use axum::{routing::get, Extension, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::pages::index_handler))
        .route("/viewer", get(handlers::pages::viewer_handler))
        .route("/static_image", get(handlers::pages::static_image_handler))
        // JSON API
        .route(
            "/api/test_connection",
            get(handlers::api::test_connection_handler),
        )
        .route("/api/get_image", get(handlers::api::get_image_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
