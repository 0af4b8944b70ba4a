//! HTML page handlers.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use terra_common::TerraError;

use super::common::{html_error, html_response, run_image_request, ImageParams};
use crate::pages;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ViewerParams {
    pub dataset: Option<String>,
}

/// GET / - dataset gallery
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    html_response(StatusCode::OK, pages::gallery(&state.registry))
}

/// GET /viewer - parameter selection for one dataset
pub async fn viewer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ViewerParams>,
) -> Response {
    let found = match params.dataset.filter(|d| !d.is_empty()) {
        Some(id) => state.registry.find(&id).ok_or(TerraError::DatasetNotFound(id)),
        None => state
            .registry
            .default_dataset()
            .ok_or_else(|| TerraError::DatasetNotFound(String::new())),
    };

    match found {
        Ok(dataset) => html_response(StatusCode::OK, pages::viewer(dataset)),
        Err(e) => html_error(&e, state.debug),
    }
}

/// GET /static_image - full-page image with legend
pub async fn static_image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ImageParams>,
) -> Response {
    match run_image_request(&state, params).await {
        Ok(rendered) => html_response(StatusCode::OK, pages::static_image(&rendered)),
        Err(e) => html_error(&e, state.debug),
    }
}
