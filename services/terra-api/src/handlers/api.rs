//! JSON API handlers.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::common::{json_error, run_image_request, ImageParams};
use crate::state::AppState;

const INIT_FAILED: &str = "Échec de l'initialisation de Earth Engine";
const CONNECTION_FAILED: &str = "Échec de la connexion à Earth Engine";
const CONNECTION_OK: &str = "Connexion à Earth Engine réussie";

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub status: &'static str,
    pub message: String,
}

impl ConnectionStatus {
    fn success() -> Self {
        Self {
            status: "success",
            message: CONNECTION_OK.to_string(),
        }
    }

    fn error(message: &str, detail: Option<String>) -> Self {
        let message = match detail {
            Some(detail) => format!("{} ({})", message, detail),
            None => message.to_string(),
        };
        Self {
            status: "error",
            message,
        }
    }
}

/// GET /api/test_connection
pub async fn test_connection_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let detail = |e: &dyn std::fmt::Display| state.debug.then(|| e.to_string());

    if let Err(e) = state.gateway.ensure_ready().await {
        error!(error = %e, "Earth Engine initialization failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ConnectionStatus::error(INIT_FAILED, detail(&e))),
        )
            .into_response();
    }

    match state.gateway.check_connection().await {
        Ok(true) => {
            info!("Earth Engine connection check succeeded");
            Json(ConnectionStatus::success()).into_response()
        }
        Ok(false) => Json(ConnectionStatus::error(CONNECTION_FAILED, None)).into_response(),
        Err(e) => {
            error!(error = %e, "Earth Engine connection check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ConnectionStatus::error(CONNECTION_FAILED, detail(&e))),
            )
                .into_response()
        }
    }
}

/// GET /api/get_image
pub async fn get_image_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ImageParams>,
) -> Response {
    match run_image_request(&state, params).await {
        Ok(rendered) => Json(rendered.result).into_response(),
        Err(e) => json_error(&e, state.debug),
    }
}
