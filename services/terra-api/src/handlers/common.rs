//! Request parameters and error responses shared by the handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use terra_common::{TerraError, TerraResult};

use crate::metrics::{family_label, record_image_request};
use crate::pages;
use crate::pipeline::{render_image, ImageRequest, RenderedImage};
use crate::state::AppState;

/// Query parameters of `/api/get_image` and `/static_image`.
#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    pub dataset: Option<String>,
    pub variable: Option<String>,
    pub date: Option<String>,
}

impl ImageParams {
    /// Fill in the default dataset when none (or an empty one) was given.
    pub fn into_request(self, state: &AppState) -> ImageRequest {
        let dataset = self
            .dataset
            .filter(|d| !d.is_empty())
            .or_else(|| state.registry.default_dataset().map(|d| d.id.clone()))
            .unwrap_or_default();
        ImageRequest {
            dataset,
            variable: self.variable,
            date: self.date,
        }
    }
}

/// Run the pipeline inside a per-request span and count the outcome.
pub async fn run_image_request(state: &AppState, params: ImageParams) -> TerraResult<RenderedImage> {
    let request = params.into_request(state);
    let span = tracing::info_span!(
        "image_request",
        request_id = %Uuid::new_v4(),
        dataset = %request.dataset
    );

    async {
        let outcome = render_image(&state.registry, state.gateway.as_ref(), &request).await;
        let label = match &outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        record_image_request(family_label(&request.dataset), label);
        outcome
    }
    .instrument(span)
    .await
}

/// User message, with the failure detail appended in debug mode.
pub fn message_for(err: &TerraError, debug: bool) -> String {
    match (debug, err.detail()) {
        (true, Some(detail)) => format!("{} ({})", err.user_message(), detail),
        _ => err.user_message(),
    }
}

fn status_for(err: &TerraError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// `{"error": message}` with the error's status.
pub fn json_error(err: &TerraError, debug: bool) -> Response {
    (status_for(err), Json(json!({ "error": message_for(err, debug) }))).into_response()
}

/// Error page with the error's status.
pub fn html_error(err: &TerraError, debug: bool) -> Response {
    let status = status_for(err);
    html_response(status, pages::error_page(status.as_u16(), &message_for(err, debug)))
}

pub fn html_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        body,
    )
        .into_response()
}
