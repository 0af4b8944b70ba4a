//! Tests for the HTTP routes, driven through the full router with an
//! in-memory imagery gateway.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

use earth_engine::{EarthEngineClient, EarthEngineConfig};
use terra_api::build_router;
use terra_api::config::DEFAULT_STATIC_DIR;
use terra_api::state::AppState;
use terra_common::Registry;
use test_utils::{
    assert_approx_eq, builtin_registry, registry_with_unwired_dataset, write_service_account_key,
    FakeGateway, UNWIRED_DATASET,
};

fn app(registry: Registry, gateway: Arc<FakeGateway>, debug: bool) -> Router {
    let state = AppState::new(registry, gateway).with_debug(debug);
    build_router(Arc::new(state), Path::new(DEFAULT_STATIC_DIR))
}

fn default_app(gateway: FakeGateway) -> (Router, Arc<FakeGateway>) {
    let gateway = Arc::new(gateway);
    (app(builtin_registry(), gateway.clone(), false), gateway)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

// ============================================================================
// /api/get_image
// ============================================================================

#[tokio::test]
async fn test_get_image_unknown_dataset_is_404() {
    let (app, gateway) = default_app(FakeGateway::new());

    let (status, body) = get_json(app, "/api/get_image?dataset=UNKNOWN_ID").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Dataset non trouvé");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_get_image_unwired_dataset_is_501() {
    let gateway = Arc::new(FakeGateway::new());
    let app = app(registry_with_unwired_dataset(), gateway, false);

    let (status, body) = get_json(app, &format!("/api/get_image?dataset={}", UNWIRED_DATASET)).await;

    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        body["error"],
        "Traitement non implémenté pour le dataset COPERNICUS/S2_SR"
    );
}

#[tokio::test]
async fn test_get_image_static_dataset() {
    let (app, gateway) = default_app(FakeGateway::new());

    let (status, body) =
        get_json(app, "/api/get_image?dataset=USGS/SRTMGL1_003&variable=elevation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variable_name"], "Élévation (m)");
    assert_approx_eq!(body["vis_params"]["min"].as_f64().unwrap(), 0.0, 1e-9);
    assert_approx_eq!(body["vis_params"]["max"].as_f64().unwrap(), 5000.0, 1e-9);
    assert_eq!(body["vis_params"]["palette"][0], "006600");
    assert!(body["image_url"].as_str().unwrap().ends_with(":getPixels"));
    assert_eq!(gateway.count_calls(), 0);
}

#[tokio::test]
async fn test_get_image_without_parameters_uses_defaults() {
    let (app, gateway) = default_app(FakeGateway::new());

    let (status, body) = get_json(app, "/api/get_image").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["variable_name"], "Température maximale (°C)");
    assert_approx_eq!(body["vis_params"]["min"].as_f64().unwrap(), -40.0, 1e-9);
    assert_eq!(gateway.count_calls(), 1);
}

#[tokio::test]
async fn test_get_image_no_data_is_soft_error() {
    let (app, gateway) = default_app(FakeGateway::new().with_count("UCSB-CHG/CHIRPS/DAILY", 0));

    let (status, body) = get_json(
        app,
        "/api/get_image?dataset=UCSB-CHG/CHIRPS/DAILY&variable=precipitation&date=2020-01-15",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["error"],
        "Aucune donnée CHIRPS disponible pour cette date: 2020-01-15."
    );
    assert!(gateway.thumbnail_requests().is_empty());
}

#[tokio::test]
async fn test_get_image_invalid_date_is_400() {
    let (app, gateway) = default_app(FakeGateway::new());

    let (status, body) = get_json(app, "/api/get_image?dataset=NOAA/GFS0P25&date=2024-13-45").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Date invalide: 2024-13-45"));
    assert_eq!(gateway.count_calls(), 0);
}

#[tokio::test]
async fn test_get_image_date_at_calendar_limit_is_400() {
    let (app, gateway) = default_app(FakeGateway::new());

    let (status, body) = get_json(
        app,
        "/api/get_image?dataset=UCSB-CHG/CHIRPS/DAILY&date=%2B262142-12-31",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Date invalide"));
    assert_eq!(gateway.count_calls(), 0);
}

#[tokio::test]
async fn test_get_image_init_failure_is_500() {
    let (app, _) = default_app(FakeGateway::new().failing_init("invalid_grant"));

    let (status, body) = get_json(app, "/api/get_image?dataset=USGS/GTOPO30").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Échec de l'initialisation de Earth Engine");
}

#[tokio::test]
async fn test_get_image_upstream_detail_only_in_debug() {
    let gateway = Arc::new(FakeGateway::new().failing_upstream("Image.select: band not found"));

    let (status, body) = get_json(
        app(builtin_registry(), gateway.clone(), false),
        "/api/get_image?dataset=NOAA/GFS0P25",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Erreur lors du traitement GFS");

    let (_, body) = get_json(
        app(builtin_registry(), gateway, true),
        "/api/get_image?dataset=NOAA/GFS0P25",
    )
    .await;
    assert!(body["error"].as_str().unwrap().contains("band not found"));
}

// ============================================================================
// /api/test_connection
// ============================================================================

#[tokio::test]
async fn test_connection_success() {
    let (app, _) = default_app(FakeGateway::new());

    let (status, body) = get_json(app, "/api/test_connection").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_connection_with_unsignable_key_reports_init_failure() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = write_service_account_key(&dir);
    let client = EarthEngineClient::new(EarthEngineConfig::new(key_path));
    let state = AppState::new(builtin_registry(), Arc::new(client));
    let app = build_router(Arc::new(state), Path::new(DEFAULT_STATIC_DIR));

    let (status, body) = get_json(app, "/api/test_connection").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Échec de l'initialisation de Earth Engine");
}

// ============================================================================
// HTML pages
// ============================================================================

#[tokio::test]
async fn test_gallery_page() {
    let (app, _) = default_app(FakeGateway::new());

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/viewer?dataset=NOAA/GOES/16/MCMIPC"));
}

#[tokio::test]
async fn test_viewer_page() {
    let (app, _) = default_app(FakeGateway::new());
    let (status, body) = get(app, "/viewer?dataset=UCSB-CHG/CHIRPS/DAILY").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"data-dataset="UCSB-CHG/CHIRPS/DAILY""#));

    let (app, _) = default_app(FakeGateway::new());
    let (_, body) = get(app, "/viewer").await;
    assert!(body.contains(r#"data-dataset="NASA/ORNL/DAYMET_V4""#));

    let (app, _) = default_app(FakeGateway::new());
    let (status, body) = get(app, "/viewer?dataset=UNKNOWN_ID").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Dataset non trouvé"));
}

#[tokio::test]
async fn test_static_image_page_with_legend() {
    let (app, _) = default_app(FakeGateway::new());

    let (status, body) = get(
        app,
        "/static_image?dataset=NOAA/GOES/16/MCMIPC&variable=CMI_C13&date=2022-01-01",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Canal Infrarouge"));
    assert!(body.contains("Date: 2022-01-01"));
    assert!(body.contains("background-color: black"));
    assert!(body.contains("<span>0.7</span>"));
}

#[tokio::test]
async fn test_static_image_error_page_keeps_status() {
    let (app, _) = default_app(FakeGateway::new());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/static_image?dataset=UNKNOWN_ID")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

// ============================================================================
// Operational endpoints
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = default_app(FakeGateway::new());

    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "terra-api");
}

#[tokio::test]
async fn test_static_assets_served() {
    let (app, _) = default_app(FakeGateway::new());

    let (status, body) = get(app, "/static/viewer.js").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/get_image"));
}
