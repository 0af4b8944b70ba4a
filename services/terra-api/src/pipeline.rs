//! Request dispatch and the image processing pipeline.
//!
//! Every wired dataset maps to a [`ProcessorProfile`]; one pipeline runs for
//! all of them. Temporal profiles filter the collection to a single day and
//! bail out with [`TerraError::NoData`] when nothing matched; static profiles
//! render the referenced image directly.

use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info};

use earth_engine::{GatewayError, ImageQuery, ImageryGateway, ThumbnailFormat, ThumbnailSpec};
use terra_common::{
    parse_date, resolve, DatasetDescriptor, DateWindow, Registry, TerraError, TerraResult,
    VisualizationParameters, DATE_FORMAT,
};

use crate::metrics;

/// Output size of every thumbnail.
pub const THUMBNAIL_WIDTH: u32 = 1200;
pub const THUMBNAIL_HEIGHT: u32 = 800;

/// Per-family processing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorProfile {
    /// Label used in logs and user-facing messages.
    pub family: &'static str,
    /// Whether the dataset is filtered to a single day.
    pub temporal: bool,
    /// Date used when neither the request nor the descriptor has one.
    pub fallback_date: Option<&'static str>,
}

const DAYMET: ProcessorProfile = ProcessorProfile {
    family: "DAYMET",
    temporal: true,
    fallback_date: None,
};

const GFS: ProcessorProfile = ProcessorProfile {
    family: "GFS",
    temporal: true,
    fallback_date: None,
};

const CHIRPS: ProcessorProfile = ProcessorProfile {
    family: "CHIRPS",
    temporal: true,
    fallback_date: None,
};

const GOES16: ProcessorProfile = ProcessorProfile {
    family: "GOES-16",
    temporal: true,
    fallback_date: Some("2022-01-01"),
};

const DEM: ProcessorProfile = ProcessorProfile {
    family: "DEM",
    temporal: false,
    fallback_date: None,
};

/// Route a dataset to its processor. `None` means nothing is wired for it.
pub fn dispatch(dataset_id: &str) -> Option<ProcessorProfile> {
    match dataset_id {
        "NASA/ORNL/DAYMET_V4" => Some(DAYMET),
        "NOAA/GFS0P25" => Some(GFS),
        "UCSB-CHG/CHIRPS/DAILY" => Some(CHIRPS),
        "NOAA/GOES/16/MCMIPC" => Some(GOES16),
        "USGS/SRTMGL1_003" | "USGS/GTOPO30" => Some(DEM),
        _ => None,
    }
}

/// Body of a successful `/api/get_image` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResult {
    pub image_url: String,
    pub vis_params: VisualizationParameters,
    pub variable_name: String,
}

/// Parameters of an image request, as received.
#[derive(Debug, Clone, Default)]
pub struct ImageRequest {
    pub dataset: String,
    pub variable: Option<String>,
    pub date: Option<String>,
}

/// A rendered image together with what was actually used to render it.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub dataset: DatasetDescriptor,
    pub variable: String,
    pub date: Option<NaiveDate>,
    pub result: ImageResult,
}

impl RenderedImage {
    pub fn date_str(&self) -> Option<String> {
        self.date.map(|d| d.format(DATE_FORMAT).to_string())
    }
}

/// Resolve, dispatch and render one image request.
pub async fn render_image(
    registry: &Registry,
    gateway: &dyn ImageryGateway,
    request: &ImageRequest,
) -> TerraResult<RenderedImage> {
    let dataset = registry
        .find(&request.dataset)
        .ok_or_else(|| TerraError::DatasetNotFound(request.dataset.clone()))?;

    let variable = request
        .variable
        .clone()
        .filter(|v| !v.is_empty())
        .or_else(|| dataset.first_variable().map(|v| v.id.clone()))
        .unwrap_or_default();

    let profile =
        dispatch(&dataset.id).ok_or_else(|| TerraError::NotImplemented(dataset.id.clone()))?;

    info!(
        dataset = %dataset.id,
        variable = %variable,
        date = ?request.date,
        family = profile.family,
        "Image request"
    );

    gateway
        .ensure_ready()
        .await
        .map_err(|e| gateway_failure(&profile, e))?;

    run_profile(gateway, &profile, dataset, &variable, request.date.as_deref()).await
}

async fn run_profile(
    gateway: &dyn ImageryGateway,
    profile: &ProcessorProfile,
    dataset: &DatasetDescriptor,
    variable: &str,
    requested_date: Option<&str>,
) -> TerraResult<RenderedImage> {
    let (query, date) = if profile.temporal {
        let date = resolve_date(profile, dataset, requested_date)?;
        let window = DateWindow::single_day(date)
            .ok_or_else(|| TerraError::InvalidDate(date.format(DATE_FORMAT).to_string()))?;

        let started = Instant::now();
        let count = gateway
            .count_images(&dataset.id, &window)
            .await
            .map_err(|e| gateway_failure(profile, e))?;
        metrics::record_gateway_call("count_images", started);

        info!(family = profile.family, count, "Images found");

        if count == 0 {
            return Err(TerraError::NoData {
                family: profile.family.to_string(),
                date: window.start_str(),
            });
        }

        (
            ImageQuery::first_in_window(dataset.id.clone(), window, variable),
            Some(date),
        )
    } else {
        (ImageQuery::asset(dataset.id.clone(), variable), None)
    };

    let vis = resolve(&dataset.id, variable);
    let spec = ThumbnailSpec {
        region: dataset.default_region,
        width: THUMBNAIL_WIDTH,
        height: THUMBNAIL_HEIGHT,
        format: ThumbnailFormat::Png,
        min: vis.min,
        max: vis.max,
        palette: vis.palette.clone(),
        gamma: vis.render_gamma(),
    };

    let started = Instant::now();
    let image_url = gateway
        .thumbnail_url(&query, &spec)
        .await
        .map_err(|e| gateway_failure(profile, e))?;
    metrics::record_gateway_call("thumbnail_url", started);

    Ok(RenderedImage {
        dataset: dataset.clone(),
        variable: variable.to_string(),
        date,
        result: ImageResult {
            image_url,
            variable_name: dataset.variable_name(variable).to_string(),
            vis_params: vis,
        },
    })
}

/// Requested date, else the descriptor's default, else the profile fallback.
fn resolve_date(
    profile: &ProcessorProfile,
    dataset: &DatasetDescriptor,
    requested: Option<&str>,
) -> TerraResult<NaiveDate> {
    match requested.filter(|s| !s.trim().is_empty()) {
        Some(raw) => parse_date(raw).map_err(|_| TerraError::InvalidDate(raw.to_string())),
        None => match (dataset.default_date, profile.fallback_date) {
            (Some(date), _) => Ok(date),
            (None, Some(fallback)) => {
                parse_date(fallback).map_err(|_| TerraError::InvalidDate(fallback.to_string()))
            }
            (None, None) => Err(TerraError::InvalidDate(String::new())),
        },
    }
}

fn gateway_failure(profile: &ProcessorProfile, err: GatewayError) -> TerraError {
    error!(family = profile.family, error = %err, "Imagery gateway call failed");
    if err.is_init_failure() {
        TerraError::Init(err.to_string())
    } else {
        TerraError::Upstream {
            family: profile.family.to_string(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{
        assert_approx_eq, builtin_registry, registry_with_unwired_dataset, FakeGateway, GatewayCall,
        UNWIRED_DATASET,
    };

    fn request(dataset: &str, variable: Option<&str>, date: Option<&str>) -> ImageRequest {
        ImageRequest {
            dataset: dataset.to_string(),
            variable: variable.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_terrain_family_shares_one_profile() {
        assert_eq!(dispatch("USGS/SRTMGL1_003"), dispatch("USGS/GTOPO30"));
        assert!(!dispatch("USGS/GTOPO30").unwrap().temporal);
        assert!(dispatch("nasa/ornl/daymet_v4").is_none());
    }

    #[test]
    fn test_every_builtin_dataset_is_wired() {
        for dataset in builtin_registry().datasets() {
            let profile = dispatch(&dataset.id).unwrap();
            assert_eq!(profile.temporal, dataset.is_temporal(), "{}", dataset.id);
        }
    }

    #[tokio::test]
    async fn test_static_dataset_skips_date_filtering() {
        let registry = builtin_registry();
        let gateway = FakeGateway::new();

        let rendered = render_image(&registry, &gateway, &request("USGS/SRTMGL1_003", Some("elevation"), None))
            .await
            .unwrap();

        assert_eq!(rendered.result.variable_name, "Élévation (m)");
        assert_approx_eq!(rendered.result.vis_params.max, 5000.0, 1e-9);
        assert!(rendered.date.is_none());
        assert_eq!(gateway.count_calls(), 0);

        let (query, spec) = gateway.thumbnail_requests().remove(0);
        assert_eq!(query, ImageQuery::asset("USGS/SRTMGL1_003", "elevation"));
        assert_eq!((spec.width, spec.height), (1200, 800));
        assert_eq!(spec.region, rendered.dataset.default_region);
    }

    #[tokio::test]
    async fn test_temporal_dataset_uses_default_date_window() {
        let registry = builtin_registry();
        let gateway = FakeGateway::new();

        let rendered = render_image(&registry, &gateway, &request("NASA/ORNL/DAYMET_V4", Some("tmax"), None))
            .await
            .unwrap();
        assert_eq!(rendered.date_str().as_deref(), Some("2020-07-15"));

        let calls = gateway.calls();
        assert_eq!(calls[0], GatewayCall::EnsureReady);
        match &calls[1] {
            GatewayCall::CountImages { collection, window } => {
                assert_eq!(collection, "NASA/ORNL/DAYMET_V4");
                assert_eq!(window.start_str(), "2020-07-15");
                assert_eq!(window.end_str(), "2020-07-16");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_temporal_dataset_defaults_to_its_default_date() {
        let registry = builtin_registry();
        let temporal: Vec<_> = registry.datasets().filter(|d| d.is_temporal()).collect();
        assert_eq!(temporal.len(), 4);

        for dataset in temporal {
            let gateway = FakeGateway::new();
            let default = dataset.default_date.unwrap();

            let rendered = render_image(&registry, &gateway, &request(&dataset.id, None, None))
                .await
                .unwrap();
            assert_eq!(rendered.date, Some(default), "{}", dataset.id);

            let windows: Vec<DateWindow> = gateway
                .calls()
                .into_iter()
                .filter_map(|c| match c {
                    GatewayCall::CountImages { collection, window } if collection == dataset.id => {
                        Some(window)
                    }
                    _ => None,
                })
                .collect();
            assert_eq!(windows.len(), 1, "{}", dataset.id);
            assert_eq!(windows[0].start, default, "{}", dataset.id);
            assert_eq!(windows[0].end, default.succ_opt().unwrap(), "{}", dataset.id);
        }
    }

    #[tokio::test]
    async fn test_date_at_calendar_limit_is_invalid() {
        let registry = builtin_registry();
        let gateway = FakeGateway::new();

        let err = render_image(
            &registry,
            &gateway,
            &request("UCSB-CHG/CHIRPS/DAILY", None, Some("+262142-12-31")),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TerraError::InvalidDate(_)));
        assert_eq!(gateway.count_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_collection_is_no_data_without_thumbnail() {
        let registry = builtin_registry();
        let gateway = FakeGateway::new().with_count("UCSB-CHG/CHIRPS/DAILY", 0);

        let err = render_image(&registry, &gateway, &request("UCSB-CHG/CHIRPS/DAILY", None, Some("2020-01-15")))
            .await
            .unwrap_err();

        match err {
            TerraError::NoData { family, date } => {
                assert_eq!(family, "CHIRPS");
                assert_eq!(date, "2020-01-15");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(gateway.thumbnail_requests().is_empty());
    }

    #[tokio::test]
    async fn test_gamma_not_forwarded_with_palette() {
        let registry = builtin_registry();
        let gateway = FakeGateway::new();

        let rendered = render_image(&registry, &gateway, &request("USGS/GTOPO30", Some("elevation"), None))
            .await
            .unwrap();
        assert_eq!(rendered.result.vis_params.gamma, Some(1.6));

        let (_, spec) = gateway.thumbnail_requests().remove(0);
        assert_eq!(spec.gamma, None);
        assert_approx_eq!(spec.min, -10.0, 1e-9);
        assert_approx_eq!(spec.max, 8000.0, 1e-9);
    }

    #[tokio::test]
    async fn test_variable_defaults_to_first_band() {
        let registry = builtin_registry();
        let gateway = FakeGateway::new();

        let rendered = render_image(&registry, &gateway, &request("NOAA/GFS0P25", Some(""), None))
            .await
            .unwrap();
        assert_eq!(rendered.variable, "temperature_2m_above_ground");
        assert_eq!(rendered.date_str().as_deref(), Some("2024-06-01"));
    }

    #[tokio::test]
    async fn test_goes_fallback_date_when_descriptor_has_none() {
        let mut registry_categories = builtin_registry().categories().to_vec();
        for category in &mut registry_categories {
            for dataset in &mut category.datasets {
                if dataset.id == "NOAA/GOES/16/MCMIPC" {
                    dataset.default_date = None;
                }
            }
        }
        let registry = Registry::new(registry_categories);
        let gateway = FakeGateway::new();

        let rendered = render_image(&registry, &gateway, &request("NOAA/GOES/16/MCMIPC", Some("CMI_C13"), None))
            .await
            .unwrap();
        assert_eq!(rendered.date_str().as_deref(), Some("2022-01-01"));
    }

    #[tokio::test]
    async fn test_error_outcomes() {
        let gateway = FakeGateway::new();

        let err = render_image(&builtin_registry(), &gateway, &request("UNKNOWN_ID", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TerraError::DatasetNotFound(_)));

        let err = render_image(&registry_with_unwired_dataset(), &gateway, &request(UNWIRED_DATASET, None, None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 501);

        let err = render_image(&builtin_registry(), &gateway, &request("NOAA/GFS0P25", None, Some("01/02/2024")))
            .await
            .unwrap_err();
        assert!(matches!(err, TerraError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn test_gateway_failures_are_classified() {
        let registry = builtin_registry();

        let gateway = FakeGateway::new().failing_init("invalid_grant");
        let err = render_image(&registry, &gateway, &request("USGS/GTOPO30", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TerraError::Init(_)));

        let gateway = FakeGateway::new().failing_upstream("Image.select: band not found");
        let err = render_image(&registry, &gateway, &request("NASA/ORNL/DAYMET_V4", Some("nope"), None))
            .await
            .unwrap_err();
        match &err {
            TerraError::Upstream { family, detail } => {
                assert_eq!(family, "DAYMET");
                assert!(detail.contains("band not found"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.user_message(), "Erreur lors du traitement DAYMET");
    }
}
