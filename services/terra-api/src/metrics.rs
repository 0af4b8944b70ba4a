//! Prometheus metric names and recording helpers.
//!
//! Label values are always drawn from fixed sets so request input cannot
//! create new series.

use std::time::Instant;

use crate::pipeline::dispatch;

pub const IMAGE_REQUESTS_TOTAL: &str = "terra_image_requests_total";
pub const GATEWAY_DURATION_SECONDS: &str = "terra_gateway_duration_seconds";

/// Family label for a requested dataset; `unknown` for anything unwired.
pub fn family_label(dataset_id: &str) -> &'static str {
    dispatch(dataset_id).map(|p| p.family).unwrap_or("unknown")
}

/// Count one image request by family and outcome (`ok` or the error kind).
pub fn record_image_request(family: &'static str, outcome: &'static str) {
    metrics::counter!(
        IMAGE_REQUESTS_TOTAL,
        "family" => family,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_gateway_call(operation: &'static str, started: Instant) {
    metrics::histogram!(GATEWAY_DURATION_SECONDS, "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
