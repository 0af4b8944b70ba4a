//! In-memory imagery gateway.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use earth_engine::{
    GatewayError, GatewayResult, ImageQuery, ImageSource, ImageryGateway, ThumbnailSpec,
};
use terra_common::DateWindow;

/// A call received by [`FakeGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    EnsureReady,
    CheckConnection,
    CountImages {
        collection: String,
        window: DateWindow,
    },
    ThumbnailUrl {
        query: ImageQuery,
        spec: ThumbnailSpec,
    },
}

/// Gateway returning canned answers and recording every call.
///
/// Collections report one image unless configured otherwise.
pub struct FakeGateway {
    counts: HashMap<String, u64>,
    init_error: Option<String>,
    upstream_error: Option<String>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            init_error: None,
            upstream_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Report `count` images for `collection` on any date.
    pub fn with_count(mut self, collection: &str, count: u64) -> Self {
        self.counts.insert(collection.to_string(), count);
        self
    }

    /// Fail authentication with `message`.
    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    /// Fail every imagery call after authentication with `message`.
    pub fn failing_upstream(mut self, message: &str) -> Self {
        self.upstream_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn count_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GatewayCall::CountImages { .. }))
            .count()
    }

    /// Thumbnail requests received, in order.
    pub fn thumbnail_requests(&self) -> Vec<(ImageQuery, ThumbnailSpec)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCall::ThumbnailUrl { query, spec } => Some((query, spec)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check_init(&self) -> GatewayResult<()> {
        match &self.init_error {
            Some(message) => Err(GatewayError::Auth(message.clone())),
            None => Ok(()),
        }
    }

    fn check_upstream(&self) -> GatewayResult<()> {
        self.check_init()?;
        match &self.upstream_error {
            Some(message) => Err(GatewayError::Api {
                code: 500,
                status: "INTERNAL".to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ImageryGateway for FakeGateway {
    async fn ensure_ready(&self) -> GatewayResult<()> {
        self.record(GatewayCall::EnsureReady);
        self.check_init()
    }

    async fn check_connection(&self) -> GatewayResult<bool> {
        self.record(GatewayCall::CheckConnection);
        self.check_upstream()?;
        Ok(true)
    }

    async fn count_images(&self, collection: &str, window: &DateWindow) -> GatewayResult<u64> {
        self.record(GatewayCall::CountImages {
            collection: collection.to_string(),
            window: *window,
        });
        self.check_upstream()?;
        Ok(self.counts.get(collection).copied().unwrap_or(1))
    }

    async fn thumbnail_url(&self, query: &ImageQuery, spec: &ThumbnailSpec) -> GatewayResult<String> {
        self.record(GatewayCall::ThumbnailUrl {
            query: query.clone(),
            spec: spec.clone(),
        });
        self.check_upstream()?;
        let source = match &query.source {
            ImageSource::Asset(id) => id.clone(),
            ImageSource::FirstInWindow { collection, window } => {
                format!("{}@{}", collection, window.start_str())
            }
        };
        Ok(format!(
            "https://earthengine.test/v1/thumbnails/{}/{}:getPixels",
            source.replace('/', "_"),
            query.band
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_and_counts() {
        let gateway = FakeGateway::new().with_count("EMPTY", 0);
        let window = DateWindow::single_day(chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).unwrap();

        assert_eq!(gateway.count_images("EMPTY", &window).await.unwrap(), 0);
        assert_eq!(gateway.count_images("OTHER", &window).await.unwrap(), 1);
        assert_eq!(gateway.count_calls(), 2);
    }

    #[tokio::test]
    async fn test_init_failure_precedes_upstream_failure() {
        let gateway = FakeGateway::new().failing_init("bad key").failing_upstream("boom");
        let err = gateway.check_connection().await.unwrap_err();
        assert!(err.is_init_failure());
    }
}
