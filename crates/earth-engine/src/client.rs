//! Earth Engine REST client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use terra_common::DateWindow;

use crate::credentials::{self, AccessToken, ServiceAccountKey};
use crate::error::{GatewayError, GatewayResult};
use crate::expression::{Expression, ValueNode};
use crate::gateway::{ImageQuery, ImageryGateway, ThumbnailSpec};

/// Public REST endpoint of the service.
pub const DEFAULT_API_BASE: &str = "https://earthengine.googleapis.com/v1";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct EarthEngineConfig {
    /// Service-account key file.
    pub credentials_path: PathBuf,
    /// Cloud project to bill; defaults to the key's `project_id`.
    pub project: Option<String>,
    /// REST API base URL, without trailing slash.
    pub api_base: String,
}

impl EarthEngineConfig {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            project: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Authenticated state, established lazily and refreshed on expiry.
#[derive(Debug, Clone)]
struct Session {
    project: String,
    token: AccessToken,
}

#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ThumbnailResponse {
    name: String,
}

/// [`ImageryGateway`] over the Earth Engine REST API.
pub struct EarthEngineClient {
    http: reqwest::Client,
    config: EarthEngineConfig,
    session: Mutex<Option<Session>>,
}

impl EarthEngineClient {
    pub fn new(config: EarthEngineConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    pub fn with_http_client(http: reqwest::Client, config: EarthEngineConfig) -> Self {
        Self {
            http,
            config: EarthEngineConfig {
                api_base: config.api_base.trim_end_matches('/').to_string(),
                ..config
            },
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EarthEngineConfig {
        &self.config
    }

    /// Current session, authenticating when there is none or its token is
    /// about to expire. A failed attempt leaves no session behind, so the
    /// next call retries.
    async fn session(&self) -> GatewayResult<Session> {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref() {
            if session.token.is_fresh(Instant::now()) {
                return Ok(session.clone());
            }
            debug!("Access token expired, re-authenticating");
        }
        *guard = None;

        let key = ServiceAccountKey::from_file(&self.config.credentials_path)?;
        let project = self
            .config
            .project
            .clone()
            .or_else(|| key.project_id.clone())
            .ok_or_else(|| {
                GatewayError::InvalidCredentials(
                    "no project configured and key file has no project_id".to_string(),
                )
            })?;

        let token = credentials::exchange(&self.http, &key).await?;
        info!(project = %project, "Earth Engine session established");

        let session = Session { project, token };
        *guard = Some(session.clone());
        Ok(session)
    }

    fn project_url(&self, project: &str, method: &str) -> String {
        format!("{}/projects/{}/{}", self.config.api_base, project, method)
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: Value) -> GatewayResult<T> {
        let session = self.session().await?;
        let url = self.project_url(&session.project, method);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&session.token.value)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = GatewayError::from_api_body(status.as_u16(), &body);
            warn!(url = %url, error = %err, "Earth Engine request failed");
            return Err(err);
        }

        Ok(response.json::<T>().await?)
    }

    async fn compute(&self, root: ValueNode) -> GatewayResult<Value> {
        let body = json!({ "expression": Expression::new(root) });
        let response: ComputeResponse = self.post("value:compute", body).await?;
        Ok(response.result)
    }
}

#[async_trait]
impl ImageryGateway for EarthEngineClient {
    async fn ensure_ready(&self) -> GatewayResult<()> {
        self.session().await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn check_connection(&self) -> GatewayResult<bool> {
        let info = self.compute(ValueNode::image_constant(1.0)).await?;
        Ok(!info.is_null())
    }

    #[instrument(skip(self, window), fields(window = %window.start_str()))]
    async fn count_images(&self, collection: &str, window: &DateWindow) -> GatewayResult<u64> {
        let node = ValueNode::collection_size(ValueNode::filter_date(
            ValueNode::image_collection_load(collection),
            window,
        ));
        let result = self.compute(node).await?;
        result
            .as_u64()
            .ok_or_else(|| GatewayError::UnexpectedResponse(format!("collection size: {}", result)))
    }

    #[instrument(skip(self, spec), fields(band = %query.band))]
    async fn thumbnail_url(&self, query: &ImageQuery, spec: &ThumbnailSpec) -> GatewayResult<String> {
        let body = json!({
            "expression": Expression::new(spec.apply(query.to_node())),
            "fileFormat": spec.format.as_api_str(),
        });
        let thumbnail: ThumbnailResponse = self.post("thumbnails", body).await?;
        debug!(name = %thumbnail.name, "Thumbnail created");
        Ok(format!("{}/{}:getPixels", self.config.api_base, thumbnail.name))
    }
}
