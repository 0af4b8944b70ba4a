//! The imagery gateway seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use terra_common::{BoundingBox, DateWindow};

use crate::error::GatewayResult;
use crate::expression::ValueNode;

/// Where the rendered image comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImageSource {
    /// A static image referenced directly by identifier.
    Asset(String),
    /// First image of a collection filtered to a date window. Ordering is
    /// whatever the service returns.
    FirstInWindow {
        collection: String,
        window: DateWindow,
    },
}

/// A single band of an image source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageQuery {
    pub source: ImageSource,
    pub band: String,
}

impl ImageQuery {
    pub fn asset(id: impl Into<String>, band: impl Into<String>) -> Self {
        Self {
            source: ImageSource::Asset(id.into()),
            band: band.into(),
        }
    }

    pub fn first_in_window(
        collection: impl Into<String>,
        window: DateWindow,
        band: impl Into<String>,
    ) -> Self {
        Self {
            source: ImageSource::FirstInWindow {
                collection: collection.into(),
                window,
            },
            band: band.into(),
        }
    }

    /// Expression selecting the band from the source image.
    pub fn to_node(&self) -> ValueNode {
        let image = match &self.source {
            ImageSource::Asset(id) => ValueNode::image_load(id),
            ImageSource::FirstInWindow { collection, window } => ValueNode::collection_first(
                ValueNode::filter_date(ValueNode::image_collection_load(collection), window),
            ),
        };
        ValueNode::select(image, &self.band)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbnailFormat {
    Png,
}

impl ThumbnailFormat {
    /// Value of the `fileFormat` field in thumbnail requests.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ThumbnailFormat::Png => "PNG",
        }
    }
}

/// Rendering parameters for a thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSpec {
    pub region: BoundingBox,
    pub width: u32,
    pub height: u32,
    pub format: ThumbnailFormat,
    pub min: f64,
    pub max: f64,
    pub palette: Vec<String>,
    pub gamma: Option<f64>,
}

impl ThumbnailSpec {
    /// Clip and scale `image` to the region, then map it to colors.
    pub fn apply(&self, image: ValueNode) -> ValueNode {
        let clipped = ValueNode::clip_to_bounds_and_scale(image, &self.region, self.width, self.height);
        ValueNode::visualize(clipped, self.min, self.max, &self.palette, self.gamma)
    }
}

/// Access to the remote imagery service.
#[async_trait]
pub trait ImageryGateway: Send + Sync {
    /// Make the gateway usable, authenticating if needed. Idempotent.
    async fn ensure_ready(&self) -> GatewayResult<()>;

    /// Evaluate a trivial computation and report whether a value came back.
    async fn check_connection(&self) -> GatewayResult<bool>;

    /// Number of images of `collection` acquired within `window`.
    async fn count_images(&self, collection: &str, window: &DateWindow) -> GatewayResult<u64>;

    /// URL of a rendered thumbnail of `query`.
    async fn thumbnail_url(&self, query: &ImageQuery, spec: &ThumbnailSpec) -> GatewayResult<String>;
}
