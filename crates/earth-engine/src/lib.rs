//! Gateway to the remote imagery service.
//!
//! The [`ImageryGateway`] trait is the seam between request processing and
//! the imagery service. [`EarthEngineClient`] implements it over the Earth
//! Engine REST API; tests substitute an in-memory fake.

pub mod client;
pub mod credentials;
pub mod error;
pub mod expression;
pub mod gateway;

pub use client::{EarthEngineClient, EarthEngineConfig, DEFAULT_API_BASE};
pub use credentials::{AccessToken, ServiceAccountKey, EARTH_ENGINE_SCOPE};
pub use error::{GatewayError, GatewayResult};
pub use expression::{Expression, ValueNode};
pub use gateway::{ImageQuery, ImageSource, ImageryGateway, ThumbnailFormat, ThumbnailSpec};
