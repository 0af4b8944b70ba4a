//! Common types shared across the TerraSight services.
//!
//! Holds the static dataset catalog, the visualization parameter tables and
//! the error taxonomy used at the HTTP boundary.

pub mod bbox;
pub mod dataset;
pub mod error;
pub mod legend;
pub mod registry;
pub mod time;
pub mod vis;

pub use bbox::{BoundingBox, GeoPoint};
pub use dataset::{DatasetCategory, DatasetDescriptor, DateRange, VariableDescriptor, VariableKind};
pub use error::{TerraError, TerraResult};
pub use legend::{build_legend, css_color, LegendEntry};
pub use registry::Registry;
pub use time::{parse_date, DateParseError, DateWindow, DATE_FORMAT};
pub use vis::{resolve, VisualizationParameters};
