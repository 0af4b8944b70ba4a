//! Dataset and variable descriptors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bbox::{BoundingBox, GeoPoint};

/// Kind of values a variable carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Continuous,
}

/// One selectable band within a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    /// Band name on the imagery service.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
}

impl VariableDescriptor {
    pub fn continuous(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: VariableKind::Continuous,
        }
    }
}

/// Inclusive range of dates for which a dataset has coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A remote image or image collection exposed by the imagery service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Collection or image identifier on the imagery service.
    pub id: String,
    pub name: String,
    pub description: String,
    pub variables: Vec<VariableDescriptor>,
    pub default_date: Option<NaiveDate>,
    pub date_range: Option<DateRange>,
    pub default_region: BoundingBox,
    pub default_zoom: u8,
    pub default_center: GeoPoint,
}

impl DatasetDescriptor {
    /// Create a static (non-temporal) dataset covering the whole globe.
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            variables: Vec::new(),
            default_date: None,
            date_range: None,
            default_region: BoundingBox::new(-180.0, -90.0, 180.0, 90.0),
            default_zoom: 2,
            default_center: GeoPoint::new(0.0, 0.0),
        }
    }

    pub fn with_variable(mut self, id: &str, name: &str) -> Self {
        self.variables.push(VariableDescriptor::continuous(id, name));
        self
    }

    pub fn with_default_date(mut self, date: NaiveDate) -> Self {
        self.default_date = Some(date);
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange { start, end });
        self
    }

    pub fn with_region(mut self, west: f64, south: f64, east: f64, north: f64) -> Self {
        self.default_region = BoundingBox::new(west, south, east, north);
        self
    }

    pub fn with_view(mut self, zoom: u8, lon: f64, lat: f64) -> Self {
        self.default_zoom = zoom;
        self.default_center = GeoPoint::new(lon, lat);
        self
    }

    /// Whether the dataset is partitioned by date.
    pub fn is_temporal(&self) -> bool {
        self.default_date.is_some() || self.date_range.is_some()
    }

    pub fn variable(&self, variable_id: &str) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|v| v.id == variable_id)
    }

    /// Display name of a variable, or the raw identifier when it is not listed.
    pub fn variable_name<'a>(&'a self, variable_id: &'a str) -> &'a str {
        self.variable(variable_id)
            .map(|v| v.name.as_str())
            .unwrap_or(variable_id)
    }

    pub fn first_variable(&self) -> Option<&VariableDescriptor> {
        self.variables.first()
    }
}

/// A named group of datasets shown together in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetCategory {
    pub id: String,
    pub label: String,
    pub datasets: Vec<DatasetDescriptor>,
}

impl DatasetCategory {
    pub fn new(id: impl Into<String>, label: impl Into<String>, datasets: Vec<DatasetDescriptor>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            datasets,
        }
    }
}
