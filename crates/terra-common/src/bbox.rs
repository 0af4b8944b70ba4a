//! Geographic framing types: bounding regions and map centers.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in degrees.
///
/// Serialized as `[west, south, east, north]`, the order the imagery service
/// expects for rectangle geometries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Edges in `[west, south, east, north]` order.
    pub fn as_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(edges: [f64; 4]) -> Self {
        Self::new(edges[0], edges[1], edges[2], edges[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.as_array()
    }
}

/// A longitude/latitude pair, serialized as `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_serializes_as_edge_array() {
        let bbox = BoundingBox::new(-140.0, 15.0, -60.0, 60.0);
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[-140.0,15.0,-60.0,60.0]");

        let parsed: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, bbox);
    }
}
