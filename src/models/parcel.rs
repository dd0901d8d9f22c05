//! Cadastral parcel with its boundary in WGS84.

use geo_types::Polygon;
use geojson::{Feature, Geometry, JsonObject};

/// A resolved cadastral parcel.
///
/// The identifier is an opaque registry token (e.g. `141201_1.0001.6509`);
/// no internal structure is assumed. The boundary is the exterior ring only,
/// in WGS84; see `uldk::geometry` for why holes are absent.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub id: String,
    pub boundary: Polygon<f64>,
}

impl Parcel {
    /// Render as a GeoJSON Feature with the registry id under
    /// `properties.parcel_id`.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert(
            "parcel_id".to_string(),
            serde_json::Value::String(self.id.clone()),
        );

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&self.boundary))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}
