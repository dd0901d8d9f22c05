//! Overpass element JSON and its mapping into map features.

use std::collections::HashMap;

use geo::Centroid;
use geo_types::{Coord, LineString, Point};
use serde::Deserialize;

/// Top-level Overpass interpreter response.
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A single element as returned by the interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    pub r#type: String,
    pub id: i64,
    pub lat: Option<f64>, // nodes only
    pub lon: Option<f64>, // nodes only
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub geometry: Option<Vec<Vertex>>, // ways only, needs `out geom`
}

/// One vertex of a way geometry.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Vertex {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    #[cfg(test)]
    pub fn mock(id: i64) -> OverpassElement {
        OverpassElement {
            r#type: "node".into(),
            id,
            lat: Some(52.0),
            lon: Some(21.0),
            tags: HashMap::new(),
            geometry: None,
        }
    }
}

/// Geometry of a parsed feature: a node becomes a point, a way becomes a
/// line built from its vertex list.
#[derive(Debug, Clone)]
pub enum FeatureGeometry {
    Point(Point<f64>),
    Line(LineString<f64>),
}

/// A nearby map feature with its OSM tags.
#[derive(Debug, Clone)]
pub struct MapFeature {
    /// Invariant: a `Line` always has at least 2 vertices.
    pub geometry: FeatureGeometry,
    pub tags: HashMap<String, String>,
}

impl MapFeature {
    /// Convert an Overpass element, or drop it.
    ///
    /// Elements that are neither a node with coordinates nor a way with at
    /// least 2 geometry vertices (relations, ways truncated by the server)
    /// are skipped.
    pub fn from_element(element: OverpassElement) -> Option<MapFeature> {
        let geometry = match (element.r#type.as_str(), element.lat, element.lon) {
            ("node", Some(lat), Some(lon)) => FeatureGeometry::Point(Point::new(lon, lat)),
            _ => {
                let vertices = element.geometry?;
                if vertices.len() < 2 {
                    return None;
                }
                let coords: Vec<Coord<f64>> = vertices
                    .iter()
                    .map(|v| Coord { x: v.lon, y: v.lat })
                    .collect();
                FeatureGeometry::Line(LineString::new(coords))
            }
        };

        Some(MapFeature {
            geometry,
            tags: element.tags,
        })
    }

    /// Centroid of the feature geometry.
    ///
    /// Distances are measured centroid-to-centroid, not to the nearest
    /// vertex, so a long road is represented by its midpoint.
    pub fn centroid(&self) -> Point<f64> {
        match &self.geometry {
            FeatureGeometry::Point(point) => *point,
            FeatureGeometry::Line(line) => {
                line.centroid().unwrap_or_else(|| Point::from(line.0[0]))
            }
        }
    }

    /// Tag value, or `""` when absent.
    pub fn tag(&self, name: &str) -> &str {
        self.tags.get(name).map(|it| it.as_str()).unwrap_or("")
    }

    /// Display name for reports.
    pub fn display_name(&self) -> &str {
        match self.tags.get("name") {
            Some(name) if !name.is_empty() => name,
            _ => "N/A",
        }
    }
}
