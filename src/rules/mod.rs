//! Proximity rules for apiary siting.
//!
//! The rules are a fixed, ordered table. Each nearby feature is checked
//! against the table in priority order and contributes at most one
//! violation: the first rule whose predicate matches and whose distance
//! threshold is undercut wins.

use geo::{Centroid, Distance, Geodesic};
use geo_types::{Point, Polygon};

use crate::error::{Error, Result};
use crate::overpass::MapFeature;

/// One row of the rule table.
pub struct Rule {
    pub name: &'static str,
    pub label: &'static str,
    pub max_distance_m: f64,
    pub applies: fn(&MapFeature) -> bool,
}

/// The rule table, in priority order.
pub static RULES: [Rule; 4] = [
    Rule {
        name: "major_highway",
        label: "Too close to a major highway",
        max_distance_m: 50.0,
        applies: is_major_highway,
    },
    Rule {
        name: "public_facility",
        label: "Too close to a public facility",
        max_distance_m: 150.0,
        applies: is_public_facility,
    },
    Rule {
        name: "landfill_industrial",
        label: "Too close to a landfill/industrial area",
        max_distance_m: 1000.0,
        applies: is_landfill_or_industrial,
    },
    Rule {
        name: "building_or_road",
        label: "Too close to a building/road",
        max_distance_m: 10.0,
        applies: is_building_or_road,
    },
];

fn is_major_highway(feature: &MapFeature) -> bool {
    matches!(feature.tag("highway"), "motorway" | "trunk")
}

fn is_public_facility(feature: &MapFeature) -> bool {
    matches!(
        feature.tag("amenity"),
        "school" | "clinic" | "hospital" | "kindergarten" | "nursing_home"
    )
}

fn is_landfill_or_industrial(feature: &MapFeature) -> bool {
    matches!(feature.tag("landuse"), "landfill" | "industrial")
}

fn is_building_or_road(feature: &MapFeature) -> bool {
    !feature.tag("building").is_empty() || !feature.tag("highway").is_empty()
}

/// A single broken rule.
#[derive(Debug, Clone)]
pub struct Violation {
    pub rule: &'static str,
    pub label: &'static str,
    pub feature_name: String,
    pub distance_m: f64,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) - {:.2}m",
            self.label, self.feature_name, self.distance_m
        )
    }
}

/// Evaluate the rule table for every feature around a parcel boundary.
///
/// Distances are geodesic (WGS84 ellipsoid) between the parcel centroid and
/// the feature centroid, an approximation of the true minimum distance
/// between the geometries.
pub fn evaluate(boundary: &Polygon<f64>, features: &[MapFeature]) -> Result<Vec<Violation>> {
    let centroid = boundary
        .centroid()
        .ok_or_else(|| Error::InvalidGeometry("polygon has no centroid".to_string()))?;

    Ok(features
        .iter()
        .filter_map(|feature| check_feature(centroid, feature))
        .collect())
}

fn check_feature(parcel_centroid: Point<f64>, feature: &MapFeature) -> Option<Violation> {
    let distance_m = Geodesic.distance(parcel_centroid, feature.centroid());

    for rule in &RULES {
        if (rule.applies)(feature) && distance_m < rule.max_distance_m {
            return Some(Violation {
                rule: rule.name,
                label: rule.label,
                feature_name: feature.display_name().to_string(),
                distance_m,
            });
        }
    }

    None
}
