//! Overpass QL query construction and execution.

use geo::{BoundingRect, Centroid};
use geo_types::Polygon;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

use super::element::{MapFeature, OverpassResponse};

pub const DEFAULT_URL: &str = "https://overpass-api.de/api/interpreter";

/// Search radius around the parcel centroid, meters. Slightly above the
/// largest rule threshold so borderline features are not cut off.
pub const QUERY_RADIUS_M: f64 = 1100.0;

/// Server-side evaluation limit, seconds. Goes into the query itself; the
/// client does not enforce it beyond its own connection timeout.
const QUERY_TIMEOUT_S: u32 = 25;

const HIGHWAY_CLASSES: &str =
    "motorway|trunk|primary|secondary|tertiary|unclassified|residential|service|track";
const AMENITIES: &str = "school|clinic|hospital|kindergarten|nursing_home";
const LANDUSES: &str = "landfill|industrial";

/// Client for the Overpass interpreter.
pub struct OverpassClient {
    client: Client,
    url: Url,
}

impl OverpassClient {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::Config(format!("invalid Overpass URL: {e}")))?;

        Ok(Self {
            client: Client::builder()
                .user_agent("pasieka/0.1 (apiary siting pre-check)")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            url,
        })
    }

    /// Fetch every rule-relevant feature around the parcel.
    pub async fn features_around(&self, boundary: &Polygon<f64>) -> Result<Vec<MapFeature>> {
        let query = build_query(boundary)?;
        debug!("Overpass query:\n{query}");

        let response = self
            .client
            .post(self.url.clone())
            .body(query)
            .send()
            .await
            .map_err(|e| Error::OverpassUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::OverpassUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let response: OverpassResponse =
            response
                .json()
                .await
                .map_err(|e| Error::MalformedResponse {
                    api: "Overpass",
                    detail: e.to_string(),
                })?;

        let features: Vec<MapFeature> = response
            .elements
            .into_iter()
            .filter_map(MapFeature::from_element)
            .collect();

        info!("Fetched {} nearby features", features.len());
        Ok(features)
    }
}

/// Build the Overpass QL query for a parcel boundary.
///
/// The global bbox is the parcel extent padded by the search radius so the
/// `around` filters are not clipped; the `around` clauses do the precise
/// radius selection against the centroid.
pub fn build_query(boundary: &Polygon<f64>) -> Result<String> {
    let rect = boundary
        .bounding_rect()
        .ok_or_else(|| Error::InvalidGeometry("polygon has no extent".to_string()))?;
    let centroid = boundary
        .centroid()
        .ok_or_else(|| Error::InvalidGeometry("polygon has no centroid".to_string()))?;

    let (lat, lon) = (centroid.y(), centroid.x());

    // Meters-to-degrees padding, good enough for an envelope.
    let pad_lat = QUERY_RADIUS_M / 111_320.0;
    let pad_lon = QUERY_RADIUS_M / (111_320.0 * lat.to_radians().cos().abs().max(1e-9));

    let (south, west) = (rect.min().y - pad_lat, rect.min().x - pad_lon);
    let (north, east) = (rect.max().y + pad_lat, rect.max().x + pad_lon);

    let r = QUERY_RADIUS_M;
    Ok(format!(
        r#"[out:json][timeout:{QUERY_TIMEOUT_S}][bbox:{south},{west},{north},{east}];
(
  way["highway"~"^({HIGHWAY_CLASSES})$"](around:{r},{lat},{lon});
  way["building"](around:{r},{lat},{lon});
  node["building"](around:{r},{lat},{lon});
  node["amenity"~"^({AMENITIES})$"](around:{r},{lat},{lon});
  way["amenity"~"^({AMENITIES})$"](around:{r},{lat},{lon});
  node["landuse"~"^({LANDUSES})$"](around:{r},{lat},{lon});
  way["landuse"~"^({LANDUSES})$"](around:{r},{lat},{lon});
);
out tags geom;"#
    ))
}
