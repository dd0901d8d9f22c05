//! HTTP client for the two ULDK requests the pipeline needs.

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::geodesy::CoordinateTransformer;
use crate::models::Parcel;

use super::geometry;

pub const DEFAULT_URL: &str = "https://uldk.gugik.gov.pl/";

/// Client for the ULDK parcel location service.
///
/// One instance per process is enough; it holds no request state.
pub struct UldkClient {
    client: Client,
    base_url: Url,
    transformer: CoordinateTransformer,
}

impl UldkClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid ULDK base URL: {e}")))?;

        Ok(Self {
            client: Client::builder()
                .user_agent("pasieka/0.1 (apiary siting pre-check)")
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url,
            transformer: CoordinateTransformer::new()?,
        })
    }

    /// Resolve the parcel identifier covering a WGS84 coordinate.
    ///
    /// Any float is forwarded; ULDK itself decides whether the point hits a
    /// parcel.
    pub async fn parcel_id_by_coords(&self, lat: f64, lon: f64) -> Result<String> {
        let (x, y) = self.transformer.to_planar(lat, lon)?;
        debug!("Resolving parcel at ({lat}, {lon}) -> PL-1992 ({x:.2}, {y:.2})");

        let body = self
            .get(&[
                ("request", "GetParcelByXY"),
                ("xy", &format!("{x},{y}")),
                ("result", "id"),
            ])
            .await?;

        let id = parse_payload(&body)?;
        info!("Resolved parcel id {id}");
        Ok(id)
    }

    /// Fetch a parcel's boundary and reproject it to WGS84.
    pub async fn parcel_by_id(&self, id: &str) -> Result<Parcel> {
        let body = self
            .get(&[
                ("request", "GetParcelById"),
                ("id", id),
                ("result", "geom_wkt"),
            ])
            .await?;

        let payload = parse_payload(&body)?;
        let planar = geometry::parse_polygon(geometry::strip_srid(&payload))?;
        let boundary = geometry::reproject_to_wgs84(&self.transformer, &planar)?;

        info!(
            "Fetched parcel {id} ({} boundary vertices)",
            boundary.exterior().0.len()
        );

        Ok(Parcel {
            id: id.to_string(),
            boundary,
        })
    }

    async fn get(&self, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::UldkUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::UldkUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::UldkUnavailable(e.to_string()))
    }
}

/// Split a two-line ULDK response into status and payload.
///
/// Status `"0"` means success and the rest of the body is the payload; any
/// other status, or an empty payload, means no parcel was found. A body
/// without a newline does not have the documented shape at all.
fn parse_payload(body: &str) -> Result<String> {
    let (status, payload) = body
        .split_once('\n')
        .ok_or_else(|| Error::MalformedResponse {
            api: "ULDK",
            detail: format!("missing status line separator in {body:?}"),
        })?;

    if status.trim() != "0" {
        return Err(Error::ParcelNotFound);
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(Error::ParcelNotFound);
    }

    // Multi-result responses carry one entry per line; the pipeline only
    // ever wants the first.
    Ok(payload
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string())
}
