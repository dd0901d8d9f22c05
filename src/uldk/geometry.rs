//! Parsing and reprojection of ULDK parcel geometry.

use std::str::FromStr;

use geo_types::{Coord, LineString, Polygon};
use wkt::Wkt;

use crate::error::{Error, Result};
use crate::geodesy::CoordinateTransformer;

/// Strip the `SRID=...;` prefix ULDK sometimes puts in front of the WKT.
pub fn strip_srid(payload: &str) -> &str {
    if payload.starts_with("SRID=") {
        match payload.split_once(';') {
            Some((_, wkt)) => wkt,
            None => payload,
        }
    } else {
        payload
    }
}

/// Parse a WKT polygon (without SRID prefix).
pub fn parse_polygon(wkt_str: &str) -> Result<Polygon<f64>> {
    let parsed = Wkt::<f64>::from_str(wkt_str.trim())
        .map_err(|e| Error::InvalidGeometry(format!("unparsable WKT: {e}")))?;

    let geometry: geo_types::Geometry<f64> = parsed
        .try_into()
        .map_err(|e| Error::InvalidGeometry(format!("unsupported WKT geometry: {e}")))?;

    let polygon = match geometry {
        geo_types::Geometry::Polygon(polygon) => polygon,
        _ => return Err(Error::InvalidGeometry("expected a POLYGON".to_string())),
    };

    // Closed ring with at least 3 distinct vertices.
    if polygon.exterior().0.len() < 4 {
        return Err(Error::InvalidGeometry(
            "exterior ring has fewer than 3 vertices".to_string(),
        ));
    }

    Ok(polygon)
}

/// Reproject a PL-1992 parcel boundary to WGS84.
///
/// Only the exterior ring is carried over; interior rings (holes) in the
/// cadastral geometry are dropped. Parcels with holes are rare and the
/// consumers only need the outline.
pub fn reproject_to_wgs84(
    transformer: &CoordinateTransformer,
    planar: &Polygon<f64>,
) -> Result<Polygon<f64>> {
    let mut ring = Vec::with_capacity(planar.exterior().0.len());
    for coord in &planar.exterior().0 {
        let (lon, lat) = transformer.to_geographic(coord.x, coord.y)?;
        ring.push(Coord { x: lon, y: lat });
    }

    Ok(Polygon::new(LineString::new(ring), vec![]))
}
