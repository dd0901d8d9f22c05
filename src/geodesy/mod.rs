//! Coordinate transformation between WGS84 and the Polish planar grid.
//!
//! ULDK talks PL-1992 (EPSG:2180), everything else in the pipeline talks
//! WGS84 (EPSG:4326). The CRS pair is fixed; there is no configuration
//! surface for other projections.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::Result;

const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";
const PL1992: &str =
    "+proj=tmerc +lat_0=0 +lon_0=19 +k=0.9993 +x_0=500000 +y_0=-5300000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Transforms points between WGS84 and PL-1992.
///
/// Construct one per component that needs it; there is no process-wide
/// instance.
pub struct CoordinateTransformer {
    geographic: Proj,
    planar: Proj,
}

impl CoordinateTransformer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            geographic: Proj::from_proj_string(WGS84)?,
            planar: Proj::from_proj_string(PL1992)?,
        })
    }

    /// WGS84 degrees -> PL-1992 meters (easting, northing).
    pub fn to_planar(&self, lat: f64, lon: f64) -> Result<(f64, f64)> {
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.geographic, &self.planar, &mut point)?;
        Ok((point.0, point.1))
    }

    /// PL-1992 meters -> WGS84 degrees (lon, lat).
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut point = (x, y, 0.0);
        transform(&self.planar, &self.geographic, &mut point)?;
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    }
}

impl std::fmt::Debug for CoordinateTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CoordinateTransformer(EPSG:4326 <-> EPSG:2180)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip() {
        let transformer = CoordinateTransformer::new().unwrap();

        // Warsaw city centre
        let (lat, lon) = (52.2297, 21.0122);
        let (x, y) = transformer.to_planar(lat, lon).unwrap();
        let (lon2, lat2) = transformer.to_geographic(x, y).unwrap();

        assert_relative_eq!(lon, lon2, epsilon = 1e-6);
        assert_relative_eq!(lat, lat2, epsilon = 1e-6);
    }

    #[test]
    fn test_central_meridian_easting() {
        let transformer = CoordinateTransformer::new().unwrap();

        // On the central meridian of PL-1992 the easting is the false
        // easting, independent of latitude.
        let (x, _y) = transformer.to_planar(52.0, 19.0).unwrap();
        assert_relative_eq!(x, 500_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_planar_coordinates_in_domain() {
        let transformer = CoordinateTransformer::new().unwrap();

        // Krakow; PL-1992 northings for Poland sit roughly between
        // 100 km and 900 km.
        let (x, y) = transformer.to_planar(50.0647, 19.9450).unwrap();
        assert!(x > 100_000.0 && x < 900_000.0, "easting {x}");
        assert!(y > 100_000.0 && y < 900_000.0, "northing {y}");
    }
}
