//! Route geometry.
//!
//! The routing engine may hand back segment geometry as WKT text or as a raw
//! coordinate array. Both are normalized into a [`RouteLine`], which always
//! renders as a WKT `LINESTRING` with `lon lat` axis order.

use geo_types::{Coord, LineString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use wkt::{ToWkt, TryFromWkt};

use super::{DomainError, LatLon};

/// A segment's path as an ordered line of at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLine(LineString<f64>);

impl RouteLine {
    /// Build from `(lon, lat)` pairs.
    pub fn from_lon_lat(points: &[(f64, f64)]) -> Result<Self, DomainError> {
        let line: LineString<f64> = points
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect::<Vec<_>>()
            .into();
        Self::from_line(line)
    }

    /// Parse a WKT `LINESTRING`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_server::domain::RouteLine;
    ///
    /// let line = RouteLine::parse_wkt("LINESTRING (6.17 49.11, 6.18 49.12)").unwrap();
    /// assert_eq!(line.len(), 2);
    /// assert_eq!(line.start().unwrap().lat, 49.11);
    /// assert_eq!(line.end().unwrap().lon, 6.18);
    /// ```
    pub fn parse_wkt(text: &str) -> Result<Self, DomainError> {
        let line = LineString::<f64>::try_from_wkt_str(text.trim())
            .map_err(|e| DomainError::InvalidGeometry(e.to_string()))?;
        Self::from_line(line)
    }

    fn from_line(line: LineString<f64>) -> Result<Self, DomainError> {
        if line.0.len() < 2 {
            return Err(DomainError::DegenerateLine(line.0.len()));
        }
        if line.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(DomainError::InvalidGeometry(
                "non-finite coordinate".to_string(),
            ));
        }
        Ok(Self(line))
    }

    /// Number of points on the line.
    pub fn len(&self) -> usize {
        self.0.0.len()
    }

    /// Always false: a `RouteLine` has at least two points.
    pub fn is_empty(&self) -> bool {
        self.0.0.is_empty()
    }

    /// First point of the line.
    pub fn start(&self) -> Option<LatLon> {
        self.0.0.first().map(|c| LatLon { lat: c.y, lon: c.x })
    }

    /// Last point of the line.
    pub fn end(&self) -> Option<LatLon> {
        self.0.0.last().map(|c| LatLon { lat: c.y, lon: c.x })
    }

    /// The `(lon, lat)` pairs of the line.
    pub fn lon_lat(&self) -> Vec<(f64, f64)> {
        self.0.coords().map(|c| (c.x, c.y)).collect()
    }

    /// Render as WKT.
    pub fn to_wkt(&self) -> String {
        self.0.wkt_string()
    }
}

impl Serialize for RouteLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wkt())
    }
}

impl<'de> Deserialize<'de> for RouteLine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        RouteLine::parse_wkt(&text).map_err(serde::de::Error::custom)
    }
}
