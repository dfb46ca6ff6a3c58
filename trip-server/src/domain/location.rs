//! Geographic point types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// A WGS84 coordinate pair in degrees.
///
/// Any `LatLon` value is finite and within range by construction when built
/// through [`LatLon::new`] or [`LatLon::parse`].
///
/// # Examples
///
/// ```
/// use trip_server::domain::LatLon;
///
/// let metz = LatLon::parse("49.0685, 6.1859").unwrap();
/// assert_eq!(metz.lat, 49.0685);
/// assert_eq!(metz.lon, 6.1859);
///
/// // Missing longitude is rejected
/// assert!(LatLon::parse("49.0685").is_err());
///
/// // Out-of-range latitude is rejected
/// assert!(LatLon::parse("95.0, 6.0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate, validating the WGS84 range.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(DomainError::CoordinateOutOfRange { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Parse a `"lat, lon"` string.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = |reason| DomainError::InvalidCoordinate {
            input: s.to_string(),
            reason,
        };

        let mut parts = s.split(',');
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid("expected two comma-separated numbers"));
        };

        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| invalid("latitude is not a number"))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| invalid("longitude is not a number"))?;

        Self::new(lat, lon)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

/// An identified point: origin, destination, parking space or transit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    #[serde(flatten)]
    pub coord: LatLon,
}

impl Location {
    /// Create a new location.
    pub fn new(id: impl Into<String>, coord: LatLon) -> Self {
        Self {
            id: id.into(),
            coord,
        }
    }

    /// The fixed identifier used for a trip's origin.
    pub fn origin(coord: LatLon) -> Self {
        Self::new("origin", coord)
    }

    /// The fixed identifier used for a trip's destination.
    pub fn destination(coord: LatLon) -> Self {
        Self::new("destination", coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_and_without_spaces() {
        assert_eq!(
            LatLon::parse("49.12,6.17").unwrap(),
            LatLon {
                lat: 49.12,
                lon: 6.17
            }
        );
        assert_eq!(
            LatLon::parse("  49.12 ,  6.17 ").unwrap(),
            LatLon {
                lat: 49.12,
                lon: 6.17
            }
        );
    }

    #[test]
    fn reject_malformed() {
        assert!(LatLon::parse("").is_err());
        assert!(LatLon::parse("abc, 6.1").is_err());
        assert!(LatLon::parse("49.1, xyz").is_err());
        assert!(LatLon::parse("49.1, 6.1, 3").is_err());
        assert!(LatLon::parse("NaN, 6.1").is_err());
        assert!(LatLon::parse("inf, 6.1").is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(LatLon::new(-90.5, 0.0).is_err());
        assert!(LatLon::new(0.0, 180.5).is_err());
        assert!(LatLon::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn location_serializes_flat() {
        let loc = Location::new("p1", LatLon::new(49.0, 6.0).unwrap());
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json, serde_json::json!({"id": "p1", "lat": 49.0, "lon": 6.0}));
    }
}
