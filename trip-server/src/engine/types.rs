//! Routing engine wire DTOs.
//!
//! These types map directly to the engine's JSON rows. They use `Option`
//! liberally because the engine omits columns rather than sending nulls,
//! and each row type has one adapter that turns it into the internal shape
//! immediately on receipt.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::{ItinerarySegment, LatLon, Location, Mode, RouteLine};

use super::{ItineraryQuery, MatrixQuery, TravelTimeEdge};

/// Departure times are sent to the engine in this format.
const DEPARTURE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Request body for `POST /travel-time-matrix`.
#[derive(Debug, Serialize)]
pub struct MatrixRequestDto<'a> {
    pub origins: &'a [Location],
    pub destinations: &'a [Location],
    pub mode: &'a [Mode],
    pub max_trip_duration: f64,
    pub departure_datetime: String,
}

impl<'a> MatrixRequestDto<'a> {
    pub fn from_query(query: &'a MatrixQuery) -> Self {
        Self {
            origins: &query.origins,
            destinations: &query.destinations,
            mode: &query.modes,
            max_trip_duration: query.max_trip_minutes,
            departure_datetime: query.departure.format(DEPARTURE_FORMAT).to_string(),
        }
    }
}

/// Request body for `POST /detailed-itineraries`.
#[derive(Debug, Serialize)]
pub struct ItineraryRequestDto<'a> {
    pub origins: &'a [Location],
    pub destinations: &'a [Location],
    pub mode: &'a [Mode],
    pub departure_datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_walk_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_trip_duration: Option<f64>,
    pub shortest_path: bool,
}

impl<'a> ItineraryRequestDto<'a> {
    pub fn from_query(query: &'a ItineraryQuery) -> Self {
        Self {
            origins: &query.origins,
            destinations: &query.destinations,
            mode: &query.modes,
            departure_datetime: query.departure.format(DEPARTURE_FORMAT).to_string(),
            max_walk_time: query.max_walk_minutes,
            max_trip_duration: query.max_trip_minutes,
            shortest_path: query.shortest_path,
        }
    }
}

/// Request body for `POST /snap`.
#[derive(Debug, Serialize)]
pub struct SnapRequestDto<'a> {
    pub points: &'a [Location],
}

/// One row of a travel-time matrix response.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixRowDto {
    #[serde(deserialize_with = "id_string")]
    pub from_id: String,

    #[serde(deserialize_with = "id_string")]
    pub to_id: String,

    /// Direct travel time, minutes
    #[serde(default)]
    pub travel_time: Option<f64>,

    /// Median travel time, minutes (reported instead of `travel_time`
    /// when the engine runs with percentiles)
    #[serde(default)]
    pub travel_time_p50: Option<f64>,
}

impl MatrixRowDto {
    /// Normalize to a `TravelTimeEdge`, whichever time column was present.
    pub fn into_edge(self) -> TravelTimeEdge {
        let time = self
            .travel_time_p50
            .or(self.travel_time)
            .filter(|t| t.is_finite() && *t >= 0.0);

        TravelTimeEdge {
            from_id: self.from_id,
            to_id: self.to_id,
            travel_time_mins: time,
        }
    }
}

/// Segment geometry as sent by the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeometryDto {
    /// WKT text
    Wkt(String),
    /// Bare `[lon, lat]` array
    Coordinates(Vec<[f64; 2]>),
    /// GeoJSON LineString object
    GeoJson { coordinates: Vec<[f64; 2]> },
}

impl GeometryDto {
    /// Normalize to a `RouteLine`.
    pub fn into_line(self) -> Result<RouteLine, crate::domain::DomainError> {
        match self {
            GeometryDto::Wkt(text) => RouteLine::parse_wkt(&text),
            GeometryDto::Coordinates(coords) | GeometryDto::GeoJson { coordinates: coords } => {
                let points: Vec<(f64, f64)> = coords.iter().map(|c| (c[0], c[1])).collect();
                RouteLine::from_lon_lat(&points)
            }
        }
    }
}

/// One row of a detailed itineraries response.
#[derive(Debug, Clone, Deserialize)]
pub struct ItineraryRowDto {
    #[serde(default)]
    pub option: Option<u32>,

    #[serde(default)]
    pub segment: Option<u32>,

    pub mode: Mode,

    /// Whole-itinerary duration, repeated on every row
    #[serde(default)]
    pub total_duration: Option<f64>,

    #[serde(default)]
    pub segment_duration: Option<f64>,

    #[serde(default)]
    pub wait: Option<f64>,

    #[serde(default)]
    pub distance: Option<f64>,

    /// Whole-itinerary distance, repeated on every row
    #[serde(default)]
    pub total_distance: Option<f64>,

    #[serde(default)]
    pub route: Option<String>,

    /// Either a full date-time or a bare `HH:MM:SS` on the query date
    #[serde(default)]
    pub departure_time: Option<String>,

    #[serde(default, alias = "geometry_wkt")]
    pub geometry: Option<GeometryDto>,
}

impl ItineraryRowDto {
    /// Normalize to an `ItinerarySegment`.
    ///
    /// Whole-itinerary aggregates (`total_duration`, `total_distance`) are
    /// dropped: they stop being meaningful once legs are merged.
    /// `position` is the row's 1-based index, used when the engine omits
    /// segment numbers.
    pub fn into_segment(self, service_date: NaiveDate, position: u32) -> ItinerarySegment {
        let geometry = self.geometry.and_then(|g| match g.into_line() {
            Ok(line) => Some(line),
            Err(e) => {
                warn!(error = %e, "dropping unusable segment geometry");
                None
            }
        });

        ItinerarySegment {
            option: self.option.unwrap_or(1),
            order: self.segment.unwrap_or(position),
            mode: self.mode,
            route: self.route.filter(|r| !r.trim().is_empty()),
            duration_mins: self.segment_duration,
            distance_m: self.distance,
            departure_time: self
                .departure_time
                .as_deref()
                .and_then(|s| parse_departure(s, service_date)),
            wait_mins: self.wait,
            geometry,
        }
    }
}

/// One row of a snap response.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapRowDto {
    #[serde(deserialize_with = "id_string")]
    pub point_id: String,

    #[serde(default)]
    pub snap_lat: Option<f64>,

    #[serde(default)]
    pub snap_lon: Option<f64>,
}

impl SnapRowDto {
    /// Returns the snapped point, or `None` if the engine found no network.
    pub fn into_entry(self) -> Option<(String, LatLon)> {
        let coord = LatLon::new(self.snap_lat?, self.snap_lon?).ok()?;
        Some((self.point_id, coord))
    }
}

/// Parse an engine departure time.
pub fn parse_departure(s: &str, service_date: NaiveDate) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, format) {
            return Some(service_date.and_time(t));
        }
    }
    None
}

/// Accept identifiers sent either as strings or as numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 12).unwrap()
    }

    #[test]
    fn matrix_row_accepts_either_time_column() {
        let direct: MatrixRowDto =
            serde_json::from_str(r#"{"from_id":"origin","to_id":"p1","travel_time":8}"#).unwrap();
        assert_eq!(direct.into_edge().travel_time_mins, Some(8.0));

        let pct: MatrixRowDto =
            serde_json::from_str(r#"{"from_id":"origin","to_id":"p1","travel_time_p50":12.5}"#)
                .unwrap();
        assert_eq!(pct.into_edge().travel_time_mins, Some(12.5));

        let neither: MatrixRowDto =
            serde_json::from_str(r#"{"from_id":"origin","to_id":"p1"}"#).unwrap();
        assert_eq!(neither.into_edge().travel_time_mins, None);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let row: MatrixRowDto =
            serde_json::from_str(r#"{"from_id":17,"to_id":"s","travel_time":3}"#).unwrap();
        assert_eq!(row.from_id, "17");
    }

    #[test]
    fn itinerary_row_normalizes() {
        let json = r#"{
            "option": 1, "segment": 2, "mode": "BUS",
            "total_duration": 40, "segment_duration": 12.5, "wait": 3,
            "distance": 4100, "total_distance": 9000, "route": "L1",
            "departure_time": "07:05:00",
            "geometry": "LINESTRING (6.17 49.11, 6.18 49.12)"
        }"#;
        let row: ItineraryRowDto = serde_json::from_str(json).unwrap();
        let seg = row.into_segment(date(), 9);

        assert_eq!(seg.option, 1);
        assert_eq!(seg.order, 2);
        assert_eq!(seg.mode, Mode::Bus);
        assert_eq!(seg.route.as_deref(), Some("L1"));
        assert_eq!(seg.duration_mins, Some(12.5));
        assert_eq!(seg.wait_mins, Some(3.0));
        assert_eq!(
            seg.departure_time,
            Some(date().and_hms_opt(7, 5, 0).unwrap())
        );
        assert_eq!(seg.geometry.unwrap().len(), 2);
    }

    #[test]
    fn itinerary_row_defaults_and_coordinate_geometry() {
        let json = r#"{
            "mode": "WALK", "route": "",
            "geometry_wkt": [[6.17, 49.11], [6.175, 49.115], [6.18, 49.12]]
        }"#;
        let row: ItineraryRowDto = serde_json::from_str(json).unwrap();
        let seg = row.into_segment(date(), 3);

        assert_eq!(seg.option, 1);
        assert_eq!(seg.order, 3);
        assert_eq!(seg.route, None);
        assert_eq!(seg.geometry.unwrap().len(), 3);
    }

    #[test]
    fn bad_geometry_is_dropped_not_fatal() {
        let json = r#"{"mode": "WALK", "geometry": "POINT (1 2)"}"#;
        let row: ItineraryRowDto = serde_json::from_str(json).unwrap();
        assert!(row.into_segment(date(), 1).geometry.is_none());
    }

    #[test]
    fn departure_formats() {
        let expected = date().and_hms_opt(7, 30, 0);
        assert_eq!(parse_departure("2024-08-12T07:30:00", date()), expected);
        assert_eq!(parse_departure("2024-08-12 07:30:00", date()), expected);
        assert_eq!(parse_departure("07:30", date()), expected);
        assert_eq!(parse_departure("later", date()), None);
    }

    #[test]
    fn snap_row_without_coordinates_is_skipped() {
        let row: SnapRowDto =
            serde_json::from_str(r#"{"point_id":"p1","snap_lat":null,"snap_lon":6.1}"#).unwrap();
        assert!(row.into_entry().is_none());

        let row: SnapRowDto =
            serde_json::from_str(r#"{"point_id":"p1","snap_lat":49.1,"snap_lon":6.1}"#).unwrap();
        let (id, coord) = row.into_entry().unwrap();
        assert_eq!(id, "p1");
        assert_eq!(coord.lat, 49.1);
    }
}
