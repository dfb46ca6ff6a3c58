//! The flat comparison table.
//!
//! One row per itinerary segment, grouped by mode combination in planning
//! order. Segment endpoints are read off the segment geometry.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::{ItinerarySegment, Mode, ModeCombination};
use crate::planner::TripPlan;

/// A row of the trip summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRow {
    pub mode_transport: String,
    pub option: u32,
    pub segment: u32,
    pub mode: Mode,
    pub route: Option<String>,
    pub from_lat: Option<f64>,
    pub from_lon: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lon: Option<f64>,
    pub segment_duration: Option<f64>,
    pub distance: Option<f64>,
    pub departure_time: Option<NaiveDateTime>,
    pub wait: Option<f64>,
    pub geometry: Option<String>,
}

/// Column names, in serialization order.
pub const COLUMNS: [&str; 14] = [
    "mode_transport",
    "option",
    "segment",
    "mode",
    "route",
    "from_lat",
    "from_lon",
    "to_lat",
    "to_lon",
    "segment_duration",
    "distance",
    "departure_time",
    "wait",
    "geometry",
];

/// Names of the numeric columns, in the order of [`TripRow::numeric_cells_mut`].
pub const NUMERIC_COLUMNS: [&str; 7] = [
    "from_lat",
    "from_lon",
    "to_lat",
    "to_lon",
    "segment_duration",
    "distance",
    "wait",
];

impl TripRow {
    /// Build the row for one segment of a mode combination's result.
    pub fn from_segment(combination: ModeCombination, segment: &ItinerarySegment) -> Self {
        let start = segment.geometry.as_ref().and_then(|g| g.start());
        let end = segment.geometry.as_ref().and_then(|g| g.end());

        Self {
            mode_transport: combination.label().to_string(),
            option: segment.option,
            segment: segment.order,
            mode: segment.mode.clone(),
            route: segment.route.clone(),
            from_lat: start.map(|p| p.lat),
            from_lon: start.map(|p| p.lon),
            to_lat: end.map(|p| p.lat),
            to_lon: end.map(|p| p.lon),
            segment_duration: segment.duration_mins,
            distance: segment.distance_m,
            departure_time: segment.departure_time,
            wait: segment.wait_mins,
            geometry: segment.geometry.as_ref().map(|g| g.to_wkt()),
        }
    }

    pub(crate) fn numeric_cells_mut(&mut self) -> [&mut Option<f64>; 7] {
        [
            &mut self.from_lat,
            &mut self.from_lon,
            &mut self.to_lat,
            &mut self.to_lon,
            &mut self.segment_duration,
            &mut self.distance,
            &mut self.wait,
        ]
    }
}

/// Flatten a plan into table rows.
pub fn build_rows(plan: &TripPlan) -> Vec<TripRow> {
    plan.itineraries
        .iter()
        .flat_map(|itinerary| {
            itinerary
                .segments
                .iter()
                .map(|segment| TripRow::from_segment(itinerary.combination, segment))
        })
        .collect()
}
