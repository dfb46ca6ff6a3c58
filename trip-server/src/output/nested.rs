//! Grouped view of the table for API responses.
//!
//! Rows are grouped by mode combination, then by route option, keeping the
//! order in which each group first appears. Values are carried over as-is.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Mode;

use super::table::TripRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportData {
    pub transport_modes: Vec<TransportMode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMode {
    pub mode_type: String,
    pub mode_label: String,
    pub routes: Vec<RouteGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGroup {
    pub option: u32,
    pub segments: Vec<SegmentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentView {
    pub mode: Mode,
    pub order: u32,
    pub route_no: Option<String>,
    pub source: Coordinate,
    pub destination: Coordinate,
    pub geometry: Option<String>,
    pub duration: Option<f64>,
    pub distance: Option<f64>,
    pub departure_time: Option<NaiveDateTime>,
    pub wait_time: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&TripRow> for SegmentView {
    fn from(row: &TripRow) -> Self {
        Self {
            mode: row.mode.clone(),
            order: row.segment,
            route_no: row.route.clone(),
            source: Coordinate {
                latitude: row.from_lat,
                longitude: row.from_lon,
            },
            destination: Coordinate {
                latitude: row.to_lat,
                longitude: row.to_lon,
            },
            geometry: row.geometry.clone(),
            duration: row.segment_duration,
            distance: row.distance,
            departure_time: row.departure_time,
            wait_time: row.wait,
        }
    }
}

/// Group flat rows into modes, route options and segments.
pub fn nest_rows(rows: &[TripRow]) -> TransportData {
    let mut modes: Vec<TransportMode> = Vec::new();

    for row in rows {
        let mode = match modes
            .iter()
            .position(|m| m.mode_type == row.mode_transport)
        {
            Some(i) => &mut modes[i],
            None => {
                modes.push(TransportMode {
                    mode_type: row.mode_transport.clone(),
                    mode_label: row.mode_transport.clone(),
                    routes: Vec::new(),
                });
                let last = modes.len() - 1;
                &mut modes[last]
            }
        };

        let route = match mode.routes.iter().position(|r| r.option == row.option) {
            Some(i) => &mut mode.routes[i],
            None => {
                mode.routes.push(RouteGroup {
                    option: row.option,
                    segments: Vec::new(),
                });
                let last = mode.routes.len() - 1;
                &mut mode.routes[last]
            }
        };

        route.segments.push(SegmentView::from(row));
    }

    TransportData {
        transport_modes: modes,
    }
}
