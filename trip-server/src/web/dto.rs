//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{LatLon, ModeCombination};
use crate::output::{TransportData, TripSummary};
use crate::planner::{PlanError, PlannerConfig, TripRequest};

fn default_walk_time() -> f64 {
    20.0
}

fn default_bicycle_time() -> f64 {
    20.0
}

fn default_car_time() -> f64 {
    5.0
}

fn default_max_trip_duration() -> f64 {
    120.0
}

fn default_freq_window() -> u32 {
    60
}

/// Longest accepted frequency window: one service day.
const MAX_FREQ_WINDOW_MINUTES: u32 = 1440;

/// Formats accepted for `departure_time`.
const DEPARTURE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Request to plan a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanTripRequest {
    /// Origin as `"lat, lon"`
    pub origin_str: String,

    /// Destination as `"lat, lon"`
    pub destination_str: String,

    /// Walking budget in minutes
    #[serde(default = "default_walk_time")]
    pub walk_time: f64,

    /// Cycling budget to a parking location, in minutes
    #[serde(default = "default_bicycle_time")]
    pub bicycle_time: f64,

    /// Maximum duration of a direct trip, in minutes
    #[serde(default = "default_max_trip_duration")]
    pub max_trip_duration: f64,

    /// Driving budget to a parking location, in minutes
    #[serde(default = "default_car_time")]
    pub car_time: f64,

    /// Window for counting stop departures, in minutes
    #[serde(default = "default_freq_window")]
    pub transit_freq_window_min: u32,

    /// Departure as `YYYY-MM-DDTHH:MM[:SS]`; the configured default if absent
    #[serde(default)]
    pub departure_time: Option<String>,
}

impl PlanTripRequest {
    /// Parse the coordinates and departure time.
    pub fn trip_request(&self, default_departure: NaiveDateTime) -> Result<TripRequest, PlanError> {
        let origin = LatLon::parse(&self.origin_str)?;
        let destination = LatLon::parse(&self.destination_str)?;
        let departure = match self.departure_time.as_deref().map(str::trim) {
            None | Some("") => default_departure,
            Some(text) => parse_departure_time(text).ok_or_else(|| {
                PlanError::MalformedInput(format!("invalid departure_time: {text}"))
            })?,
        };
        Ok(TripRequest::new(origin, destination, departure))
    }

    /// Apply this request's budgets on top of the server's configuration.
    pub fn planner_config(&self, base: &PlannerConfig) -> Result<PlannerConfig, PlanError> {
        let budgets = [
            ("walk_time", self.walk_time),
            ("bicycle_time", self.bicycle_time),
            ("car_time", self.car_time),
            ("max_trip_duration", self.max_trip_duration),
        ];
        if let Some((name, value)) = budgets
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(PlanError::MalformedInput(format!(
                "{name} must be a non-negative number of minutes, got {value}"
            )));
        }
        if !(1..=MAX_FREQ_WINDOW_MINUTES).contains(&self.transit_freq_window_min) {
            return Err(PlanError::MalformedInput(format!(
                "transit_freq_window_min must be between 1 and {MAX_FREQ_WINDOW_MINUTES}, got {}",
                self.transit_freq_window_min
            )));
        }

        Ok(base
            .clone()
            .with_walk(self.walk_time)
            .with_bicycle(self.bicycle_time)
            .with_car(self.car_time)
            .with_max_trip(self.max_trip_duration)
            .with_freq_window(self.transit_freq_window_min))
    }
}

fn parse_departure_time(text: &str) -> Option<NaiveDateTime> {
    DEPARTURE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// A mode combination that produced no itinerary.
#[derive(Debug, Serialize)]
pub struct FailedMode {
    pub mode: String,
    pub error: String,
}

/// Response to a trip planning request.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Itineraries grouped by mode combination and route option
    pub transport_data: TransportData,

    /// Whether any non-finite values were replaced
    pub issues_detected: bool,

    /// Description of each replacement
    pub log: Vec<String>,

    /// Id of the persisted summary
    pub summary_id: String,

    /// File name of the persisted summary
    pub summary_file: String,

    /// Combinations that failed, with the reason
    pub failed_modes: Vec<FailedMode>,
}

impl ProcessResponse {
    pub fn new(summary: &TripSummary, failures: &[(ModeCombination, PlanError)]) -> Self {
        Self {
            transport_data: summary.nested(),
            issues_detected: summary.report.issues_detected,
            log: summary.report.log.clone(),
            summary_id: summary.id.clone(),
            summary_file: summary
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            failed_modes: failures
                .iter()
                .map(|(mode, error)| FailedMode {
                    mode: mode.label().to_string(),
                    error: error.to_string(),
                })
                .collect(),
        }
    }
}

/// Response to `GET /`.
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// Response to `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,

    /// Routing engine lifecycle state
    pub engine: String,

    /// Stops in the transit feed
    pub stops: usize,

    /// Parking locations in the inventory
    pub parking_locations: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
