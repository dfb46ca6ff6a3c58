//! Routing engine access.
//!
//! The multimodal routing engine is an external black box. This module
//! defines the capability the planner needs from it ([`RoutingEngine`]),
//! an HTTP client for a remote engine, an in-memory fixture engine for
//! tests and offline development, and the process-wide handle that
//! initialises the engine once and shares it between requests.
//!
//! Key characteristics of the engine:
//! - Unreachable pairs are simply absent from travel-time results
//! - The time column is named either `travel_time` or `travel_time_p50`
//! - Only the first segment of an itinerary carries an authoritative
//!   departure time

mod backend;
mod client;
mod error;
mod fixture;
mod handle;
mod types;

use std::collections::HashMap;
use std::future::Future;

use chrono::NaiveDateTime;

use crate::domain::{ItinerarySegment, LatLon, Location, Mode};

pub use backend::{EngineBackend, EngineSettings};
pub use client::{EngineConfig, HttpRoutingEngine};
pub use error::EngineError;
pub use fixture::{FixtureData, FixtureEngine};
pub use handle::{EngineHandle, EngineState};
pub use types::{ItineraryRowDto, MatrixRowDto, SnapRowDto};

/// One row of a travel-time query.
///
/// `travel_time_mins` is `None` when the engine reported the pair but
/// without a usable time.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelTimeEdge {
    pub from_id: String,
    pub to_id: String,
    pub travel_time_mins: Option<f64>,
}

/// Parameters for a travel-time matrix query.
#[derive(Debug, Clone)]
pub struct MatrixQuery {
    pub origins: Vec<Location>,
    pub destinations: Vec<Location>,
    pub modes: Vec<Mode>,
    pub max_trip_minutes: f64,
    pub departure: NaiveDateTime,
}

/// Parameters for a detailed itinerary query.
#[derive(Debug, Clone)]
pub struct ItineraryQuery {
    pub origins: Vec<Location>,
    pub destinations: Vec<Location>,
    pub modes: Vec<Mode>,
    pub departure: NaiveDateTime,
    pub max_walk_minutes: Option<f64>,
    pub max_trip_minutes: Option<f64>,
    /// Ask for a single shortest path instead of several alternatives
    pub shortest_path: bool,
}

/// Capability exposed by the routing engine.
///
/// This abstraction allows the planner to be tested with fixture data.
pub trait RoutingEngine: Send + Sync {
    /// Travel times from every origin to every destination within the budget.
    fn travel_time_matrix(
        &self,
        query: &MatrixQuery,
    ) -> impl Future<Output = Result<Vec<TravelTimeEdge>, EngineError>> + Send;

    /// Segment-level itineraries, ordered by option then segment.
    fn detailed_itineraries(
        &self,
        query: &ItineraryQuery,
    ) -> impl Future<Output = Result<Vec<ItinerarySegment>, EngineError>> + Send;

    /// Project points onto the travel network.
    ///
    /// Points that cannot be snapped are absent from the result.
    fn snap_to_network(
        &self,
        points: &[Location],
    ) -> impl Future<Output = Result<HashMap<String, LatLon>, EngineError>> + Send;
}
