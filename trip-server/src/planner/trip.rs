//! Trip orchestration across the five mode combinations.

use chrono::NaiveDateTime;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::domain::{ItinerarySegment, LatLon, Location, Mode, ModeCombination};
use crate::engine::{EngineError, ItineraryQuery, RoutingEngine};
use crate::gtfs::TransitFeed;
use crate::parking::ParkingInventory;

use super::config::PlannerConfig;
use super::error::PlanError;
use super::merge::{apply_overhead, normalize_options};

/// Request for trip planning.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub origin: Location,
    pub destination: Location,
    pub departure: NaiveDateTime,
}

impl TripRequest {
    /// Create a new trip request.
    pub fn new(origin: LatLon, destination: LatLon, departure: NaiveDateTime) -> Self {
        Self {
            origin: Location::origin(origin),
            destination: Location::destination(destination),
            departure,
        }
    }
}

/// Segments for one successful mode combination.
#[derive(Debug, Clone)]
pub struct ModeItinerary {
    pub combination: ModeCombination,
    pub segments: Vec<ItinerarySegment>,
}

/// Result of planning: successes in output order, plus what failed.
#[derive(Debug)]
pub struct TripPlan {
    pub itineraries: Vec<ModeItinerary>,
    pub failures: Vec<(ModeCombination, PlanError)>,
}

impl TripPlan {
    /// Total number of segments across all combinations.
    pub fn segment_count(&self) -> usize {
        self.itineraries.iter().map(|i| i.segments.len()).sum()
    }
}

/// Trip planner.
///
/// Evaluates every mode combination against the routing engine, the transit
/// feed and the parking inventory.
pub struct TripPlanner<'a, E: RoutingEngine> {
    pub(super) engine: &'a E,
    pub(super) feed: &'a TransitFeed,
    pub(super) parking: &'a ParkingInventory,
    pub(super) config: &'a PlannerConfig,
}

impl<'a, E: RoutingEngine> TripPlanner<'a, E> {
    /// Create a new planner.
    pub fn new(
        engine: &'a E,
        feed: &'a TransitFeed,
        parking: &'a ParkingInventory,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            engine,
            feed,
            parking,
            config,
        }
    }

    /// Plan a trip with every mode combination.
    ///
    /// Combinations are evaluated concurrently, each within the configured
    /// timeout. A failing combination does not affect the others; only when
    /// all of them fail is the whole plan an error.
    pub async fn plan(&self, request: &TripRequest) -> Result<TripPlan, PlanError> {
        info!(
            origin = %request.origin.coord,
            destination = %request.destination.coord,
            departure = %request.departure,
            "planning trip"
        );

        let outcomes = join_all(
            ModeCombination::ALL
                .iter()
                .map(|&combination| self.evaluate_timed(combination, request)),
        )
        .await;

        let mut itineraries = Vec::new();
        let mut failures = Vec::new();

        for (combination, outcome) in ModeCombination::ALL.into_iter().zip(outcomes) {
            match outcome {
                Ok(segments) => {
                    let mut segments = normalize_options(segments);
                    apply_overhead(&mut segments, self.config.overhead_mins(combination));
                    debug!(mode = %combination, segments = segments.len(), "mode evaluated");
                    itineraries.push(ModeItinerary {
                        combination,
                        segments,
                    });
                }
                Err(e) => {
                    warn!(mode = %combination, error = %e, "mode evaluation failed");
                    failures.push((combination, e));
                }
            }
        }

        if itineraries.is_empty() {
            return Err(PlanError::AllModesFailed(failures));
        }

        Ok(TripPlan {
            itineraries,
            failures,
        })
    }

    async fn evaluate_timed(
        &self,
        combination: ModeCombination,
        request: &TripRequest,
    ) -> Result<Vec<ItinerarySegment>, PlanError> {
        tokio::time::timeout(self.config.mode_timeout(), self.evaluate(combination, request))
            .await
            .map_err(|_| {
                PlanError::EngineUnavailable(EngineError::Timeout {
                    operation: "mode evaluation",
                })
            })?
    }

    /// Evaluate one mode combination.
    pub async fn evaluate(
        &self,
        combination: ModeCombination,
        request: &TripRequest,
    ) -> Result<Vec<ItinerarySegment>, PlanError> {
        let segments = match combination {
            ModeCombination::WalkTransit => {
                self.direct(
                    request,
                    vec![Mode::Walk, Mode::Transit],
                    Some(self.config.walk_mins),
                    false,
                )
                .await?
            }
            ModeCombination::Car => self.direct(request, vec![Mode::Car], None, true).await?,
            ModeCombination::Bicycle => {
                self.direct(request, vec![Mode::Bicycle], None, true).await?
            }
            ModeCombination::BicycleTransit | ModeCombination::CarTransit => {
                self.park_and_ride(combination, request).await?
            }
        };

        if segments.is_empty() {
            return Err(PlanError::NoItinerary { combination });
        }
        Ok(segments)
    }

    async fn direct(
        &self,
        request: &TripRequest,
        modes: Vec<Mode>,
        max_walk_minutes: Option<f64>,
        shortest_path: bool,
    ) -> Result<Vec<ItinerarySegment>, PlanError> {
        let query = ItineraryQuery {
            origins: vec![request.origin.clone()],
            destinations: vec![request.destination.clone()],
            modes,
            departure: request.departure,
            max_walk_minutes,
            max_trip_minutes: Some(self.config.max_trip_mins),
            shortest_path,
        };
        Ok(self.engine.detailed_itineraries(&query).await?)
    }
}
