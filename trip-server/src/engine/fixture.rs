//! Fixture routing engine for testing without a real engine.
//!
//! Serves canned travel times and itineraries, either registered in code
//! or loaded from a JSON file, as if they were live engine responses.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::{ItinerarySegment, LatLon, Location, Mode, mode_key};

use super::error::EngineError;
use super::{ItineraryQuery, MatrixQuery, RoutingEngine, TravelTimeEdge};

type PairKey = (String, String, String);

fn pair_key(from: &str, to: &str, modes: &[Mode]) -> PairKey {
    (from.to_string(), to.to_string(), mode_key(modes))
}

/// A canned travel time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTravelTime {
    pub from_id: String,
    pub to_id: String,
    pub modes: Vec<Mode>,
    pub minutes: f64,
}

/// A canned itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureItinerary {
    pub from_id: String,
    pub to_id: String,
    pub modes: Vec<Mode>,
    pub segments: Vec<ItinerarySegment>,
}

/// On-disk fixture format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureData {
    #[serde(default)]
    pub travel_times: Vec<FixtureTravelTime>,
    #[serde(default)]
    pub itineraries: Vec<FixtureItinerary>,
    /// Point ids that have no nearby network
    #[serde(default)]
    pub unsnappable: Vec<String>,
}

/// Engine that answers from fixture data.
///
/// Pairs with no registered travel time are unreachable. Pairs whose time
/// exceeds the query budget are omitted, as a real engine would.
#[derive(Debug, Clone, Default)]
pub struct FixtureEngine {
    travel_times: HashMap<PairKey, f64>,
    itineraries: HashMap<PairKey, Vec<ItinerarySegment>>,
    unsnappable: HashSet<String>,
    failing_modes: HashSet<String>,
    stalled: HashSet<PairKey>,
    matrix_calls: Arc<AtomicUsize>,
}

impl FixtureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load fixture data from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Fixture(format!("failed to read {:?}: {}", path, e)))?;
        let data: FixtureData = serde_json::from_str(&json)
            .map_err(|e| EngineError::Fixture(format!("failed to parse {:?}: {}", path, e)))?;
        Ok(Self::from_data(data))
    }

    pub fn from_data(data: FixtureData) -> Self {
        let mut engine = Self::new();
        for t in data.travel_times {
            engine = engine.with_travel_time(&t.from_id, &t.to_id, &t.modes, t.minutes);
        }
        for i in data.itineraries {
            engine = engine.with_itinerary(&i.from_id, &i.to_id, &i.modes, i.segments);
        }
        engine.unsnappable.extend(data.unsnappable);
        engine
    }

    /// Register a travel time between two points.
    pub fn with_travel_time(mut self, from: &str, to: &str, modes: &[Mode], minutes: f64) -> Self {
        self.travel_times.insert(pair_key(from, to, modes), minutes);
        self
    }

    /// Register the itinerary segments returned between two points.
    pub fn with_itinerary(
        mut self,
        from: &str,
        to: &str,
        modes: &[Mode],
        segments: Vec<ItinerarySegment>,
    ) -> Self {
        self.itineraries.insert(pair_key(from, to, modes), segments);
        self
    }

    /// Mark a point as impossible to snap.
    pub fn with_unsnappable(mut self, id: &str) -> Self {
        self.unsnappable.insert(id.to_string());
        self
    }

    /// Make every query for this mode set fail with an engine error.
    pub fn with_failing_modes(mut self, modes: &[Mode]) -> Self {
        self.failing_modes.insert(mode_key(modes));
        self
    }

    /// Make queries touching this pair and mode set never answer.
    pub fn with_stalled_pair(mut self, from: &str, to: &str, modes: &[Mode]) -> Self {
        self.stalled.insert(pair_key(from, to, modes));
        self
    }

    /// Number of travel-time matrix queries answered so far.
    pub fn matrix_calls(&self) -> usize {
        self.matrix_calls.load(Ordering::SeqCst)
    }

    fn check_failing(&self, modes: &[Mode]) -> Result<(), EngineError> {
        let key = mode_key(modes);
        if self.failing_modes.contains(&key) {
            return Err(EngineError::ApiError {
                status: 500,
                message: format!("fixture failure for {key}"),
            });
        }
        Ok(())
    }
}

impl RoutingEngine for FixtureEngine {
    async fn travel_time_matrix(
        &self,
        query: &MatrixQuery,
    ) -> Result<Vec<TravelTimeEdge>, EngineError> {
        self.matrix_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing(&query.modes)?;

        let mut edges = Vec::new();
        for origin in &query.origins {
            for destination in &query.destinations {
                let key = pair_key(&origin.id, &destination.id, &query.modes);
                if self.stalled.contains(&key) {
                    std::future::pending::<()>().await;
                }
                if let Some(&minutes) = self.travel_times.get(&key) {
                    if minutes <= query.max_trip_minutes {
                        edges.push(TravelTimeEdge {
                            from_id: origin.id.clone(),
                            to_id: destination.id.clone(),
                            travel_time_mins: Some(minutes),
                        });
                    }
                }
            }
        }
        Ok(edges)
    }

    async fn detailed_itineraries(
        &self,
        query: &ItineraryQuery,
    ) -> Result<Vec<ItinerarySegment>, EngineError> {
        self.check_failing(&query.modes)?;

        let mut segments = Vec::new();
        for origin in &query.origins {
            for destination in &query.destinations {
                let key = pair_key(&origin.id, &destination.id, &query.modes);
                if self.stalled.contains(&key) {
                    std::future::pending::<()>().await;
                }
                if let Some(found) = self.itineraries.get(&key) {
                    segments.extend(found.iter().cloned());
                }
            }
        }
        Ok(segments)
    }

    async fn snap_to_network(
        &self,
        points: &[Location],
    ) -> Result<HashMap<String, LatLon>, EngineError> {
        Ok(points
            .iter()
            .filter(|p| !self.unsnappable.contains(&p.id))
            .map(|p| (p.id.clone(), p.coord))
            .collect())
    }
}
