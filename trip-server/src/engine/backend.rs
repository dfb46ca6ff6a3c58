//! Engine backend selection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{ItinerarySegment, LatLon, Location};

use super::client::{EngineConfig, HttpRoutingEngine};
use super::error::EngineError;
use super::fixture::FixtureEngine;
use super::{ItineraryQuery, MatrixQuery, RoutingEngine, TravelTimeEdge};

/// How the server reaches its routing engine.
#[derive(Debug, Clone)]
pub enum EngineSettings {
    /// Remote engine over HTTP
    Http(EngineConfig),
    /// Fixture data loaded from a JSON file
    FixtureFile(PathBuf),
    /// Fixture data already in memory
    Fixture(FixtureEngine),
}

impl EngineSettings {
    /// Bring up the engine for the given data directory.
    ///
    /// The data directory only matters to the HTTP engine, which builds its
    /// network from it.
    pub async fn connect(&self, data_path: &Path) -> Result<EngineBackend, EngineError> {
        match self {
            EngineSettings::Http(config) => {
                let mut config = config.clone();
                config.data_path = data_path.to_path_buf();
                Ok(EngineBackend::Http(HttpRoutingEngine::connect(&config).await?))
            }
            EngineSettings::FixtureFile(path) => {
                Ok(EngineBackend::Fixture(FixtureEngine::from_file(path)?))
            }
            EngineSettings::Fixture(engine) => Ok(EngineBackend::Fixture(engine.clone())),
        }
    }
}

/// Either kind of routing engine.
#[derive(Debug, Clone)]
pub enum EngineBackend {
    Http(HttpRoutingEngine),
    Fixture(FixtureEngine),
}

impl RoutingEngine for EngineBackend {
    async fn travel_time_matrix(
        &self,
        query: &MatrixQuery,
    ) -> Result<Vec<TravelTimeEdge>, EngineError> {
        match self {
            EngineBackend::Http(e) => e.travel_time_matrix(query).await,
            EngineBackend::Fixture(e) => e.travel_time_matrix(query).await,
        }
    }

    async fn detailed_itineraries(
        &self,
        query: &ItineraryQuery,
    ) -> Result<Vec<ItinerarySegment>, EngineError> {
        match self {
            EngineBackend::Http(e) => e.detailed_itineraries(query).await,
            EngineBackend::Fixture(e) => e.detailed_itineraries(query).await,
        }
    }

    async fn snap_to_network(
        &self,
        points: &[Location],
    ) -> Result<HashMap<String, LatLon>, EngineError> {
        match self {
            EngineBackend::Http(e) => e.snap_to_network(points).await,
            EngineBackend::Fixture(e) => e.snap_to_network(points).await,
        }
    }
}
