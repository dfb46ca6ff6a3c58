//! Caching layer for routing engine responses.
//!
//! The two park-and-ride chains issue overlapping travel-time queries
//! (the same parking inventory, the same stops, the same onward matrix), and
//! repeated requests for the same trip repeat all of them. Matrix responses
//! are cached keyed by the full query.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{ItinerarySegment, LatLon, Location, mode_key};
use crate::engine::{EngineError, ItineraryQuery, MatrixQuery, RoutingEngine, TravelTimeEdge};

/// Cached matrix entry.
type MatrixEntry = Arc<Vec<TravelTimeEdge>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 1000,
        }
    }
}

/// Build the cache key for a matrix query.
///
/// Coordinates are part of the key since ids like `origin` are reused
/// across requests.
fn matrix_key(query: &MatrixQuery) -> String {
    fn points(locations: &[Location]) -> String {
        locations
            .iter()
            .map(|l| format!("{}@{:.6},{:.6}", l.id, l.coord.lat, l.coord.lon))
            .collect::<Vec<_>>()
            .join(";")
    }

    format!(
        "{}|{}|{}|{}|{}",
        mode_key(&query.modes),
        query.departure,
        query.max_trip_minutes,
        points(&query.origins),
        points(&query.destinations)
    )
}

/// Routing engine with cached travel-time matrices.
///
/// Itinerary and snapping calls pass straight through.
pub struct CachedRoutingEngine<E> {
    engine: E,
    matrices: MokaCache<String, MatrixEntry>,
}

impl<E> CachedRoutingEngine<E> {
    /// Create a new cached engine.
    pub fn new(engine: E, config: &CacheConfig) -> Self {
        let matrices = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { engine, matrices }
    }

    /// Access the underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: RoutingEngine> RoutingEngine for CachedRoutingEngine<E> {
    async fn travel_time_matrix(
        &self,
        query: &MatrixQuery,
    ) -> Result<Vec<TravelTimeEdge>, EngineError> {
        let key = matrix_key(query);

        if let Some(cached) = self.matrices.get(&key).await {
            trace!(modes = %mode_key(&query.modes), "matrix cache hit");
            return Ok(cached.as_ref().clone());
        }

        let edges = self.engine.travel_time_matrix(query).await?;
        self.matrices.insert(key, Arc::new(edges.clone())).await;

        Ok(edges)
    }

    async fn detailed_itineraries(
        &self,
        query: &ItineraryQuery,
    ) -> Result<Vec<ItinerarySegment>, EngineError> {
        self.engine.detailed_itineraries(query).await
    }

    async fn snap_to_network(
        &self,
        points: &[Location],
    ) -> Result<HashMap<String, LatLon>, EngineError> {
        self.engine.snap_to_network(points).await
    }
}
