//! HTTP client for a remote routing engine.
//!
//! The engine is built once from a data directory (street network plus
//! GTFS archives) via `POST /setup`, and afterwards answers travel-time,
//! itinerary and snapping queries as JSON row arrays.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::domain::{ItinerarySegment, LatLon, Location};

use super::error::EngineError;
use super::types::{
    ItineraryRequestDto, ItineraryRowDto, MatrixRequestDto, MatrixRowDto, SnapRequestDto,
    SnapRowDto,
};
use super::{ItineraryQuery, MatrixQuery, RoutingEngine, TravelTimeEdge};

/// Default base URL for a locally running engine.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8090";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for the engine client.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the engine service
    pub base_url: String,
    /// Directory the engine builds its network from
    pub data_path: PathBuf,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl EngineConfig {
    /// Create a new config for the given data directory.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_path: data_path.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 120,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n.max(1);
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct SetupRequest<'a> {
    data_path: &'a str,
}

/// Routing engine reached over HTTP.
///
/// Uses a semaphore to bound the number of in-flight requests, since the
/// engine is CPU-bound and queues work internally anyway.
#[derive(Debug, Clone)]
pub struct HttpRoutingEngine {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpRoutingEngine {
    /// Build a client without contacting the engine.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Build a client and ask the engine to load its network.
    ///
    /// This is the expensive step; callers should go through
    /// [`EngineHandle`](super::EngineHandle) so it happens once.
    pub async fn connect(config: &EngineConfig) -> Result<Self, EngineError> {
        let engine = Self::new(config)?;
        let data_path = config.data_path.to_string_lossy();

        debug!(base_url = %engine.base_url, data_path = %data_path, "initialising routing engine");

        let _: serde_json::Value = engine
            .post("setup", &SetupRequest { data_path: &data_path })
            .await
            .map_err(|e| EngineError::InitFailed(e.to_string()))?;

        Ok(engine)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, EngineError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| EngineError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/{}", self.base_url, endpoint);
        trace!(url = %url, "engine request");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| EngineError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl RoutingEngine for HttpRoutingEngine {
    async fn travel_time_matrix(
        &self,
        query: &MatrixQuery,
    ) -> Result<Vec<TravelTimeEdge>, EngineError> {
        let rows: Vec<MatrixRowDto> = self
            .post("travel-time-matrix", &MatrixRequestDto::from_query(query))
            .await?;

        debug!(
            origins = query.origins.len(),
            destinations = query.destinations.len(),
            rows = rows.len(),
            "travel time matrix"
        );

        Ok(rows.into_iter().map(MatrixRowDto::into_edge).collect())
    }

    async fn detailed_itineraries(
        &self,
        query: &ItineraryQuery,
    ) -> Result<Vec<ItinerarySegment>, EngineError> {
        let rows: Vec<ItineraryRowDto> = self
            .post("detailed-itineraries", &ItineraryRequestDto::from_query(query))
            .await?;

        let date = query.departure.date();
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| row.into_segment(date, i as u32 + 1))
            .collect())
    }

    async fn snap_to_network(
        &self,
        points: &[Location],
    ) -> Result<HashMap<String, LatLon>, EngineError> {
        let rows: Vec<SnapRowDto> = self.post("snap", &SnapRequestDto { points }).await?;

        Ok(rows.into_iter().filter_map(SnapRowDto::into_entry).collect())
    }
}
