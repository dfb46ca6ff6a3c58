//! Application state for the web layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{CacheConfig, CachedRoutingEngine};
use crate::engine::{EngineBackend, EngineError, EngineHandle, EngineSettings};
use crate::gtfs::TransitFeed;
use crate::parking::ParkingInventory;
use crate::planner::PlannerConfig;

/// The engine every request shares.
pub type SharedEngine = CachedRoutingEngine<EngineBackend>;

/// Shared application state.
///
/// The feed and the parking inventory are loaded at startup. The routing
/// engine is brought up on the first request that needs it.
#[derive(Clone)]
pub struct AppState {
    /// Lazily initialised routing engine
    pub engine: Arc<EngineHandle<SharedEngine>>,

    /// How to reach the routing engine
    pub engine_settings: Arc<EngineSettings>,

    /// Matrix cache settings for the engine
    pub cache_config: CacheConfig,

    /// Directory the engine builds its network from
    pub data_dir: Arc<PathBuf>,

    /// Transit schedule
    pub feed: Arc<TransitFeed>,

    /// Candidate parking locations
    pub parking: Arc<ParkingInventory>,

    /// Planner defaults, overridden per request
    pub config: Arc<PlannerConfig>,

    /// Where trip summaries are written
    pub output_dir: Arc<PathBuf>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        engine_settings: EngineSettings,
        data_dir: PathBuf,
        feed: TransitFeed,
        parking: ParkingInventory,
        config: PlannerConfig,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            engine: Arc::new(EngineHandle::new()),
            engine_settings: Arc::new(engine_settings),
            cache_config: CacheConfig::default(),
            data_dir: Arc::new(data_dir),
            feed: Arc::new(feed),
            parking: Arc::new(parking),
            config: Arc::new(config),
            output_dir: Arc::new(output_dir),
        }
    }

    /// Use a different matrix cache configuration.
    pub fn with_cache_config(mut self, cache_config: CacheConfig) -> Self {
        self.cache_config = cache_config;
        self
    }

    /// The routing engine, initialised on first use.
    pub async fn engine(&self) -> Result<Arc<SharedEngine>, EngineError> {
        self.engine
            .get_or_init(|| async {
                let backend = self.engine_settings.connect(&self.data_dir).await?;
                Ok(CachedRoutingEngine::new(backend, &self.cache_config))
            })
            .await
    }
}
