//! Server configuration from the environment.
//!
//! Every setting has a default; `TRIP_*` variables override them. Values
//! that do not parse are ignored with a warning.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheConfig;
use crate::engine::{EngineConfig, EngineSettings};
use crate::planner::PlannerConfig;

/// Parking inventory file looked up in the data directory by default.
pub const DEFAULT_PARKING_FILE: &str = "bike_park_metz.csv";

/// Configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (`TRIP_BIND_ADDR`)
    pub bind_addr: SocketAddr,

    /// Directory holding the GTFS feed and the parking inventory (`TRIP_DATA_DIR`)
    pub data_dir: PathBuf,

    /// Parking inventory file, relative to the data directory (`TRIP_PARKING_FILE`)
    pub parking_file: PathBuf,

    /// Routing engine base URL (`TRIP_ENGINE_URL`)
    pub engine_url: Option<String>,

    /// Fixture file to use instead of a remote engine (`TRIP_ENGINE_FIXTURE`)
    pub engine_fixture: Option<PathBuf>,

    /// Per-request engine timeout in seconds (`TRIP_ENGINE_TIMEOUT_SECS`)
    pub engine_timeout_secs: u64,

    /// Concurrent requests to the engine (`TRIP_ENGINE_MAX_CONCURRENT`)
    pub engine_max_concurrent: usize,

    /// Upper bound on one mode combination's evaluation (`TRIP_MODE_TIMEOUT_SECS`)
    pub mode_timeout_secs: u64,

    /// Matrix cache TTL in seconds (`TRIP_CACHE_TTL_SECS`)
    pub cache_ttl_secs: u64,

    /// Where trip summaries are written (`TRIP_OUTPUT_DIR`)
    pub output_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_dir: PathBuf::from("data"),
            parking_file: PathBuf::from(DEFAULT_PARKING_FILE),
            engine_url: None,
            engine_fixture: None,
            engine_timeout_secs: 120,
            engine_max_concurrent: 4,
            mode_timeout_secs: 120,
            cache_ttl_secs: 600,
            output_dir: PathBuf::from("output"),
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, current: T) -> T
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => current,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, "ignoring malformed setting");
                current
            }
        },
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            bind_addr: parsed(&lookup, "TRIP_BIND_ADDR", defaults.bind_addr),
            data_dir: non_empty(&lookup, "TRIP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            parking_file: non_empty(&lookup, "TRIP_PARKING_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.parking_file),
            engine_url: non_empty(&lookup, "TRIP_ENGINE_URL"),
            engine_fixture: non_empty(&lookup, "TRIP_ENGINE_FIXTURE").map(PathBuf::from),
            engine_timeout_secs: parsed(
                &lookup,
                "TRIP_ENGINE_TIMEOUT_SECS",
                defaults.engine_timeout_secs,
            ),
            engine_max_concurrent: parsed(
                &lookup,
                "TRIP_ENGINE_MAX_CONCURRENT",
                defaults.engine_max_concurrent,
            ),
            mode_timeout_secs: parsed(&lookup, "TRIP_MODE_TIMEOUT_SECS", defaults.mode_timeout_secs),
            cache_ttl_secs: parsed(&lookup, "TRIP_CACHE_TTL_SECS", defaults.cache_ttl_secs),
            output_dir: non_empty(&lookup, "TRIP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        }
    }

    /// Full path of the parking inventory.
    pub fn parking_path(&self) -> PathBuf {
        self.data_dir.join(&self.parking_file)
    }

    /// How to reach the routing engine. A fixture file takes precedence.
    pub fn engine_settings(&self) -> EngineSettings {
        if let Some(path) = &self.engine_fixture {
            return EngineSettings::FixtureFile(path.clone());
        }

        let mut config = EngineConfig::new(self.data_dir.clone())
            .with_timeout(self.engine_timeout_secs)
            .with_max_concurrent(self.engine_max_concurrent);
        if let Some(url) = &self.engine_url {
            config = config.with_base_url(url.as_str());
        }
        EngineSettings::Http(config)
    }

    /// Matrix cache settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl_secs),
            ..CacheConfig::default()
        }
    }

    /// Planner defaults with the server-wide overrides applied.
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig::default().with_mode_timeout(self.mode_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn default_config() {
        let config = from_pairs(&[]);

        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8000)));
        assert_eq!(config.parking_path(), PathBuf::from("data/bike_park_metz.csv"));
        assert_eq!(config.engine_timeout_secs, 120);
        assert_eq!(config.cache_config().ttl, Duration::from_secs(600));
        assert!(matches!(config.engine_settings(), EngineSettings::Http(_)));
    }

    #[test]
    fn custom_config() {
        let config = from_pairs(&[
            ("TRIP_BIND_ADDR", "0.0.0.0:9000"),
            ("TRIP_DATA_DIR", "/srv/metz"),
            ("TRIP_PARKING_FILE", "parking.csv"),
            ("TRIP_ENGINE_URL", "http://engine:8090/"),
            ("TRIP_ENGINE_TIMEOUT_SECS", "30"),
            ("TRIP_MODE_TIMEOUT_SECS", "45"),
            ("TRIP_OUTPUT_DIR", "/tmp/trips"),
        ]);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.parking_path(), PathBuf::from("/srv/metz/parking.csv"));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/trips"));
        assert_eq!(config.planner_config().mode_timeout_secs, 45);

        match config.engine_settings() {
            EngineSettings::Http(engine) => {
                assert_eq!(engine.base_url, "http://engine:8090");
                assert_eq!(engine.timeout_secs, 30);
                assert_eq!(engine.data_path, PathBuf::from("/srv/metz"));
            }
            other => panic!("expected HTTP engine, got {other:?}"),
        }
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = from_pairs(&[
            ("TRIP_BIND_ADDR", "not an address"),
            ("TRIP_ENGINE_TIMEOUT_SECS", "soon"),
            ("TRIP_DATA_DIR", "   "),
        ]);

        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.engine_timeout_secs, 120);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn fixture_takes_precedence() {
        let config = from_pairs(&[
            ("TRIP_ENGINE_URL", "http://engine:8090"),
            ("TRIP_ENGINE_FIXTURE", "fixtures/metz.json"),
        ]);

        assert!(matches!(
            config.engine_settings(),
            EngineSettings::FixtureFile(path) if path == PathBuf::from("fixtures/metz.json")
        ));
    }
}
