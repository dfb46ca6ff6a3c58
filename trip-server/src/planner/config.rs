//! Planning configuration.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::ModeCombination;

/// Configuration parameters for trip planning.
///
/// All budgets are in minutes. Per-request values override the travel
/// budgets and frequency window through the `with_*` setters.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Maximum walking time, to a stop or within a transit itinerary.
    pub walk_mins: f64,

    /// Maximum cycling time to a parking location.
    pub bicycle_mins: f64,

    /// Maximum driving time to a parking location.
    pub car_mins: f64,

    /// Maximum total trip duration for direct modes.
    pub max_trip_mins: f64,

    /// Window over which stop departures are counted.
    pub freq_window_mins: u32,

    /// Budget for the onward transit query from parking to destination.
    pub onward_ceiling_mins: f64,

    /// Extra budget on the access query; results are still cut at the
    /// access budget itself.
    pub access_slack_mins: f64,

    /// GTFS route types counted when estimating frequency (0 tram, 3 bus).
    pub route_types: Vec<i32>,

    /// Fixed start-up overhead added to the first segment of a combination's
    /// result (parking, unlocking, getting the car out).
    pub walk_transit_overhead_mins: f64,
    pub car_overhead_mins: f64,
    pub bicycle_overhead_mins: f64,
    pub car_transit_overhead_mins: f64,
    pub bicycle_transit_overhead_mins: f64,

    /// Upper bound on one mode combination's evaluation (seconds).
    pub mode_timeout_secs: u64,

    /// Departure used when a request does not give one.
    pub default_departure: NaiveDateTime,
}

impl PlannerConfig {
    /// Override the walking budget.
    pub fn with_walk(mut self, mins: f64) -> Self {
        self.walk_mins = mins;
        self
    }

    /// Override the bicycle access budget.
    pub fn with_bicycle(mut self, mins: f64) -> Self {
        self.bicycle_mins = mins;
        self
    }

    /// Override the car access budget.
    pub fn with_car(mut self, mins: f64) -> Self {
        self.car_mins = mins;
        self
    }

    /// Override the maximum trip duration.
    pub fn with_max_trip(mut self, mins: f64) -> Self {
        self.max_trip_mins = mins;
        self
    }

    /// Override the frequency window.
    pub fn with_freq_window(mut self, mins: u32) -> Self {
        self.freq_window_mins = mins;
        self
    }

    /// Override the per-mode evaluation timeout.
    pub fn with_mode_timeout(mut self, secs: u64) -> Self {
        self.mode_timeout_secs = secs;
        self
    }

    /// Access budget for a park-and-ride combination.
    pub fn access_budget(&self, combination: ModeCombination) -> Option<f64> {
        match combination {
            ModeCombination::BicycleTransit => Some(self.bicycle_mins),
            ModeCombination::CarTransit => Some(self.car_mins),
            _ => None,
        }
    }

    /// Overhead added to the first segment of a combination's result.
    pub fn overhead_mins(&self, combination: ModeCombination) -> f64 {
        match combination {
            ModeCombination::WalkTransit => self.walk_transit_overhead_mins,
            ModeCombination::Car => self.car_overhead_mins,
            ModeCombination::Bicycle => self.bicycle_overhead_mins,
            ModeCombination::CarTransit => self.car_transit_overhead_mins,
            ModeCombination::BicycleTransit => self.bicycle_transit_overhead_mins,
        }
    }

    /// Returns the per-mode evaluation timeout.
    pub fn mode_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.mode_timeout_secs)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let default_departure = NaiveDate::from_ymd_opt(2024, 8, 12)
            .and_then(|d| d.and_hms_opt(7, 0, 0))
            .unwrap_or_default();

        Self {
            walk_mins: 20.0,
            bicycle_mins: 20.0,
            car_mins: 5.0,
            max_trip_mins: 120.0,
            freq_window_mins: 60,
            onward_ceiling_mins: 100.0,
            access_slack_mins: 5.0,
            route_types: vec![0, 3],
            walk_transit_overhead_mins: 0.0,
            car_overhead_mins: 10.0,
            bicycle_overhead_mins: 5.0,
            car_transit_overhead_mins: 10.0,
            bicycle_transit_overhead_mins: 5.0,
            mode_timeout_secs: 120,
            default_departure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.walk_mins, 20.0);
        assert_eq!(config.bicycle_mins, 20.0);
        assert_eq!(config.car_mins, 5.0);
        assert_eq!(config.max_trip_mins, 120.0);
        assert_eq!(config.freq_window_mins, 60);
        assert_eq!(config.onward_ceiling_mins, 100.0);
        assert_eq!(config.route_types, vec![0, 3]);
        assert_eq!(
            config.default_departure,
            NaiveDate::from_ymd_opt(2024, 8, 12)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn mode_timeout_in_seconds() {
        let config = PlannerConfig::default();

        assert_eq!(config.mode_timeout(), std::time::Duration::from_secs(120));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::default()
            .with_walk(10.0)
            .with_bicycle(15.0)
            .with_car(8.0)
            .with_max_trip(90.0)
            .with_freq_window(30)
            .with_mode_timeout(5);

        assert_eq!(config.access_budget(ModeCombination::BicycleTransit), Some(15.0));
        assert_eq!(config.access_budget(ModeCombination::CarTransit), Some(8.0));
        assert_eq!(config.access_budget(ModeCombination::Car), None);
        assert_eq!(config.max_trip_mins, 90.0);
        assert_eq!(config.freq_window_mins, 30);
        assert_eq!(config.walk_mins, 10.0);
        assert_eq!(config.mode_timeout(), std::time::Duration::from_secs(5));
    }

    #[test]
    fn overheads() {
        let config = PlannerConfig::default();

        assert_eq!(config.overhead_mins(ModeCombination::WalkTransit), 0.0);
        assert_eq!(config.overhead_mins(ModeCombination::Car), 10.0);
        assert_eq!(config.overhead_mins(ModeCombination::Bicycle), 5.0);
        assert_eq!(config.overhead_mins(ModeCombination::CarTransit), 10.0);
        assert_eq!(config.overhead_mins(ModeCombination::BicycleTransit), 5.0);
    }
}
