//! Park-and-ride candidate records.
//!
//! A candidate accumulates facts from three separate engine queries (access
//! time, walk to best stop, onward transit time). Facts that are missing
//! after a join take the sentinel values below, applied in one place by
//! [`ParkingCandidate::normalize`].

use crate::domain::Location;

/// Time assigned to a leg the engine could not route.
pub const UNREACHABLE_MINUTES: f64 = f64::INFINITY;

/// Frequency assigned to a parking location with no usable stop.
pub const NO_SERVICE_FREQUENCY: u32 = 0;

/// A parking location reachable within the access budget.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachableParking {
    pub location: Location,
    pub access_minutes: f64,
}

/// The most useful transit stop near a parking location.
#[derive(Debug, Clone, PartialEq)]
pub struct BestStop {
    pub stop_id: String,
    pub walk_minutes: f64,
    pub frequency: u32,
}

/// Everything known about one parking location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingCandidate {
    pub parking: Location,
    pub access_minutes: f64,
    pub best_stop: Option<String>,
    pub walk_minutes: f64,
    pub frequency: u32,
    pub transit_minutes: f64,
}

impl ParkingCandidate {
    /// Join the three query results for one parking location.
    pub fn normalize(
        parking: ReachableParking,
        best_stop: Option<&BestStop>,
        transit_minutes: Option<f64>,
    ) -> Self {
        let (best_stop, walk_minutes, frequency) = match best_stop {
            Some(stop) => (Some(stop.stop_id.clone()), stop.walk_minutes, stop.frequency),
            None => (None, UNREACHABLE_MINUTES, NO_SERVICE_FREQUENCY),
        };

        Self {
            parking: parking.location,
            access_minutes: parking.access_minutes,
            best_stop,
            walk_minutes,
            frequency,
            transit_minutes: transit_minutes
                .filter(|t| t.is_finite())
                .unwrap_or(UNREACHABLE_MINUTES),
        }
    }

    /// Access plus onward transit time.
    pub fn total_minutes(&self) -> f64 {
        self.access_minutes + self.transit_minutes
    }

    /// Whether both the stop and the onward route exist.
    pub fn is_viable(&self) -> bool {
        self.total_minutes().is_finite() && self.walk_minutes.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LatLon;

    fn reachable(access: f64) -> ReachableParking {
        ReachableParking {
            location: Location::new("p1", LatLon::new(49.1, 6.17).unwrap()),
            access_minutes: access,
        }
    }

    #[test]
    fn missing_facts_take_sentinels() {
        let candidate = ParkingCandidate::normalize(reachable(8.0), None, None);

        assert_eq!(candidate.walk_minutes, UNREACHABLE_MINUTES);
        assert_eq!(candidate.frequency, NO_SERVICE_FREQUENCY);
        assert_eq!(candidate.transit_minutes, UNREACHABLE_MINUTES);
        assert!(!candidate.is_viable());
    }

    #[test]
    fn complete_candidate_is_viable() {
        let stop = BestStop {
            stop_id: "s1".into(),
            walk_minutes: 3.0,
            frequency: 4,
        };
        let candidate = ParkingCandidate::normalize(reachable(8.0), Some(&stop), Some(22.0));

        assert_eq!(candidate.total_minutes(), 30.0);
        assert_eq!(candidate.best_stop.as_deref(), Some("s1"));
        assert!(candidate.is_viable());
    }

    #[test]
    fn stop_without_onward_route_is_not_viable() {
        let stop = BestStop {
            stop_id: "s1".into(),
            walk_minutes: 3.0,
            frequency: 4,
        };
        let candidate = ParkingCandidate::normalize(reachable(8.0), Some(&stop), Some(f64::NAN));
        assert!(!candidate.is_viable());
    }
}
