//! Optimal parking selection.
//!
//! Candidates are ranked by:
//! 1. Total time, access plus onward transit (shorter is better)
//! 2. Departures at the best stop (more is better)
//! 3. Walk to the best stop (shorter is better)
//! 4. Parking id, so ties always resolve the same way

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{Location, Mode};
use crate::engine::{MatrixQuery, RoutingEngine};

use super::candidate::{BestStop, ParkingCandidate, ReachableParking};
use super::error::PlanError;

fn compare_candidates(a: &ParkingCandidate, b: &ParkingCandidate) -> Ordering {
    a.total_minutes()
        .total_cmp(&b.total_minutes())
        .then_with(|| b.frequency.cmp(&a.frequency))
        .then_with(|| a.walk_minutes.total_cmp(&b.walk_minutes))
        .then_with(|| a.parking.id.cmp(&b.parking.id))
}

/// Rank candidates best-first, dropping those that are not viable.
pub fn rank_candidates(candidates: Vec<ParkingCandidate>) -> Vec<ParkingCandidate> {
    let mut viable: Vec<ParkingCandidate> =
        candidates.into_iter().filter(ParkingCandidate::is_viable).collect();
    viable.sort_by(compare_candidates);
    viable
}

/// Choose the parking location giving the best park-and-ride trip.
///
/// Onward walk+transit times from every reachable parking location to the
/// destination are queried within `onward_ceiling_mins`, joined with access
/// times and best stops, and the top-ranked viable candidate is returned.
pub async fn select_optimal<E: RoutingEngine>(
    engine: &E,
    parking: Vec<ReachableParking>,
    best_stops: &HashMap<String, BestStop>,
    destination: &Location,
    onward_ceiling_mins: f64,
    departure: NaiveDateTime,
) -> Result<ParkingCandidate, PlanError> {
    let query = MatrixQuery {
        origins: parking.iter().map(|p| p.location.clone()).collect(),
        destinations: vec![destination.clone()],
        modes: vec![Mode::Walk, Mode::Transit],
        max_trip_minutes: onward_ceiling_mins,
        departure,
    };

    let onward: HashMap<String, f64> = engine
        .travel_time_matrix(&query)
        .await?
        .into_iter()
        .filter(|e| e.to_id == destination.id)
        .filter_map(|e| Some((e.from_id, e.travel_time_mins?)))
        .collect();

    let candidates: Vec<ParkingCandidate> = parking
        .into_iter()
        .map(|p| {
            let stop = best_stops.get(&p.location.id);
            let transit = onward.get(&p.location.id).copied();
            ParkingCandidate::normalize(p, stop, transit)
        })
        .collect();

    let considered = candidates.len();
    let best = rank_candidates(candidates)
        .into_iter()
        .next()
        .ok_or(PlanError::NoViableParkAndRide)?;

    debug!(
        considered,
        onward_routes = onward.len(),
        parking = %best.parking.id,
        total_mins = best.total_minutes(),
        frequency = best.frequency,
        "selected parking"
    );

    Ok(best)
}
