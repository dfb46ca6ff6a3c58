//! Best transit stop near each parking location.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{Location, Mode};
use crate::engine::{MatrixQuery, RoutingEngine};
use crate::gtfs::TransitFeed;

use super::candidate::{BestStop, NO_SERVICE_FREQUENCY, ReachableParking};
use super::error::PlanError;

/// Frequency settings for stop ranking.
#[derive(Debug, Clone)]
pub struct FrequencyWindow<'a> {
    pub reference: NaiveDateTime,
    pub window_minutes: u32,
    pub route_types: &'a [i32],
}

/// Order stop options best first: most departures, then shortest walk,
/// then stop id so equal options always resolve the same way.
fn compare_stops(a: &BestStop, b: &BestStop) -> Ordering {
    b.frequency
        .cmp(&a.frequency)
        .then_with(|| a.walk_minutes.total_cmp(&b.walk_minutes))
        .then_with(|| a.stop_id.cmp(&b.stop_id))
}

/// Pick the best stop for each parking location.
///
/// Parking points are snapped to the street network, walk times to every
/// stop within `max_walk_mins` are queried, and each reachable stop is
/// scored by its departures in the frequency window. Parking locations
/// with no stop in range are absent from the result.
pub async fn rank_best_stops<E: RoutingEngine>(
    engine: &E,
    feed: &TransitFeed,
    parking: &[ReachableParking],
    max_walk_mins: f64,
    window: &FrequencyWindow<'_>,
) -> Result<HashMap<String, BestStop>, PlanError> {
    let out_of_range = || PlanError::NoTransitStopsInRange {
        budget_mins: max_walk_mins,
    };

    let points: Vec<Location> = parking.iter().map(|p| p.location.clone()).collect();
    let snapped = engine.snap_to_network(&points).await?;

    let origins: Vec<Location> = points
        .iter()
        .filter_map(|p| snapped.get(&p.id).map(|c| Location::new(p.id.clone(), *c)))
        .collect();

    if origins.is_empty() || feed.stops().is_empty() {
        return Err(out_of_range());
    }

    let query = MatrixQuery {
        origins,
        destinations: feed.stops().to_vec(),
        modes: vec![Mode::Walk],
        max_trip_minutes: max_walk_mins,
        departure: window.reference,
    };

    let walks: Vec<(String, String, f64)> = engine
        .travel_time_matrix(&query)
        .await?
        .into_iter()
        .filter_map(|e| Some((e.from_id, e.to_id, e.travel_time_mins?)))
        .filter(|(_, _, t)| *t <= max_walk_mins)
        .collect();

    if walks.is_empty() {
        return Err(out_of_range());
    }

    let stop_ids: Vec<String> = walks
        .iter()
        .map(|(_, stop, _)| stop.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let frequencies = feed.estimate_frequencies(
        &stop_ids,
        window.reference,
        window.window_minutes,
        window.route_types,
    )?;

    let mut best: HashMap<String, BestStop> = HashMap::new();
    for (parking_id, stop_id, walk_minutes) in walks {
        let candidate = BestStop {
            frequency: frequencies
                .get(&stop_id)
                .copied()
                .unwrap_or(NO_SERVICE_FREQUENCY),
            stop_id,
            walk_minutes,
        };

        match best.get(&parking_id) {
            Some(current) if compare_stops(current, &candidate) != Ordering::Greater => {}
            _ => {
                best.insert(parking_id, candidate);
            }
        }
    }

    debug!(
        parking = parking.len(),
        with_stop = best.len(),
        stops_considered = stop_ids.len(),
        "ranked best stops"
    );

    Ok(best)
}
