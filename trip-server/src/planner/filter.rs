//! Reachable parking filter.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{Location, Mode};
use crate::engine::{MatrixQuery, RoutingEngine};

use super::candidate::ReachableParking;
use super::error::PlanError;

/// Parking locations reachable from `origin` by `access_mode` within
/// `max_access_mins`.
///
/// The engine is queried with `slack_mins` of extra budget and the result
/// is cut at the budget itself. Output keeps inventory order.
pub async fn filter_reachable<E: RoutingEngine>(
    engine: &E,
    origin: &Location,
    parking: &[Location],
    access_mode: Mode,
    max_access_mins: f64,
    slack_mins: f64,
    departure: NaiveDateTime,
) -> Result<Vec<ReachableParking>, PlanError> {
    let no_parking = || PlanError::NoReachableParking {
        mode: access_mode.clone(),
        budget_mins: max_access_mins,
    };

    if parking.is_empty() {
        return Err(no_parking());
    }

    let query = MatrixQuery {
        origins: vec![origin.clone()],
        destinations: parking.to_vec(),
        modes: vec![access_mode.clone()],
        max_trip_minutes: max_access_mins + slack_mins,
        departure,
    };

    let edges = engine.travel_time_matrix(&query).await?;

    let access: HashMap<&str, f64> = edges
        .iter()
        .filter(|e| e.from_id == origin.id)
        .filter_map(|e| Some((e.to_id.as_str(), e.travel_time_mins?)))
        .filter(|(_, t)| *t <= max_access_mins)
        .collect();

    let reachable: Vec<ReachableParking> = parking
        .iter()
        .filter_map(|p| {
            access.get(p.id.as_str()).map(|&t| ReachableParking {
                location: p.clone(),
                access_minutes: t,
            })
        })
        .collect();

    debug!(
        mode = %access_mode,
        returned = edges.len(),
        reachable = reachable.len(),
        "filtered reachable parking"
    );

    if reachable.is_empty() {
        return Err(no_parking());
    }

    Ok(reachable)
}
