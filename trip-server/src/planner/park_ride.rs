//! Park-and-ride evaluation.
//!
//! Chains the core steps for one access mode: reachable parking, best stop
//! per parking, optimal parking, then the two detailed legs stitched into a
//! single route option.

use futures::future::try_join;
use tracing::debug;

use crate::domain::{ItinerarySegment, Location, Mode, ModeCombination, group_options};
use crate::engine::{ItineraryQuery, RoutingEngine};

use super::error::PlanError;
use super::filter::filter_reachable;
use super::merge::merge_itineraries;
use super::select::select_optimal;
use super::stops::{FrequencyWindow, rank_best_stops};
use super::trip::{TripPlanner, TripRequest};

/// Segments of the first route option only.
fn first_option(segments: Vec<ItinerarySegment>) -> Option<Vec<ItinerarySegment>> {
    group_options(segments)
        .into_iter()
        .next()
        .map(|option| option.segments)
}

impl<E: RoutingEngine> TripPlanner<'_, E> {
    pub(super) async fn park_and_ride(
        &self,
        combination: ModeCombination,
        request: &TripRequest,
    ) -> Result<Vec<ItinerarySegment>, PlanError> {
        let (Some(access_mode), Some(access_budget)) = (
            combination.access_mode(),
            self.config.access_budget(combination),
        ) else {
            return Err(PlanError::NoItinerary { combination });
        };

        let reachable = filter_reachable(
            self.engine,
            &request.origin,
            self.parking.points(),
            access_mode.clone(),
            access_budget,
            self.config.access_slack_mins,
            request.departure,
        )
        .await?;

        let window = FrequencyWindow {
            reference: request.departure,
            window_minutes: self.config.freq_window_mins,
            route_types: &self.config.route_types,
        };
        let best_stops = rank_best_stops(
            self.engine,
            self.feed,
            &reachable,
            self.config.walk_mins,
            &window,
        )
        .await?;

        let chosen = select_optimal(
            self.engine,
            reachable,
            &best_stops,
            &request.destination,
            self.config.onward_ceiling_mins,
            request.departure,
        )
        .await?;

        debug!(
            mode = %combination,
            parking = %chosen.parking.id,
            stop = chosen.best_stop.as_deref().unwrap_or("-"),
            "park-and-ride parking chosen"
        );

        let access_leg = self.leg(&request.origin, &chosen.parking, vec![access_mode], request);
        let onward_leg = self.leg(
            &chosen.parking,
            &request.destination,
            vec![Mode::Walk, Mode::Transit],
            request,
        );
        let (access, onward) = try_join(
            self.engine.detailed_itineraries(&access_leg),
            self.engine.detailed_itineraries(&onward_leg),
        )
        .await?;

        match (first_option(access), first_option(onward)) {
            (Some(access), Some(onward)) => Ok(merge_itineraries(access, onward)),
            _ => Err(PlanError::NoItinerary { combination }),
        }
    }

    fn leg(
        &self,
        from: &Location,
        to: &Location,
        modes: Vec<Mode>,
        request: &TripRequest,
    ) -> ItineraryQuery {
        ItineraryQuery {
            origins: vec![from.clone()],
            destinations: vec![to.clone()],
            modes,
            departure: request.departure,
            max_walk_minutes: Some(self.config.walk_mins),
            max_trip_minutes: None,
            shortest_path: true,
        }
    }
}
