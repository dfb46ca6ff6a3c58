//! Multimodal trip planner.
//!
//! This module answers: "what are the best ways to get from here to there
//! by walking and transit, by car, by bicycle, or by parking a car or a
//! bicycle and continuing by transit?"
//!
//! The direct combinations are a single itinerary query each. The
//! park-and-ride combinations chain four steps: filter parking reachable
//! within the access budget, find the most frequently served stop within
//! walking distance of each, pick the parking with the best total time, and
//! stitch the access and onward legs together.

mod candidate;
mod config;
mod error;
mod filter;
mod merge;
mod park_ride;
mod select;
mod stops;
mod trip;

pub use candidate::{
    BestStop, NO_SERVICE_FREQUENCY, ParkingCandidate, ReachableParking, UNREACHABLE_MINUTES,
};
pub use config::PlannerConfig;
pub use error::PlanError;
pub use filter::filter_reachable;
pub use merge::{apply_overhead, merge_itineraries, normalize_options, recompute_departures};
pub use select::{rank_candidates, select_optimal};
pub use stops::{FrequencyWindow, rank_best_stops};
pub use trip::{ModeItinerary, TripPlan, TripPlanner, TripRequest};
