//! Planning error types.

use thiserror::Error;

use crate::domain::{DomainError, Mode, ModeCombination};
use crate::engine::EngineError;
use crate::gtfs::FeedError;
use crate::parking::ParkingError;

/// Errors from planning a trip.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The feed has no calendar data to decide which services run
    #[error("transit schedule data missing: {0}")]
    ScheduleDataMissing(String),

    /// No parking location can be reached within the access budget
    #[error("no parking reachable by {mode} within {budget_mins} minutes")]
    NoReachableParking { mode: Mode, budget_mins: f64 },

    /// No transit stop is within walking distance of any candidate parking
    #[error("no transit stops within {budget_mins} minutes walk of reachable parking")]
    NoTransitStopsInRange { budget_mins: f64 },

    /// Every candidate lacks either a reachable stop or an onward route
    #[error("no viable park-and-ride option")]
    NoViableParkAndRide,

    /// The data directory holds no usable GTFS feed
    #[error("invalid feed layout: {0}")]
    InvalidFeedLayout(String),

    /// The routing engine failed to initialise or to answer
    #[error("routing engine unavailable: {0}")]
    EngineUnavailable(#[from] EngineError),

    /// Bad coordinates or inventory
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A direct mode combination returned no itinerary
    #[error("no {combination} itinerary found")]
    NoItinerary { combination: ModeCombination },

    /// Every mode combination failed
    #[error("all mode combinations failed: {}", summarize(.0))]
    AllModesFailed(Vec<(ModeCombination, PlanError)>),
}

fn summarize(failures: &[(ModeCombination, PlanError)]) -> String {
    failures
        .iter()
        .map(|(combination, e)| format!("{combination}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<FeedError> for PlanError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::ScheduleDataMissing => PlanError::ScheduleDataMissing(err.to_string()),
            other => PlanError::InvalidFeedLayout(other.to_string()),
        }
    }
}

impl From<ParkingError> for PlanError {
    fn from(err: ParkingError) -> Self {
        PlanError::MalformedInput(err.to_string())
    }
}

impl From<DomainError> for PlanError {
    fn from(err: DomainError) -> Self {
        PlanError::MalformedInput(err.to_string())
    }
}

impl PlanError {
    /// True when every failure is the caller's fault.
    pub fn is_input_error(&self) -> bool {
        match self {
            PlanError::MalformedInput(_) => true,
            PlanError::AllModesFailed(failures) => {
                !failures.is_empty() && failures.iter().all(|(_, e)| e.is_input_error())
            }
            _ => false,
        }
    }
}
