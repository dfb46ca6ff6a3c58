//! Domain types for the trip planner.
//!
//! This module contains the value types shared by the engine client, the
//! transit feed and the planner. Types that wrap untrusted input validate it
//! at construction time, so code that receives them can trust their contents.

mod error;
mod geometry;
mod location;
mod mode;
mod segment;

pub use error::DomainError;
pub use geometry::RouteLine;
pub use location::{LatLon, Location};
pub use mode::{Mode, ModeCombination, mode_key};
pub use segment::{ItinerarySegment, RouteOption, group_options, minutes_to_duration};
