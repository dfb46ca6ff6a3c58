//! GTFS transit feed access.
//!
//! The feed is located once under the data directory, loaded into memory,
//! and indexed by stop so that frequency estimation for a handful of stops
//! does not rescan every stop time.

mod error;
mod feed;
mod frequency;
mod layout;
mod records;
mod time;

pub use error::FeedError;
pub use feed::{Departure, TransitFeed};
pub use layout::{FeedSource, REQUIRED_FILES, resolve_feed};
pub use time::parse_gtfs_time;

#[cfg(test)]
pub(crate) use feed::test_support as test_feed;
