//! Loaded transit feed.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::{LatLon, Location};

use super::error::FeedError;
use super::layout::{FeedSource, resolve_feed};
use super::records::{
    CalendarDateRecord, CalendarRecord, RouteRecord, StopRecord, StopTimeRecord, TripRecord,
    read_table,
};
use super::time::parse_gtfs_time;

/// One scheduled departure from a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
    pub service_id: String,
    pub route_type: Option<i32>,
    /// Seconds after midnight of the service day
    pub seconds: u32,
}

/// A GTFS feed indexed for frequency lookups.
#[derive(Debug)]
pub struct TransitFeed {
    source: FeedSource,
    stops: Vec<Location>,
    departures: HashMap<String, Vec<Departure>>,
    calendar: Option<Vec<CalendarRecord>>,
    calendar_dates: Option<Vec<CalendarDateRecord>>,
}

fn required_table<T: serde::de::DeserializeOwned>(
    source: &FeedSource,
    name: &str,
) -> Result<Vec<T>, FeedError> {
    match source.read_file(name)? {
        Some(bytes) => read_table(&bytes, name),
        None => Err(FeedError::InvalidFeedLayout {
            path: match source {
                FeedSource::Archive { path, .. } | FeedSource::Directory(path) => path.clone(),
            },
            required: name.to_string(),
        }),
    }
}

fn optional_table<T: serde::de::DeserializeOwned>(
    source: &FeedSource,
    name: &str,
) -> Result<Option<Vec<T>>, FeedError> {
    source
        .read_file(name)?
        .map(|bytes| read_table(&bytes, name))
        .transpose()
}

impl TransitFeed {
    /// Locate and load the feed under a data directory.
    pub fn load(base: &Path) -> Result<Self, FeedError> {
        let source = resolve_feed(base)?;
        Self::from_source(source)
    }

    /// Load the feed from an already resolved source.
    pub fn from_source(source: FeedSource) -> Result<Self, FeedError> {
        let stop_rows: Vec<StopRecord> = required_table(&source, "stops.txt")?;
        let routes: Vec<RouteRecord> = required_table(&source, "routes.txt")?;
        let trips: Vec<TripRecord> = required_table(&source, "trips.txt")?;
        let stop_times: Vec<StopTimeRecord> = required_table(&source, "stop_times.txt")?;
        let calendar: Option<Vec<CalendarRecord>> = optional_table(&source, "calendar.txt")?;
        let calendar_dates: Option<Vec<CalendarDateRecord>> =
            optional_table(&source, "calendar_dates.txt")?;

        let stops: Vec<Location> = stop_rows
            .into_iter()
            .filter_map(|s| {
                let coord = LatLon::new(s.stop_lat?, s.stop_lon?).ok()?;
                Some(Location::new(s.stop_id, coord))
            })
            .collect();

        let route_types: HashMap<&str, Option<i32>> = routes
            .iter()
            .map(|r| (r.route_id.as_str(), r.route_type))
            .collect();

        let trip_info: HashMap<&str, (&str, Option<i32>)> = trips
            .iter()
            .map(|t| {
                let route_type = route_types.get(t.route_id.as_str()).copied().flatten();
                (t.trip_id.as_str(), (t.service_id.as_str(), route_type))
            })
            .collect();

        let mut departures: HashMap<String, Vec<Departure>> = HashMap::new();
        let mut skipped = 0usize;

        for st in &stop_times {
            let (Some(seconds), Some((service_id, route_type))) = (
                parse_gtfs_time(&st.departure_time),
                trip_info.get(st.trip_id.as_str()),
            ) else {
                skipped += 1;
                continue;
            };

            departures
                .entry(st.stop_id.clone())
                .or_default()
                .push(Departure {
                    service_id: service_id.to_string(),
                    route_type: *route_type,
                    seconds,
                });
        }

        if skipped > 0 {
            debug!(skipped, "stop times without usable departure or trip");
        }

        info!(
            stops = stops.len(),
            stop_times = stop_times.len(),
            has_calendar = calendar.is_some(),
            has_calendar_dates = calendar_dates.is_some(),
            "loaded transit feed"
        );

        Ok(Self {
            source,
            stops,
            departures,
            calendar,
            calendar_dates,
        })
    }

    /// Where the feed was read from.
    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    /// Stops that have coordinates.
    pub fn stops(&self) -> &[Location] {
        &self.stops
    }

    /// Scheduled departures from a stop.
    pub fn departures_at(&self, stop_id: &str) -> &[Departure] {
        self.departures
            .get(stop_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Service ids running on `date`.
    ///
    /// Weekly calendar entries matching the weekday and date range are
    /// active; calendar exceptions then add (type 1) or remove (type 2)
    /// services for that exact date.
    pub fn active_services(&self, date: NaiveDate) -> Result<HashSet<String>, FeedError> {
        if self.calendar.is_none() && self.calendar_dates.is_none() {
            return Err(FeedError::ScheduleDataMissing);
        }

        let mut active: HashSet<String> = self
            .calendar
            .iter()
            .flatten()
            .filter(|c| c.runs_on(date))
            .map(|c| c.service_id.clone())
            .collect();

        for exception in self.calendar_dates.iter().flatten() {
            if exception.date == date && exception.exception_type == 1 {
                active.insert(exception.service_id.clone());
            }
        }
        for exception in self.calendar_dates.iter().flatten() {
            if exception.date == date && exception.exception_type == 2 {
                active.remove(&exception.service_id);
            }
        }

        Ok(active)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 12).unwrap()
    }

    #[test]
    fn loads_stops_with_coordinates_only() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path(), Some(WEEKDAYS_2024), None);

        let feed = TransitFeed::load(dir.path()).unwrap();
        let ids: Vec<&str> = feed.stops().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn indexes_departures_and_skips_blank_times() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path(), Some(WEEKDAYS_2024), None);

        let feed = TransitFeed::load(dir.path()).unwrap();
        assert_eq!(feed.departures_at("s1").len(), 4);
        assert_eq!(feed.departures_at("s2").len(), 4);
        assert!(feed.departures_at("s3").is_empty());
        assert_eq!(feed.departures_at("s2")[2].route_type, Some(2));
    }

    #[test]
    fn weekly_calendar_and_exceptions() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(
            dir.path(),
            Some(WEEKDAYS_2024),
            Some("sun,20240812,1\nwk,20240815,2\n"),
        );
        let feed = TransitFeed::load(dir.path()).unwrap();

        let active = feed.active_services(monday()).unwrap();
        assert!(active.contains("wk"));
        assert!(active.contains("sun"));

        let holiday = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        assert!(feed.active_services(holiday).unwrap().is_empty());
    }

    #[test]
    fn calendar_dates_alone_are_enough() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path(), None, Some("wk,20240812,1\n"));
        let feed = TransitFeed::load(dir.path()).unwrap();

        let active = feed.active_services(monday()).unwrap();
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn no_calendar_at_all_is_schedule_data_missing() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path(), None, None);
        let feed = TransitFeed::load(dir.path()).unwrap();

        assert!(matches!(
            feed.active_services(monday()),
            Err(FeedError::ScheduleDataMissing)
        ));
    }
}
