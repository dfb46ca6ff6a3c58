//! Stop service frequency estimation.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};

use super::error::FeedError;
use super::feed::TransitFeed;

impl TransitFeed {
    /// Count scheduled departures per stop in `[reference, reference + window)`.
    ///
    /// Only trips whose service runs on the reference date and whose route
    /// type is in `route_types` are counted. Departure times are measured
    /// from midnight of the reference date, so times past 24:00 fall on the
    /// following day. Every queried stop gets an entry; stops with no
    /// qualifying departures (or unknown to the feed) map to 0.
    ///
    /// Fails with `ScheduleDataMissing` when the feed has no calendar data
    /// at all.
    pub fn estimate_frequencies(
        &self,
        stop_ids: &[String],
        reference: NaiveDateTime,
        window_minutes: u32,
        route_types: &[i32],
    ) -> Result<BTreeMap<String, u32>, FeedError> {
        let active = self.active_services(reference.date())?;

        let start = u64::from(reference.num_seconds_from_midnight());
        let end = start + u64::from(window_minutes) * 60;

        let counts = stop_ids
            .iter()
            .map(|stop_id| {
                let count = self
                    .departures_at(stop_id)
                    .iter()
                    .filter(|d| (start..end).contains(&u64::from(d.seconds)))
                    .filter(|d| d.route_type.is_some_and(|t| route_types.contains(&t)))
                    .filter(|d| active.contains(&d.service_id))
                    .count();
                (stop_id.clone(), count as u32)
            })
            .collect();

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::super::feed::test_support::*;
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    const BUS_AND_TRAM: [i32; 2] = [0, 3];

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn weekday_feed() -> (tempfile::TempDir, TransitFeed) {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path(), Some(WEEKDAYS_2024), None);
        let feed = TransitFeed::load(dir.path()).unwrap();
        (dir, feed)
    }

    #[test]
    fn counts_departures_in_half_open_window() {
        let (_dir, feed) = weekday_feed();

        // s1 has 07:05, 07:25, 07:59:59 inside and 08:00 on the boundary
        let freq = feed
            .estimate_frequencies(&ids(&["s1"]), at(7, 0), 60, &BUS_AND_TRAM)
            .unwrap();
        assert_eq!(freq.get("s1"), Some(&3));
    }

    #[test]
    fn filters_route_type_and_inactive_services() {
        let (_dir, feed) = weekday_feed();

        // s2: 06:59:59 is before the window, rail is excluded, tram runs on
        // an inactive service; only the 07:30 bus counts
        let freq = feed
            .estimate_frequencies(&ids(&["s2"]), at(7, 0), 60, &BUS_AND_TRAM)
            .unwrap();
        assert_eq!(freq.get("s2"), Some(&1));

        let with_rail = feed
            .estimate_frequencies(&ids(&["s2"]), at(7, 0), 60, &[2, 3])
            .unwrap();
        assert_eq!(with_rail.get("s2"), Some(&2));
    }

    #[test]
    fn very_long_window_counts_rest_of_day() {
        let (_dir, feed) = weekday_feed();

        let freq = feed
            .estimate_frequencies(&ids(&["s1"]), at(7, 0), 80_000_000, &BUS_AND_TRAM)
            .unwrap();
        assert_eq!(freq.get("s1"), Some(&4));
    }

    #[test]
    fn unknown_and_unserved_stops_map_to_zero() {
        let (_dir, feed) = weekday_feed();

        let freq = feed
            .estimate_frequencies(&ids(&["s3", "ghost"]), at(7, 0), 60, &BUS_AND_TRAM)
            .unwrap();
        assert_eq!(freq.len(), 2);
        assert_eq!(freq.get("s3"), Some(&0));
        assert_eq!(freq.get("ghost"), Some(&0));
    }

    #[test]
    fn no_active_service_gives_all_zero() {
        let (_dir, feed) = weekday_feed();
        let saturday = NaiveDate::from_ymd_opt(2024, 8, 17)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();

        let freq = feed
            .estimate_frequencies(&ids(&["s1", "s2"]), saturday, 60, &BUS_AND_TRAM)
            .unwrap();
        assert!(freq.values().all(|&c| c == 0));
    }

    #[test]
    fn missing_calendar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path(), None, None);
        let feed = TransitFeed::load(dir.path()).unwrap();

        let err = feed
            .estimate_frequencies(&ids(&["s1"]), at(7, 0), 60, &BUS_AND_TRAM)
            .unwrap_err();
        assert!(matches!(err, FeedError::ScheduleDataMissing));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn one_entry_per_queried_stop(
            stops in proptest::collection::btree_set("s[0-9]|ghost[a-z]", 0..8),
            hour in 0u32..24,
            window in 0u32..180,
        ) {
            let (_dir, feed) = weekday_feed();
            let stops: Vec<String> = stops.into_iter().collect();

            let freq = feed
                .estimate_frequencies(&stops, at(hour, 0), window, &BUS_AND_TRAM)
                .unwrap();

            prop_assert_eq!(freq.len(), stops.len());
            for stop in &stops {
                prop_assert!(freq.contains_key(stop));
            }
        }
    }
}
