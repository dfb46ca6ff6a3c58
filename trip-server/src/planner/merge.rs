//! Itinerary stitching and per-option post-processing.
//!
//! The engine only reports an authoritative departure time for the first
//! segment of an itinerary, and the two legs of a park-and-ride trip are
//! queried with the same departure time. Departures are therefore rebuilt
//! cumulatively from segment durations once the legs are joined.

use crate::domain::{ItinerarySegment, group_options, minutes_to_duration};

/// Join the access leg and the onward leg into one route option.
///
/// All segments take the access leg's option id and are renumbered in
/// sequence. Segment count and the order within each leg are preserved.
pub fn merge_itineraries(
    leg1: Vec<ItinerarySegment>,
    leg2: Vec<ItinerarySegment>,
) -> Vec<ItinerarySegment> {
    let option = leg1.first().or(leg2.first()).map_or(1, |s| s.option);

    leg1.into_iter()
        .chain(leg2)
        .zip(1u32..)
        .map(|(mut segment, order)| {
            segment.option = option;
            segment.order = order;
            segment
        })
        .collect()
}

/// Rebuild departure times within one route option.
///
/// Each segment departs when the previous one ends: previous departure plus
/// previous duration, plus this segment's wait when it is a scheduled
/// service. Segments following one with an unknown departure or duration
/// keep the time the engine gave them.
pub fn recompute_departures(segments: &mut [ItinerarySegment]) {
    for j in 1..segments.len() {
        let (done, rest) = segments.split_at_mut(j);
        let previous = &done[j - 1];
        let current = &mut rest[0];

        let (Some(departed), Some(duration)) = (previous.departure_time, previous.duration())
        else {
            continue;
        };

        let wait = if current.mode.is_scheduled() {
            current.wait()
        } else {
            chrono::Duration::zero()
        };

        // Out-of-range sums keep the reported departure.
        if let Some(next) = departed
            .checked_add_signed(duration)
            .and_then(|t| t.checked_add_signed(wait))
        {
            current.departure_time = Some(next);
        }
    }
}

/// Post-process a mode combination's segments option by option.
///
/// Options keep their first-seen order.
pub fn normalize_options(segments: Vec<ItinerarySegment>) -> Vec<ItinerarySegment> {
    group_options(segments)
        .into_iter()
        .flat_map(|mut option| {
            recompute_departures(&mut option.segments);
            option.segments
        })
        .collect()
}

/// Add a fixed start-up overhead to the first segment's duration.
///
/// An unknown duration counts as zero. Departure times are not shifted.
pub fn apply_overhead(segments: &mut [ItinerarySegment], overhead_mins: f64) {
    if overhead_mins == 0.0 {
        return;
    }
    if let Some(first) = segments.first_mut() {
        let base = first
            .duration_mins
            .filter(|d| minutes_to_duration(*d).is_some())
            .unwrap_or(0.0);
        first.duration_mins = Some(base + overhead_mins);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 8, 12)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    fn seg(option: u32, order: u32, mode: Mode, duration: Option<f64>) -> ItinerarySegment {
        let mut s = ItinerarySegment::new(option, order, mode);
        s.duration_mins = duration;
        s.departure_time = Some(t0());
        s
    }

    #[test]
    fn cumulative_departures() {
        let mut segments = vec![
            seg(1, 1, Mode::Walk, Some(10.0)),
            seg(1, 2, Mode::Walk, Some(5.0)),
            seg(1, 3, Mode::Walk, Some(8.0)),
        ];
        recompute_departures(&mut segments);

        let deps: Vec<_> = segments.iter().map(|s| s.departure_time.unwrap()).collect();
        assert_eq!(
            deps,
            vec![t0(), t0() + Duration::minutes(10), t0() + Duration::minutes(15)]
        );
    }

    #[test]
    fn wait_added_when_boarding_scheduled_service() {
        let mut bus = seg(1, 2, Mode::Bus, Some(12.0));
        bus.wait_mins = Some(4.0);
        let mut walk = seg(1, 3, Mode::Walk, Some(3.0));
        walk.wait_mins = Some(9.0);

        let mut segments = vec![seg(1, 1, Mode::Walk, Some(6.0)), bus, walk];
        recompute_departures(&mut segments);

        assert_eq!(segments[1].departure_time, Some(t0() + Duration::minutes(10)));
        // walking never waits
        assert_eq!(segments[2].departure_time, Some(t0() + Duration::minutes(22)));
    }

    #[test]
    fn unknown_duration_leaves_next_departure() {
        let mut segments = vec![
            seg(1, 1, Mode::Walk, None),
            seg(1, 2, Mode::Walk, Some(5.0)),
            seg(1, 3, Mode::Walk, Some(8.0)),
        ];
        recompute_departures(&mut segments);

        assert_eq!(segments[1].departure_time, Some(t0()));
        assert_eq!(segments[2].departure_time, Some(t0() + Duration::minutes(5)));
    }

    #[test]
    fn huge_duration_keeps_reported_departure() {
        let mut segments = vec![
            seg(1, 1, Mode::Car, Some(1e12)),
            seg(1, 2, Mode::Walk, Some(5.0)),
        ];
        recompute_departures(&mut segments);

        assert_eq!(segments[1].departure_time, Some(t0()));
    }

    #[test]
    fn options_are_recomputed_independently() {
        let segments = vec![
            seg(1, 1, Mode::Walk, Some(10.0)),
            seg(2, 1, Mode::Walk, Some(20.0)),
            seg(1, 2, Mode::Walk, Some(5.0)),
            seg(2, 2, Mode::Walk, Some(5.0)),
        ];
        let normalized = normalize_options(segments);

        let summary: Vec<_> = normalized
            .iter()
            .map(|s| (s.option, s.departure_time.unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, t0()),
                (1, t0() + Duration::minutes(10)),
                (2, t0()),
                (2, t0() + Duration::minutes(20)),
            ]
        );
    }

    #[test]
    fn overhead_applies_to_first_segment_only() {
        let mut segments = vec![seg(1, 1, Mode::Car, Some(9.0)), seg(1, 2, Mode::Walk, Some(2.0))];
        apply_overhead(&mut segments, 10.0);
        assert_eq!(segments[0].duration_mins, Some(19.0));
        assert_eq!(segments[1].duration_mins, Some(2.0));

        let mut unknown = vec![seg(1, 1, Mode::Bicycle, None)];
        apply_overhead(&mut unknown, 5.0);
        assert_eq!(unknown[0].duration_mins, Some(5.0));
    }

    #[test]
    fn merge_renumbers_under_first_leg_option() {
        let leg1 = vec![seg(3, 1, Mode::Bicycle, Some(8.0))];
        let leg2 = vec![seg(1, 1, Mode::Walk, Some(2.0)), seg(1, 2, Mode::Bus, Some(12.0))];

        let merged = merge_itineraries(leg1, leg2);
        let shape: Vec<_> = merged.iter().map(|s| (s.option, s.order, s.mode.clone())).collect();
        assert_eq!(
            shape,
            vec![(3, 1, Mode::Bicycle), (3, 2, Mode::Walk), (3, 3, Mode::Bus)]
        );
    }

    fn arb_leg(tag: u32) -> impl Strategy<Value = Vec<ItinerarySegment>> {
        proptest::collection::vec(0.0f64..60.0, 0..6).prop_map(move |durations| {
            durations
                .into_iter()
                .enumerate()
                .map(|(i, d)| {
                    let mut s = seg(tag, i as u32 + 1, Mode::Walk, Some(d));
                    s.route = Some(format!("{tag}-{i}"));
                    s
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn merge_preserves_count_and_leg_order(leg1 in arb_leg(1), leg2 in arb_leg(2)) {
            let expected: Vec<Option<String>> = leg1
                .iter()
                .chain(leg2.iter())
                .map(|s| s.route.clone())
                .collect();

            let merged = merge_itineraries(leg1, leg2);

            prop_assert_eq!(merged.len(), expected.len());
            let routes: Vec<Option<String>> = merged.iter().map(|s| s.route.clone()).collect();
            prop_assert_eq!(routes, expected);
            for (i, s) in merged.iter().enumerate() {
                prop_assert_eq!(s.order, i as u32 + 1);
            }
        }

        #[test]
        fn departures_never_go_backwards(leg in arb_leg(1)) {
            let mut leg = leg;
            recompute_departures(&mut leg);
            for pair in leg.windows(2) {
                prop_assert!(pair[0].departure_time <= pair[1].departure_time);
            }
        }
    }
}
