//! Itinerary segment types.
//!
//! An `ItinerarySegment` is one leg of travel as reported by the routing
//! engine, after normalization. Segments sharing an option id form a
//! `RouteOption`: one complete alternative for a mode combination.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::{Mode, RouteLine};

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItinerarySegment {
    /// Route option this segment belongs to (1-based, as the engine numbers them)
    pub option: u32,

    /// Position within the route option (1-based)
    pub order: u32,

    /// Transport mode used on this segment
    pub mode: Mode,

    /// Route identifier, transit segments only
    pub route: Option<String>,

    /// Segment duration in minutes
    pub duration_mins: Option<f64>,

    /// Segment distance in metres
    pub distance_m: Option<f64>,

    /// Departure time at the start of the segment
    pub departure_time: Option<NaiveDateTime>,

    /// Waiting time before boarding, in minutes
    pub wait_mins: Option<f64>,

    /// Path travelled
    pub geometry: Option<RouteLine>,
}

impl ItinerarySegment {
    /// Create a segment with only the mandatory fields set.
    pub fn new(option: u32, order: u32, mode: Mode) -> Self {
        Self {
            option,
            order,
            mode,
            route: None,
            duration_mins: None,
            distance_m: None,
            departure_time: None,
            wait_mins: None,
            geometry: None,
        }
    }

    /// Duration as a chrono `Duration`, if known and finite.
    pub fn duration(&self) -> Option<Duration> {
        self.duration_mins.and_then(minutes_to_duration)
    }

    /// Wait as a chrono `Duration`, treating unknown as zero.
    pub fn wait(&self) -> Duration {
        self.wait_mins
            .and_then(minutes_to_duration)
            .unwrap_or_else(Duration::zero)
    }
}

/// Convert fractional minutes to a `Duration` with millisecond precision.
pub fn minutes_to_duration(mins: f64) -> Option<Duration> {
    let millis = (mins * 60_000.0).round();
    // Also rejects NaN and infinities.
    if !(millis.abs() < i64::MAX as f64) {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}

/// One complete itinerary alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOption {
    pub option: u32,
    pub segments: Vec<ItinerarySegment>,
}

/// Group segments by option id.
///
/// Options appear in first-seen order; segments keep their relative order
/// within each option.
pub fn group_options(segments: Vec<ItinerarySegment>) -> Vec<RouteOption> {
    let mut options: Vec<RouteOption> = Vec::new();

    for segment in segments {
        match options.iter_mut().find(|o| o.option == segment.option) {
            Some(existing) => existing.segments.push(segment),
            None => options.push(RouteOption {
                option: segment.option,
                segments: vec![segment],
            }),
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(option: u32, order: u32) -> ItinerarySegment {
        ItinerarySegment::new(option, order, Mode::Walk)
    }

    #[test]
    fn group_keeps_first_seen_order() {
        let grouped = group_options(vec![seg(2, 1), seg(1, 1), seg(2, 2), seg(1, 2)]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].option, 2);
        assert_eq!(grouped[1].option, 1);
        assert_eq!(
            grouped[0].segments.iter().map(|s| s.order).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn group_empty() {
        assert!(group_options(vec![]).is_empty());
    }

    #[test]
    fn duration_conversion() {
        assert_eq!(minutes_to_duration(10.0), Some(Duration::minutes(10)));
        assert_eq!(minutes_to_duration(0.5), Some(Duration::seconds(30)));
        assert_eq!(minutes_to_duration(f64::INFINITY), None);
        assert_eq!(minutes_to_duration(f64::NAN), None);
        assert_eq!(minutes_to_duration(1e300), None);
        assert_eq!(minutes_to_duration(-1e300), None);
    }

    #[test]
    fn missing_wait_is_zero() {
        let s = seg(1, 1);
        assert_eq!(s.wait(), Duration::zero());
        assert_eq!(s.duration(), None);
    }
}
