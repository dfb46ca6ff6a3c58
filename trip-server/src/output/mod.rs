//! Trip summary output.
//!
//! A plan is flattened into one row per segment, cleaned of non-finite
//! numbers, written to a uniquely named CSV file and regrouped for the API
//! response.

mod error;
mod nested;
mod persist;
mod sanitize;
mod table;

use std::path::{Path, PathBuf};

pub use error::OutputError;
pub use nested::{Coordinate, RouteGroup, SegmentView, TransportData, TransportMode, nest_rows};
pub use persist::{find_summary, read_summary, summary_file_name, write_summary};
pub use sanitize::{SanitizeReport, sanitize_rows};
pub use table::{COLUMNS, NUMERIC_COLUMNS, TripRow, build_rows};

/// Everything produced from one plan.
#[derive(Debug)]
pub struct TripSummary {
    pub id: String,
    pub path: PathBuf,
    pub rows: Vec<TripRow>,
    pub report: SanitizeReport,
}

impl TripSummary {
    /// The grouped view of the rows.
    pub fn nested(&self) -> TransportData {
        nest_rows(&self.rows)
    }
}

/// Sanitize and persist the rows flattened from a plan.
///
/// Does blocking file I/O.
pub fn summarize_rows(mut rows: Vec<TripRow>, dir: &Path) -> Result<TripSummary, OutputError> {
    let report = sanitize_rows(&mut rows);
    let (id, path) = write_summary(dir, &rows)?;

    Ok(TripSummary {
        id,
        path,
        rows,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItinerarySegment, Mode, ModeCombination};
    use crate::planner::{ModeItinerary, TripPlan};

    #[test]
    fn summarize_cleans_before_writing() {
        let mut bad = ItinerarySegment::new(1, 1, Mode::Car);
        bad.duration_mins = Some(f64::INFINITY);
        let plan = TripPlan {
            itineraries: vec![ModeItinerary {
                combination: ModeCombination::Car,
                segments: vec![bad],
            }],
            failures: vec![],
        };
        let dir = tempfile::tempdir().unwrap();

        let summary = summarize_rows(build_rows(&plan), dir.path()).unwrap();

        assert!(summary.report.issues_detected);
        assert_eq!(summary.rows[0].segment_duration, None);
        let text = std::fs::read_to_string(&summary.path).unwrap();
        assert!(!text.contains("inf"));
        assert_eq!(summary.nested().transport_modes[0].mode_type, "CAR");
        assert_eq!(find_summary(dir.path(), &summary.id), Some(summary.path));
    }
}
