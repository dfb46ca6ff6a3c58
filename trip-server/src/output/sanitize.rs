//! Replacing non-finite numbers before serialization.
//!
//! JSON has no NaN or infinity, and a CSV cell holding `inf` is of little
//! use downstream. Such cells become null, and every affected column is
//! reported.

use serde::Serialize;
use tracing::warn;

use super::table::{NUMERIC_COLUMNS, TripRow};

/// What sanitizing found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SanitizeReport {
    pub issues_detected: bool,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Defect {
    NaN,
    PosInf,
    NegInf,
}

impl Defect {
    const ALL: [Defect; 3] = [Defect::NaN, Defect::PosInf, Defect::NegInf];

    fn of(value: f64) -> Option<Self> {
        if value.is_nan() {
            Some(Defect::NaN)
        } else if value == f64::INFINITY {
            Some(Defect::PosInf)
        } else if value == f64::NEG_INFINITY {
            Some(Defect::NegInf)
        } else {
            None
        }
    }

    fn name(self) -> &'static str {
        match self {
            Defect::NaN => "NaN",
            Defect::PosInf => "+Infinity",
            Defect::NegInf => "-Infinity",
        }
    }
}

/// Null out every NaN and infinite numeric cell.
///
/// Row indices in the log are 0-based positions in `rows`.
pub fn sanitize_rows(rows: &mut [TripRow]) -> SanitizeReport {
    let mut found: Vec<(usize, Defect, usize)> = Vec::new();

    for (index, row) in rows.iter_mut().enumerate() {
        for (column, cell) in row.numeric_cells_mut().into_iter().enumerate() {
            if let Some(defect) = cell.and_then(Defect::of) {
                *cell = None;
                found.push((column, defect, index));
            }
        }
    }

    let mut report = SanitizeReport::default();

    for (column, name) in NUMERIC_COLUMNS.iter().enumerate() {
        for defect in Defect::ALL {
            let indices: Vec<usize> = found
                .iter()
                .filter(|(c, d, _)| *c == column && *d == defect)
                .map(|(_, _, i)| *i)
                .collect();
            if indices.is_empty() {
                continue;
            }

            warn!(
                column = *name,
                kind = defect.name(),
                rows = ?indices,
                "non-finite values replaced with null"
            );
            report
                .log
                .push(format!("Column '{name}' has {} at rows: {indices:?}", defect.name()));
        }
    }

    if !report.log.is_empty() {
        report.issues_detected = true;
        report
            .log
            .push("These values were replaced with null in JSON and CSV.".to_string());
    }

    report
}
