//! Domain error types.
//!
//! These errors represent validation failures on raw inputs (coordinate
//! strings, geometry text, mode names). They are distinct from engine and
//! feed I/O errors.

/// Domain-level errors for validation of untrusted input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A "lat, lon" string could not be parsed
    #[error("invalid coordinate string {input:?}: {reason}")]
    InvalidCoordinate { input: String, reason: &'static str },

    /// Latitude or longitude outside the WGS84 range
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    CoordinateOutOfRange { lat: f64, lon: f64 },

    /// Geometry text was not a WKT LINESTRING
    #[error("invalid line geometry: {0}")]
    InvalidGeometry(String),

    /// A line geometry needs at least two points
    #[error("line geometry must have at least 2 points, got {0}")]
    DegenerateLine(usize),
}
