//! GTFS time-of-day parsing.

/// Parse a GTFS `HH:MM:SS` time into seconds after midnight.
///
/// Hours may exceed 23 for trips running past midnight of their service
/// day. Minute and second fields are summed as given. Returns `None` for
/// blank or malformed values.
///
/// ```rust
/// use trip_server::gtfs::parse_gtfs_time;
///
/// assert_eq!(parse_gtfs_time("07:05:30"), Some(7 * 3600 + 5 * 60 + 30));
/// assert_eq!(parse_gtfs_time("25:00:00"), Some(25 * 3600));
/// assert_eq!(parse_gtfs_time(""), None);
/// ```
pub fn parse_gtfs_time(s: &str) -> Option<u32> {
    let mut parts = s.trim().split(':');
    let h: u32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let sec: u32 = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    h.checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(sec)
}
