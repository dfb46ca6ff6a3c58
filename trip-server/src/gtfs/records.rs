//! GTFS table rows.
//!
//! Only the columns the planner uses are declared; anything else in the
//! feed is ignored.

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::{self, Deserialize, Deserializer};

use super::error::FeedError;

/// A row from stops.txt.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRecord {
    #[serde(alias = "id")]
    pub stop_id: String,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub stop_lat: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub stop_lon: Option<f64>,
}

/// A row from stop_times.txt.
#[derive(Debug, Clone, Deserialize)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub stop_id: String,

    /// Kept as text: hours may run past 24 and the field may be blank
    #[serde(default)]
    pub departure_time: String,
}

/// A row from trips.txt.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRecord {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

/// A row from routes.txt.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRecord {
    pub route_id: String,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub route_type: Option<i32>,
}

/// A row from calendar.txt.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRecord {
    pub service_id: String,

    /// service availability by day (0 or 1)
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,

    #[serde(deserialize_with = "gtfs_date")]
    pub start_date: NaiveDate,

    #[serde(deserialize_with = "gtfs_date")]
    pub end_date: NaiveDate,
}

impl CalendarRecord {
    /// Whether the weekly pattern covers `date`.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        use chrono::{Datelike, Weekday};

        let flag = match date.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        };
        flag == 1 && self.start_date <= date && date <= self.end_date
    }
}

/// A row from calendar_dates.txt.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDateRecord {
    pub service_id: String,

    #[serde(deserialize_with = "gtfs_date")]
    pub date: NaiveDate,

    /// 1 = service added, 2 = service removed
    pub exception_type: u8,
}

/// deserialize GTFS dates in YYYYMMDD format
fn gtfs_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").map_err(serde::de::Error::custom)
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Deserialize every row of a table.
pub fn read_table<T: DeserializeOwned>(bytes: &[u8], file: &str) -> Result<Vec<T>, FeedError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    rdr.deserialize::<T>()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| FeedError::Csv {
            file: file.to_string(),
            source,
        })
}
