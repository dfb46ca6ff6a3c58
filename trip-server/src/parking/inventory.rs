//! Loading and cleaning the parking CSV.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::domain::{LatLon, Location};

use super::error::ParkingError;

/// Cleaned parking locations.
#[derive(Debug, Clone, Default)]
pub struct ParkingInventory {
    points: Vec<Location>,
}

fn column(headers: &StringRecord, name: &'static str) -> Result<usize, ParkingError> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
        .ok_or(ParkingError::MissingColumn(name))
}

fn parse_row(record: &StringRecord, id: usize, lon: usize, lat: usize) -> Option<Location> {
    let id = record.get(id).filter(|s| !s.is_empty())?;
    let lon: f64 = record.get(lon)?.parse().ok()?;
    let lat: f64 = record.get(lat)?.parse().ok()?;
    let coord = LatLon::new(lat, lon).ok()?;
    Some(Location::new(id, coord))
}

impl ParkingInventory {
    /// Load the inventory from a CSV file.
    pub fn load(path: &Path) -> Result<Self, ParkingError> {
        let file = std::fs::File::open(path).map_err(|source| ParkingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let inventory = Self::from_reader(file)?;
        if inventory.is_empty() {
            return Err(ParkingError::Empty(path.to_path_buf()));
        }
        info!(path = %path.display(), points = inventory.len(), "loaded parking inventory");
        Ok(inventory)
    }

    /// Parse an inventory from any CSV source.
    ///
    /// Rows whose coordinates are blank, unparseable or out of range are
    /// dropped, as are repeats of an id already seen.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParkingError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let id_col = column(&headers, "id")?;
        let lon_col = column(&headers, "lon")?;
        let lat_col = column(&headers, "lat")?;

        let mut seen = HashSet::new();
        let mut points = Vec::new();
        let mut dropped = 0usize;

        for record in rdr.records() {
            let record = record?;

            match parse_row(&record, id_col, lon_col, lat_col) {
                Some(point) if seen.insert(point.id.clone()) => points.push(point),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, "parking rows dropped during cleaning");
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[Location] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<Location>> for ParkingInventory {
    fn from(points: Vec<Location>) -> Self {
        Self { points }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_rows() {
        let csv = "id,name,lon,lat\n\
                   1,Gare,6.1770,49.1097\n\
                   2,Broken,,49.1\n\
                   1,Duplicate,6.0,49.0\n\
                   3,Far,200,49.0\n\
                   4,Centre,6.1757,49.1190\n";
        let inventory = ParkingInventory::from_reader(csv.as_bytes()).unwrap();

        let ids: Vec<&str> = inventory.points().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
        assert_eq!(inventory.points()[0].coord.lon, 6.1770);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = ParkingInventory::from_reader("id,lon\n1,6.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParkingError::MissingColumn("lat")));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bike_park_metz.csv");
        std::fs::write(&path, "lat,lon,id\n49.11,6.17,p1\n").unwrap();

        let inventory = ParkingInventory::load(&path).unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.points()[0].coord.lat, 49.11);
    }

    #[test]
    fn all_rows_invalid_is_empty_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parking.csv");
        std::fs::write(&path, "id,lon,lat\np1,,\n").unwrap();

        assert!(matches!(
            ParkingInventory::load(&path),
            Err(ParkingError::Empty(_))
        ));
    }
}
