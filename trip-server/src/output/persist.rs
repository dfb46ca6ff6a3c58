//! Writing the trip summary CSV.

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use super::error::OutputError;
use super::table::{COLUMNS, TripRow};

const PREFIX: &str = "trip_summary_";

/// File name of the summary with the given id.
pub fn summary_file_name(id: &str) -> String {
    format!("{PREFIX}{id}.csv")
}

/// Path of an existing summary, if `id` is well formed and the file exists.
///
/// Only simple-format UUIDs are accepted, so the id cannot name a path
/// outside `dir`.
pub fn find_summary(dir: &Path, id: &str) -> Option<PathBuf> {
    let id = Uuid::try_parse(id).ok()?.simple().to_string();
    let path = dir.join(summary_file_name(&id));
    path.is_file().then_some(path)
}

/// Contents of a persisted summary, or `None` if there is no such id.
pub fn read_summary(dir: &Path, id: &str) -> Result<Option<String>, OutputError> {
    let Some(path) = find_summary(dir, id) else {
        return Ok(None);
    };
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| OutputError::Read { path, source })
}

/// Write rows to a freshly named `trip_summary_<uuid>.csv` in `dir`.
///
/// Returns the id and the path written.
pub fn write_summary(dir: &Path, rows: &[TripRow]) -> Result<(String, PathBuf), OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let id = Uuid::new_v4().simple().to_string();
    let path = dir.join(summary_file_name(&id));
    let write_err = |source| OutputError::Write {
        path: path.clone(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(write_err)?;

    writer.write_record(COLUMNS).map_err(write_err)?;
    for row in rows {
        writer.serialize(row).map_err(write_err)?;
    }
    writer.flush().map_err(|source| OutputError::Flush {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), rows = rows.len(), "trip summary written");
    Ok((id, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;
    use chrono::NaiveDate;

    fn row(segment: u32) -> TripRow {
        TripRow {
            mode_transport: "Walk+Transit".into(),
            option: 1,
            segment,
            mode: Mode::Bus,
            route: Some("L5".into()),
            from_lat: Some(49.1),
            from_lon: Some(6.1),
            to_lat: None,
            to_lon: None,
            segment_duration: Some(12.5),
            distance: Some(3400.0),
            departure_time: NaiveDate::from_ymd_opt(2024, 8, 12)
                .unwrap()
                .and_hms_opt(7, 4, 0),
            wait: Some(2.0),
            geometry: None,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (id, path) = write_summary(dir.path(), &[row(1), row(2)]).unwrap();

        assert_eq!(id.len(), 32);
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("trip_summary_{id}.csv")
        );

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, COLUMNS);

        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][2], "2");
        assert_eq!(&records[0][3], "BUS");
        assert_eq!(&records[0][7], "");
        assert_eq!(&records[0][11], "2024-08-12T07:04:00");
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let (_, path) = write_summary(dir.path(), &[]).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("mode_transport,option,segment"));
    }

    #[test]
    fn each_write_gets_a_new_name() {
        let dir = tempfile::tempdir().unwrap();
        let (a, _) = write_summary(dir.path(), &[row(1)]).unwrap();
        let (b, _) = write_summary(dir.path(), &[row(1)]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn read_summary_returns_written_text() {
        let dir = tempfile::tempdir().unwrap();
        let (id, path) = write_summary(dir.path(), &[row(1)]).unwrap();

        let text = read_summary(dir.path(), &id).unwrap().unwrap();
        assert_eq!(text, std::fs::read_to_string(path).unwrap());
        assert!(read_summary(dir.path(), "not-an-id").unwrap().is_none());
    }

    #[test]
    fn find_summary_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let (id, path) = write_summary(dir.path(), &[row(1)]).unwrap();

        assert_eq!(find_summary(dir.path(), &id), Some(path));
        assert_eq!(find_summary(dir.path(), "../etc/passwd"), None);
        assert_eq!(
            find_summary(dir.path(), &Uuid::new_v4().simple().to_string()),
            None
        );
    }
}
