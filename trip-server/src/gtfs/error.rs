//! Transit feed error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from locating or reading a GTFS feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// No archive or directory under the data path holds the core files
    #[error("no GTFS feed with {required} found under {path}")]
    InvalidFeedLayout { path: PathBuf, required: String },

    /// Neither calendar.txt nor calendar_dates.txt is present
    #[error("feed has neither calendar.txt nor calendar_dates.txt")]
    ScheduleDataMissing,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("malformed {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}
