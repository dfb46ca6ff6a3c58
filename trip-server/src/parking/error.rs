//! Parking inventory error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParkingError {
    /// A required column is absent from the header
    #[error("parking inventory is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// No row survived cleaning
    #[error("no valid parking points in {0}")]
    Empty(PathBuf),

    #[error("failed to read parking inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed parking inventory: {0}")]
    Csv(#[from] csv::Error),
}
