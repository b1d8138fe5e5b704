//! Error taxonomy for the record sorting pipeline.
//!
//! Only configuration errors ever reach a caller as `Err`. Everything raised
//! while a batch is running is absorbed by the runner: scan errors become a
//! soft stop, record errors are counted, file errors mark that file's report.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SortError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("No input files in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("Could not list {}: {source}", .path.display())]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Record has {fields} fields, need at least {min}")]
    MalformedRecord { fields: usize, min: usize },

    #[error("Record key {0:?} matches no routing prefix")]
    UnclassifiedRecord(String),

    #[error("I/O failure on {}: {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not create marker {}: {source}", .path.display())]
    MarkerCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not delete {}: {source}", .path.display())]
    Prune {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SortError {
    /// Wrap an I/O error with the path of the file it happened on.
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }
}
