//! State-store errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} not found")]
    NotFound { path: PathBuf },

    /// `_meta.count` didn't match the number of entries the file actually carries.
    #[error("{path}: _meta.count is {expected} but the file has {actual} entries")]
    CountMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("{path} contains a conflict-marker substring")]
    ConflictMarker { path: PathBuf },
}
