//! Safe-commit protocol errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} failed post-rebase validation")]
    Validation { path: PathBuf },

    #[error("{path} contains a conflict-marker substring, refusing to commit")]
    ConflictMarker { path: PathBuf },

    #[error("safe-commit exhausted {attempts} attempts without a clean push")]
    AttemptsExhausted { attempts: u32 },
}
