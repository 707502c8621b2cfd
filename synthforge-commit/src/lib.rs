//! Conflict-safe commit protocol (C10) for the flat-file state repository.

mod credentials;
mod error;
mod protocol;

pub use credentials::callbacks_with_token;
pub use error::CommitError;
pub use protocol::{CommitOutcome, FileChange, SafeCommitProtocol, Validator};
