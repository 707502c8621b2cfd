//! Typed readers/writers for synthforge's flat JSON state directory.
//!
//! Every write is validated (`_meta.count` must match the entries it summarizes)
//! then applied atomically: write to a sibling temp file, fsync, rename over the
//! target. A concurrent reader in another process always sees either the fully
//! previous or fully new contents, never a torn write.

mod counted;
mod error;
mod inbox;
mod soul;
mod store;

pub use counted::CountedFile;
pub use error::StateError;
pub use inbox::{emit_inbox_delta, list_inbox_deltas, InboxDelta};
pub use soul::append_soul_line;
pub use store::{contains_conflict_marker, StateStore};
