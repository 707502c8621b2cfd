//! Reconciler errors. Dispatch itself never fails on a well-formed result batch;
//! the only failure mode is the soul-file append, which is real filesystem I/O.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Soul(#[from] synthforge_state::StateError),
}
