//! Single-threaded reconciler (C9): merges a cycle's result batch into canonical
//! state, and repairs drift against the forge's own truth out of band.

mod drift;
mod error;
mod reconcile;

pub use drift::reconcile_with_remote;
pub use error::ReconcileError;
pub use reconcile::reconcile;
