//! Per-cycle orchestration (C8): wires the state store, pulse builder, decision
//! kernel, worker streams, reconciler, and safe-commit protocol into one pipeline.

mod cycle;
mod error;
mod selection;
mod snapshot_files;

pub use cycle::{run_cycle, CycleConfig, CycleOutcome};
pub use error::CycleError;
pub use selection::select_agents;
pub use snapshot_files::{snapshot_to_file_changes, validate_state_file};
