//! Worker stream (C7): a cooperative pipeline that consumes a disjoint partition of
//! a cycle's task set, drafts content through the LLM chain, mutates the forge
//! through the pacer-backed client, and emits one result record per task.

mod failure;
mod partition;
mod prompt;
mod stream;

pub use partition::partition_tasks;
pub use stream::{run_stream, WorkerContext};
