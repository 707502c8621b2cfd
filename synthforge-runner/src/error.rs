//! Top-level runner error, composed from every lower crate's own error enum.
//! Maps onto the documented exit codes: 1 configuration, 2 no usable LLM provider,
//! 3 forge unreachable at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no LLM provider has usable credentials at startup")]
    NoProviders,

    #[error("forge unreachable at startup: {0}")]
    ForgeUnreachable(String),

    #[error(transparent)]
    State(#[from] synthforge_state::StateError),

    #[error(transparent)]
    Cycle(#[from] synthforge_orchestrator::CycleError),

    #[error(transparent)]
    Commit(#[from] synthforge_commit::CommitError),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Config(_) => 1,
            RunError::NoProviders => 2,
            RunError::ForgeUnreachable(_) => 3,
            RunError::State(_) | RunError::Cycle(_) | RunError::Commit(_) => 1,
        }
    }
}
