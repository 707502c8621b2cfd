use thiserror::Error;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    State(#[from] synthforge_state::StateError),
    #[error(transparent)]
    Reconcile(#[from] synthforge_reconciler::ReconcileError),
    #[error(transparent)]
    Commit(#[from] synthforge_commit::CommitError),
}
