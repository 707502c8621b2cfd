//! Pluggable hook invoked every `J`-th cycle (C11) to trigger the trending-recompute
//! sibling. `trending.json` itself is never written by this core — see
//! `synthforge_state::StateStore::write_snapshot` — this hook only signals the sibling
//! that it is its turn to run.

use tracing::warn;

pub trait TrendingSibling: Send + Sync {
    fn invoke(&self);
}

/// Default: the sibling isn't configured, so there is nothing to do.
pub struct NoopTrendingSibling;

impl TrendingSibling for NoopTrendingSibling {
    fn invoke(&self) {}
}

/// Shells out to an external command (e.g. a script that triggers the sibling's own
/// scheduled workflow). A non-zero exit or spawn failure is logged and otherwise
/// ignored — the trending file is sibling-owned, so a failure here never blocks a
/// cycle.
pub struct ExternalCommandTrendingSibling {
    pub command: String,
    pub args: Vec<String>,
}

impl TrendingSibling for ExternalCommandTrendingSibling {
    fn invoke(&self) {
        match std::process::Command::new(&self.command).args(&self.args).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(code = ?status.code(), command = %self.command, "trending sibling exited non-zero"),
            Err(error) => warn!(%error, command = %self.command, "failed to spawn trending sibling"),
        }
    }
}
