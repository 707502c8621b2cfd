//! Inbox delta files: `inbox/<agent-id>-<unix-ts-ms>.json`, the sole path by which the
//! core mutates non-forge-native state (heartbeat, poke) ahead of external ingestion.
//!
//! Multiple emitters may write concurrently; a single external inbox processor
//! consumes them. This crate only emits and lists — ingestion itself is out of scope.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::StateError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboxDelta {
    pub agent_id: String,
    pub action: String,
    pub payload: serde_json::Value,
}

fn inbox_dir(root: &Path) -> PathBuf {
    root.join("inbox")
}

/// Writes a new delta file named `<agent-id>-<unix-ts-ms>.json`. Each call uses a
/// fresh temp-file-then-rename so concurrent emitters never see a torn write, even
/// though each emitter targets a distinct final filename.
#[instrument(skip(root, delta), fields(agent_id = %delta.agent_id))]
pub async fn emit_inbox_delta(root: &Path, delta: &InboxDelta, now_ms: i64) -> Result<PathBuf, StateError> {
    let dir = inbox_dir(root);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| StateError::Io { path: dir.clone(), source })?;

    let file_name = format!("{}-{}.json", delta.agent_id, now_ms);
    let target = dir.join(&file_name);
    let tmp = dir.join(format!(".tmp-{file_name}-{}", std::process::id()));

    let serialized = serde_json::to_vec_pretty(delta)
        .map_err(|source| StateError::Parse { path: target.clone(), source })?;
    tokio::fs::write(&tmp, &serialized)
        .await
        .map_err(|source| StateError::Io { path: tmp.clone(), source })?;
    tokio::fs::rename(&tmp, &target)
        .await
        .map_err(|source| StateError::Io { path: target.clone(), source })?;
    Ok(target)
}

/// Lists pending delta files in filename order (which sorts by agent id then
/// timestamp, since both are fixed-width-free ASCII and timestamps are zero-padded
/// millisecond counts for any reasonable operating lifetime).
pub async fn list_inbox_deltas(root: &Path) -> Result<Vec<PathBuf>, StateError> {
    let dir = inbox_dir(root);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(source) => return Err(StateError::Io { path: dir, source }),
    };
    let mut paths = vec![];
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| StateError::Io { path: dir.clone(), source })?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
