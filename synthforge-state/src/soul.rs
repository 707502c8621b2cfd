//! Soul files: append-only per-agent markdown logs at `memory/<agent-id>.md`.

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use crate::error::StateError;

fn soul_path(root: &Path, agent_id: &str) -> PathBuf {
    root.join("memory").join(format!("{agent_id}.md"))
}

/// Appends one line to an agent's soul file, creating `memory/` and the file itself
/// if needed. Never truncates — this is a running diary, not a replaceable snapshot,
/// so it does not go through `atomic_write`.
#[instrument(skip(root, line), fields(agent_id))]
pub async fn append_soul_line(root: &Path, agent_id: &str, line: &str) -> Result<(), StateError> {
    let path = soul_path(root, agent_id);
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StateError::Io { path: dir.to_path_buf(), source })?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .map_err(|source| StateError::Io { path: path.clone(), source })?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|source| StateError::Io { path: path.clone(), source })?;
    if !line.ends_with('\n') {
        file.write_all(b"\n")
            .await
            .map_err(|source| StateError::Io { path: path.clone(), source })?;
    }
    file.flush()
        .await
        .map_err(|source| StateError::Io { path, source })?;
    Ok(())
}
