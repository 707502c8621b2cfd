//! Atomic, validated reads/writes over the flat JSON state directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use synthforge_types::{
    AgentsFile, ChangesFile, ChannelsFile, GhostMemoryFile, PokesFile, PostedLogFile,
    PredictionsFile, SocialGraphFile, StateSnapshot, StatsFile, SummonsFile, TrendingFile,
};
use tracing::{debug, instrument};

use crate::counted::CountedFile;
use crate::error::StateError;

const AGENTS: &str = "agents.json";
const CHANNELS: &str = "channels.json";
const STATS: &str = "stats.json";
const POSTED_LOG: &str = "posted_log.json";
const CHANGES: &str = "changes.json";
const TRENDING: &str = "trending.json";
const POKES: &str = "pokes.json";
const SUMMONS: &str = "summons.json";
const PREDICTIONS: &str = "predictions.json";
const SOCIAL_GRAPH: &str = "social_graph.json";
const GHOST_MEMORY: &str = "ghost_memory.json";

/// A substring that marks an unresolved git conflict — a file carrying one must never
/// be committed (§4.10, invariant 4).
pub fn contains_conflict_marker(contents: &str) -> bool {
    contents.contains("<<<<<<<") || contents.contains("=======") || contents.contains(">>>>>>>")
}

/// Root handle over a `synthforge` state directory: `agents.json`, `channels.json`,
/// ..., plus the `memory/` and `inbox/` subdirectories.
#[derive(Clone, Debug)]
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Reads and parses a JSON file relative to the state root.
    #[instrument(skip(self), fields(file = relative))]
    pub async fn read<T: DeserializeOwned>(&self, relative: &str) -> Result<T, StateError> {
        let path = self.path_for(relative);
        let contents =
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| match source.kind() {
                    std::io::ErrorKind::NotFound => StateError::NotFound { path: path.clone() },
                    _ => StateError::Io {
                        path: path.clone(),
                        source,
                    },
                })?;
        serde_json::from_str(&contents).map_err(|source| StateError::Parse { path, source })
    }

    /// Validates `_meta.count` then performs an atomic replace: write to a sibling
    /// temp file, fsync, rename over the target. A reader on any other process sees
    /// either the fully previous or fully new contents, never a torn write.
    #[instrument(skip(self, value), fields(file = relative))]
    pub async fn atomic_write<T: Serialize + CountedFile>(
        &self,
        relative: &str,
        value: &T,
    ) -> Result<(), StateError> {
        let expected = value.meta().count;
        let actual = value.actual_count();
        let path = self.path_for(relative);
        if expected != actual {
            return Err(StateError::CountMismatch {
                path,
                expected,
                actual,
            });
        }

        let serialized = serde_json::to_vec_pretty(value)
            .map_err(|source| StateError::Parse { path: path.clone(), source })?;

        let root = self.root.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || atomic_replace(&root, &target, &serialized))
            .await
            .expect("atomic_replace task panicked")?;

        debug!(count = actual, "wrote state file");
        Ok(())
    }

    pub async fn load_snapshot(&self) -> Result<StateSnapshot, StateError> {
        Ok(StateSnapshot {
            agents: self.read::<AgentsFile>(AGENTS).await?,
            channels: self.read::<ChannelsFile>(CHANNELS).await?,
            stats: self.read::<StatsFile>(STATS).await?,
            posted_log: self.read::<PostedLogFile>(POSTED_LOG).await?,
            changes: self.read::<ChangesFile>(CHANGES).await?,
            trending: self.read::<TrendingFile>(TRENDING).await?,
            pokes: self.read::<PokesFile>(POKES).await?,
            summons: self.read::<SummonsFile>(SUMMONS).await?,
            predictions: self.read::<PredictionsFile>(PREDICTIONS).await?,
            social_graph: self.read::<SocialGraphFile>(SOCIAL_GRAPH).await?,
            ghost_memory: self.read::<GhostMemoryFile>(GHOST_MEMORY).await?,
        })
    }

    pub async fn write_agents(&self, value: &AgentsFile) -> Result<(), StateError> {
        self.atomic_write(AGENTS, value).await
    }

    pub async fn write_channels(&self, value: &ChannelsFile) -> Result<(), StateError> {
        self.atomic_write(CHANNELS, value).await
    }

    pub async fn write_stats(&self, value: &StatsFile) -> Result<(), StateError> {
        self.atomic_write(STATS, value).await
    }

    pub async fn write_posted_log(&self, value: &PostedLogFile) -> Result<(), StateError> {
        self.atomic_write(POSTED_LOG, value).await
    }

    pub async fn write_changes(&self, value: &ChangesFile) -> Result<(), StateError> {
        self.atomic_write(CHANGES, value).await
    }

    pub async fn write_pokes(&self, value: &PokesFile) -> Result<(), StateError> {
        self.atomic_write(POKES, value).await
    }

    pub async fn write_summons(&self, value: &SummonsFile) -> Result<(), StateError> {
        self.atomic_write(SUMMONS, value).await
    }

    pub async fn write_predictions(&self, value: &PredictionsFile) -> Result<(), StateError> {
        self.atomic_write(PREDICTIONS, value).await
    }

    pub async fn write_social_graph(&self, value: &SocialGraphFile) -> Result<(), StateError> {
        self.atomic_write(SOCIAL_GRAPH, value).await
    }

    pub async fn write_ghost_memory(&self, value: &GhostMemoryFile) -> Result<(), StateError> {
        self.atomic_write(GHOST_MEMORY, value).await
    }

    pub async fn write_snapshot(&self, snapshot: &StateSnapshot) -> Result<(), StateError> {
        self.write_agents(&snapshot.agents).await?;
        self.write_channels(&snapshot.channels).await?;
        self.write_stats(&snapshot.stats).await?;
        self.write_posted_log(&snapshot.posted_log).await?;
        self.write_changes(&snapshot.changes).await?;
        self.write_pokes(&snapshot.pokes).await?;
        self.write_summons(&snapshot.summons).await?;
        self.write_predictions(&snapshot.predictions).await?;
        self.write_social_graph(&snapshot.social_graph).await?;
        self.write_ghost_memory(&snapshot.ghost_memory).await?;
        Ok(())
    }
}

/// Writes `contents` to `<dir of target>/.tmp-<target file name>-<pid>`, fsyncs, then
/// renames over `target`. Runs on a blocking thread — this does real filesystem I/O.
fn atomic_replace(root: &Path, target: &Path, contents: &[u8]) -> Result<(), StateError> {
    use std::fs;
    use std::io::Write;

    let dir = target.parent().unwrap_or(root);
    fs::create_dir_all(dir).map_err(|source| StateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("state");
    let tmp_path = dir.join(format!(".tmp-{file_name}-{}", std::process::id()));

    let mut file = fs::File::create(&tmp_path).map_err(|source| StateError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    file.write_all(contents).map_err(|source| StateError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    file.sync_all().map_err(|source| StateError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    drop(file);

    fs::rename(&tmp_path, target).map_err(|source| StateError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    Ok(())
}
