//! Serializes a [`StateSnapshot`] into the flat-file byte layout the state store and
//! the safe-commit protocol both understand, and validates bytes read back the same way.

use std::path::{Path, PathBuf};

use synthforge_state::CountedFile;
use synthforge_types::{
    AgentsFile, ChangesFile, ChannelsFile, GhostMemoryFile, PokesFile, PostedLogFile,
    PredictionsFile, SocialGraphFile, StateSnapshot, StatsFile, SummonsFile,
};

use synthforge_commit::FileChange;

/// `trending.json` is deliberately excluded — it is owned by a sibling process and
/// never written by the core (mirrors [`synthforge_state::StateStore::write_snapshot`]).
pub fn snapshot_to_file_changes(snapshot: &StateSnapshot) -> Vec<FileChange> {
    vec![
        file_change("agents.json", &snapshot.agents),
        file_change("channels.json", &snapshot.channels),
        file_change("stats.json", &snapshot.stats),
        file_change("posted_log.json", &snapshot.posted_log),
        file_change("changes.json", &snapshot.changes),
        file_change("pokes.json", &snapshot.pokes),
        file_change("summons.json", &snapshot.summons),
        file_change("predictions.json", &snapshot.predictions),
        file_change("social_graph.json", &snapshot.social_graph),
        file_change("ghost_memory.json", &snapshot.ghost_memory),
    ]
}

fn file_change<T: serde::Serialize>(name: &str, value: &T) -> FileChange {
    FileChange {
        path: PathBuf::from(name),
        contents: serde_json::to_vec_pretty(value).expect("state structs always serialize"),
    }
}

/// Re-parses a committed file's bytes and checks its `_meta.count` still matches its
/// own entry count, the same check the state store runs before every local write.
/// Dispatches on the file's name since the commit protocol is generic over bytes and
/// carries no type information of its own.
pub fn validate_state_file(path: &Path, contents: &[u8]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    match name {
        "agents.json" => counted_ok::<AgentsFile>(contents),
        "channels.json" => counted_ok::<ChannelsFile>(contents),
        "stats.json" => counted_ok::<StatsFile>(contents),
        "posted_log.json" => counted_ok::<PostedLogFile>(contents),
        "changes.json" => counted_ok::<ChangesFile>(contents),
        "pokes.json" => counted_ok::<PokesFile>(contents),
        "summons.json" => counted_ok::<SummonsFile>(contents),
        "predictions.json" => counted_ok::<PredictionsFile>(contents),
        "social_graph.json" => counted_ok::<SocialGraphFile>(contents),
        "ghost_memory.json" => counted_ok::<GhostMemoryFile>(contents),
        _ => true,
    }
}

fn counted_ok<T: serde::de::DeserializeOwned + CountedFile>(contents: &[u8]) -> bool {
    match serde_json::from_slice::<T>(contents) {
        Ok(value) => value.meta().count == value.actual_count(),
        Err(_) => false,
    }
}
