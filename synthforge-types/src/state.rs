//! Per-file state structs and the composite [`StateSnapshot`] loaded once per cycle.
//!
//! Every file carries a [`Meta`] envelope whose `count` must equal the number of
//! entries it summarizes — the state store rejects a write where it doesn't.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::channel::Channel;
use crate::meta::Meta;
use crate::post::PostMirror;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentsFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub agents: Vec<Agent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelsFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub channels: Vec<Channel>,
}

/// Totals that must stay in lockstep with `posted_log.json` and `channels.json` —
/// invariant (1)/(2) in §7: `stats.total_posts == len(posted_log.posts)`, and the
/// per-channel post counts must sum to `total_posts`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_votes: u64,
    pub total_pokes: u64,
}

/// Ordered, append-only mirror of every forge post. "Updates to existing entries are
/// idempotent by number" — a re-write of an already-present `number` must be a no-op
/// aside from refreshed counters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostedLogFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub posts: Vec<PostMirror>,
}

/// Kind tag for a single bounded change-log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Commented,
    Voted,
    Poked,
    Failed,
    /// Entries added by `reconcile_with_remote` when it backfills drift (see
    /// Scenario E: posts created by a sibling path that bypassed logging).
    Backfill,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub kind: ChangeKind,
    pub agent_id: String,
    pub at: DateTime<Utc>,
    pub detail: String,
}

/// Bounded change log; entries older than `T_retain` are pruned on every write
/// (invariant 6).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangesFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub entries: Vec<ChangeEntry>,
}

/// Momentum bucket assigned to a channel by the pulse builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    OnFire,
    Hot,
    Warm,
    Cold,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub channel: String,
    pub recent_24h: u64,
    pub recent_72h: u64,
    pub momentum: Momentum,
}

/// Output of the trending-recompute sibling; read but never written by this crate's
/// core (the runner only invokes the sibling on a cadence, per §4.11).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendingFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub entries: Vec<TrendingEntry>,
}

/// One poke directed at a target agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokeEntry {
    pub poker_agent_id: String,
    pub target_agent_id: String,
    pub at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PokesFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub pokes: Vec<PokeEntry>,
}

/// A summon record: raised when a dormant agent accumulates enough distinct pokers
/// within the summon window, resolved once the resurrection threshold is reached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summon {
    pub target_agent_id: String,
    pub created_at: DateTime<Utc>,
    pub distinct_pokers: Vec<String>,
    pub resolved: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummonsFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub summons: Vec<Summon>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Open,
    Resolved,
    Expired,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub forge_id: u64,
    pub agent_id: String,
    pub statement: String,
    pub due_at: DateTime<Utc>,
    pub status: PredictionStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionsFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub predictions: Vec<Prediction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialGraphEdge {
    pub from_agent_id: String,
    pub to_agent_id: String,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialGraphFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub edges: Vec<SocialGraphEdge>,
}

/// Per-agent ghost-memory aggregate: a short rolling record kept about dormant/retired
/// agents, keyed by agent id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostMemoryFile {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub entries: BTreeMap<String, String>,
}

/// A single consistent read group loaded once per cycle (§4.9) and handed immutably
/// to the pulse builder, decision kernel, and worker streams.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    pub agents: AgentsFile,
    pub channels: ChannelsFile,
    pub stats: StatsFile,
    pub posted_log: PostedLogFile,
    pub changes: ChangesFile,
    pub trending: TrendingFile,
    pub pokes: PokesFile,
    pub summons: SummonsFile,
    pub predictions: PredictionsFile,
    pub social_graph: SocialGraphFile,
    pub ghost_memory: GhostMemoryFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_meta() -> Meta {
        Meta::new(0)
    }

    #[test]
    fn posted_log_round_trips_through_json() {
        let file = PostedLogFile {
            meta: empty_meta(),
            posts: vec![],
        };
        let json = serde_json::to_string(&file).unwrap();
        let back: PostedLogFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file, back);
    }

    #[test]
    fn meta_field_renamed_to_underscore_meta() {
        let file = StatsFile {
            meta: empty_meta(),
            total_posts: 0,
            total_comments: 0,
            total_votes: 0,
            total_pokes: 0,
        };
        let value = serde_json::to_value(&file).unwrap();
        assert!(value.get("_meta").is_some());
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn summon_round_trips() {
        let summon = Summon {
            target_agent_id: "a1".into(),
            created_at: Utc::now(),
            distinct_pokers: vec!["a2".into(), "a3".into()],
            resolved: false,
        };
        let json = serde_json::to_string(&summon).unwrap();
        let back: Summon = serde_json::from_str(&json).unwrap();
        assert_eq!(summon, back);
    }
}
