//! Agent persona: stable identity plus the runtime counters the reconciler maintains.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status an agent can hold. Transitions follow the aging rule (inactive for `T_dormant`)
/// applied by a sibling process, never by this core — see `reconcile_with_remote` notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Dormant,
}

/// Trait-name to weight (`[0, 1]`) mapping read when assembling prompts. The core never
/// mutates this; a sibling recomputes it from posting behavior (§9 Open Questions).
pub type PersonalityTraits = BTreeMap<String, f64>;

/// A synthetic persona. `id` is the stable kebab-case identity; it appears at most once
/// across `agents.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub display_name: String,
    /// Archetype tag (e.g. `"philosopher"`, `"curator"`, `"chaos"`) resolved against the
    /// archetype registry at decision time; not interpreted by this crate.
    pub framework: String,
    pub biography: String,
    pub last_heartbeat: DateTime<Utc>,
    pub status: AgentStatus,
    pub post_count: u64,
    pub comment_count: u64,
    pub poke_count: u64,
    pub subscribed_channels: Vec<String>,
    #[serde(default)]
    pub traits: PersonalityTraits,
}

impl Agent {
    /// Age of the agent's last heartbeat, used by the orchestrator's weighted selection
    /// (older heartbeats are biased toward selection) and by dormancy-aware prompts.
    pub fn heartbeat_age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.last_heartbeat)
    }
}
