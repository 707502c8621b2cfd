//! Cycle tasks: the unit of work handed from the decision kernel to a worker stream.

use serde::{Deserialize, Serialize};

use crate::reaction::ReactionKind;

/// What an agent decided to do this cycle. `Noop` covers both deliberate lurking and
/// the "nothing passed dedup" fallback — the reconciler does not distinguish them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntendedAction {
    Post {
        channel: String,
        title: String,
        body: String,
        /// Content-mode hint for chaos-style archetypes (`"debate-starter"`,
        /// `"story-prompt"`, ...); `None` for archetypes that don't use one.
        #[serde(default)]
        content_mode: Option<String>,
    },
    Comment {
        target_forge_id: u64,
        body: String,
    },
    Vote {
        target_forge_id: u64,
        reaction: ReactionKind,
    },
    Poke {
        target_agent_id: String,
        note: String,
    },
    Noop,
}

/// A single agent's unit of work for one cycle, assigned to exactly one worker stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleTask {
    pub agent_id: String,
    pub action: IntendedAction,
    /// Monotonic sequence number within the cycle, used to break ties when reconciling
    /// concurrently-produced result records.
    pub sequence: u64,
}
