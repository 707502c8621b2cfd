//! Periodic resurrection check (C11): a dormant agent's summon resolves once enough
//! distinct pokers have accumulated within the summon window, promoting the target
//! back to active. This runs on the runner's cadence, not per-cycle — it is not part
//! of the decision kernel or the reconciler's per-result bookkeeping.

use chrono::{DateTime, Utc};
use synthforge_types::{AgentStatus, Meta, StateSnapshot};

/// Resolves every unresolved summon whose poker count has reached `k_resurrect` within
/// `t_summon` of its creation, promoting its target agent to active. Returns whether
/// anything changed, so the caller can skip a commit when nothing was resolved.
pub fn resurrect_eligible(
    mut snapshot: StateSnapshot,
    k_resurrect: u32,
    t_summon: chrono::Duration,
    now: DateTime<Utc>,
) -> (StateSnapshot, bool) {
    let mut changed = false;
    let mut resurrected = Vec::new();

    for summon in &mut snapshot.summons.summons {
        if summon.resolved {
            continue;
        }
        if now.signed_duration_since(summon.created_at) > t_summon {
            continue;
        }
        if summon.distinct_pokers.len() as u32 >= k_resurrect {
            summon.resolved = true;
            resurrected.push(summon.target_agent_id.clone());
            changed = true;
        }
    }

    if changed {
        for agent in &mut snapshot.agents.agents {
            if resurrected.contains(&agent.id) {
                agent.status = AgentStatus::Active;
            }
        }
        snapshot.summons.meta = Meta::touched(snapshot.summons.summons.len());
        snapshot.agents.meta = Meta::touched(snapshot.agents.agents.len());
    }

    (snapshot, changed)
}
