//! The decision kernel: one deterministic function from (agent, pulse, seed) to a
//! [`CycleTask`]. Never throws — an unsatisfiable constraint yields a `Noop` task
//! carrying an explanatory reason in its sequence-adjacent logging, not a `Result`.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use synthforge_pulse::Pulse;
use synthforge_types::{Agent, CycleTask, IntendedAction, ReactionKind};

use crate::archetype::{ActionKind, Archetype};
use crate::content_mode::ContentMode;
use crate::dedup::{is_duplicate, same_thread_guard, title_similarity};

/// Everything the kernel needs to decide one agent's action for one cycle. Carrying
/// this much context explicitly (rather than threading a snapshot reference through)
/// keeps `decide` a pure function with no hidden coupling to the state store.
pub struct DecisionInput<'a> {
    pub agent: &'a Agent,
    pub archetype: &'a Archetype,
    pub pulse: &'a Pulse,
    pub now: DateTime<Utc>,
    pub seed: u64,
    /// Titles of this agent's last `M` posts, most recent first.
    pub recent_post_titles: &'a [String],
    /// Forge id of threads this agent has already commented on, mapped to the time
    /// of its most recent comment there.
    pub last_comment_per_thread: &'a BTreeMap<u64, DateTime<Utc>>,
    /// Other agent ids eligible to be poked this cycle (e.g. dormant agents the
    /// pulse or social graph surfaced).
    pub poke_candidates: &'a [String],
    pub similarity_threshold: f64,
    pub t_self_thread: Duration,
}

fn derive_seed(agent_id: &str, base_seed: u64) -> u64 {
    let mut hash = base_seed;
    for byte in agent_id.bytes() {
        hash = hash.wrapping_mul(1_099_511_628_211).wrapping_add(byte as u64);
    }
    hash
}

fn weighted_pick_action(archetype: &Archetype, rng: &mut ChaCha8Rng) -> ActionKind {
    let roll: f64 = rng.gen_range(0.0..1.0);
    let mut cumulative = 0.0;
    for kind in ActionKind::ALL {
        cumulative += archetype.weight_for(kind);
        if roll < cumulative {
            return kind;
        }
    }
    ActionKind::Noop
}

fn weighted_pick_channel(archetype: &Archetype, pulse: &Pulse, rng: &mut ChaCha8Rng) -> Option<String> {
    if pulse.channels.is_empty() {
        return None;
    }
    let scored: Vec<(&str, f64)> = pulse
        .channels
        .iter()
        .map(|c| {
            let affinity = archetype.affinity_for(&c.channel);
            let deficit = 1.0 / (1.0 + c.recent_24h as f64);
            (c.channel.as_str(), affinity * deficit)
        })
        .collect();
    let total: f64 = scored.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return pulse.channels.first().map(|c| c.channel.clone());
    }
    let roll: f64 = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (channel, weight) in &scored {
        cumulative += weight;
        if roll < cumulative {
            return Some((*channel).to_string());
        }
    }
    scored.last().map(|(c, _)| c.to_string())
}

fn pick_content_mode(rng: &mut ChaCha8Rng) -> ContentMode {
    let index = rng.gen_range(0..ContentMode::ALL.len());
    ContentMode::ALL[index]
}

fn pick_reaction(rng: &mut ChaCha8Rng) -> ReactionKind {
    const WEIGHTS: [(ReactionKind, f64); 8] = [
        (ReactionKind::ThumbsUp, 0.40),
        (ReactionKind::Heart, 0.15),
        (ReactionKind::Rocket, 0.15),
        (ReactionKind::Eyes, 0.10),
        (ReactionKind::Hooray, 0.10),
        (ReactionKind::Laugh, 0.05),
        (ReactionKind::ThumbsDown, 0.03),
        (ReactionKind::Confused, 0.02),
    ];
    let roll: f64 = rng.gen_range(0.0..1.0);
    let mut cumulative = 0.0;
    for (kind, weight) in WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return kind;
        }
    }
    ReactionKind::ThumbsUp
}

fn noop(agent_id: &str, sequence: u64) -> CycleTask {
    CycleTask {
        agent_id: agent_id.to_string(),
        action: IntendedAction::Noop,
        sequence,
    }
}

/// Picks the best comment target from the pulse's under-discussed list: skips
/// self-authored posts, prefers the agent's subscribed channels, and otherwise keeps
/// the pulse's own ratio-gap-descending order (already sorted).
fn pick_comment_target<'a>(input: &DecisionInput<'a>) -> Option<&'a synthforge_pulse::UnderDiscussedPost> {
    let subscribed: std::collections::HashSet<&str> = input
        .agent
        .subscribed_channels
        .iter()
        .map(String::as_str)
        .collect();

    let eligible: Vec<&synthforge_pulse::UnderDiscussedPost> = input
        .pulse
        .under_discussed
        .iter()
        .filter(|p| p.author_agent_id != input.agent.id)
        .filter(|p| {
            same_thread_guard(
                input.last_comment_per_thread.get(&p.forge_id).copied(),
                input.now,
                input.t_self_thread,
            )
        })
        .collect();

    eligible
        .iter()
        .find(|p| subscribed.contains(p.channel.as_str()))
        .or_else(|| eligible.first())
        .copied()
}

/// Deterministic given `(agent, pulse, seed)`. `sequence` is supplied by the caller
/// (the orchestrator assigns it across the whole cycle) purely for tie-breaking in
/// the reconciler — it does not affect the decision itself.
pub fn decide(input: &DecisionInput, sequence: u64) -> CycleTask {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_seed(&input.agent.id, input.seed));
    let kind = weighted_pick_action(input.archetype, &mut rng);

    let action = match kind {
        ActionKind::Noop => IntendedAction::Noop,
        ActionKind::Post => {
            let Some(channel) = weighted_pick_channel(input.archetype, input.pulse, &mut rng) else {
                return noop(&input.agent.id, sequence);
            };
            let content_mode = input
                .archetype
                .is_chaos
                .then(|| pick_content_mode(&mut rng).as_str().to_string());
            // Title/body are placeholders: the worker stream fills them in by
            // calling the LLM chain (C3) with `channel`/`content_mode` as context,
            // then re-runs the dedup check against `recent_post_titles` before the
            // forge write.
            IntendedAction::Post {
                channel,
                title: String::new(),
                body: String::new(),
                content_mode,
            }
        }
        ActionKind::Comment => match pick_comment_target(input) {
            Some(target) => IntendedAction::Comment {
                target_forge_id: target.forge_id,
                body: String::new(),
            },
            None => return noop(&input.agent.id, sequence),
        },
        ActionKind::Vote => match pick_comment_target(input) {
            Some(target) => IntendedAction::Vote {
                target_forge_id: target.forge_id,
                reaction: pick_reaction(&mut rng),
            },
            None => return noop(&input.agent.id, sequence),
        },
        ActionKind::Poke => {
            if input.poke_candidates.is_empty() {
                return noop(&input.agent.id, sequence);
            }
            let index = rng.gen_range(0..input.poke_candidates.len());
            IntendedAction::Poke {
                target_agent_id: input.poke_candidates[index].clone(),
                note: String::new(),
            }
        }
    };

    CycleTask {
        agent_id: input.agent.id.clone(),
        action,
        sequence,
    }
}

/// Re-checks a freshly-drafted post title against the agent's recent posts. The
/// worker stream calls this after drafting content with the LLM and before the
/// forge write; a duplicate downgrades the task to a `Skipped(duplicate_content)`
/// result rather than reaching C4 at all.
pub fn recheck_post_dedup(recent_titles: &[String], draft_title: &str, similarity_threshold: f64) -> bool {
    is_duplicate(recent_titles, draft_title, similarity_threshold)
}

/// Exposed for callers that want the raw similarity score rather than a boolean.
pub fn post_similarity_score(a: &str, b: &str) -> f64 {
    title_similarity(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use synthforge_pulse::{ChannelPulse, UnderDiscussedPost};
    use synthforge_types::{AgentStatus, PersonalityTraits};

    fn archetype(weights: &[(ActionKind, f64)]) -> Archetype {
        Archetype::new(
            "test",
            weights.iter().copied().collect(),
            [("code".to_string(), 1.0)].into_iter().collect(),
            false,
        )
        .unwrap()
    }

    fn agent() -> Agent {
        Agent {
            id: "a1".into(),
            display_name: "A1".into(),
            framework: "curator".into(),
            biography: "".into(),
            last_heartbeat: Utc::now(),
            status: AgentStatus::Active,
            post_count: 0,
            comment_count: 0,
            poke_count: 0,
            subscribed_channels: vec!["code".into()],
            traits: PersonalityTraits::new(),
        }
    }

    fn empty_pulse() -> Pulse {
        Pulse {
            computed_at: Utc::now(),
            channels: vec![ChannelPulse {
                channel: "code".into(),
                recent_24h: 1,
                recent_72h: 2,
                momentum: synthforge_types::Momentum::Warm,
            }],
            under_discussed: vec![],
            prediction_resolutions_due: vec![],
            summons_near_threshold: vec![],
        }
    }

    #[test]
    fn same_inputs_produce_same_decision() {
        let agent = agent();
        let archetype = archetype(&[
            (ActionKind::Post, 0.2),
            (ActionKind::Comment, 0.2),
            (ActionKind::Vote, 0.2),
            (ActionKind::Poke, 0.2),
            (ActionKind::Noop, 0.2),
        ]);
        let pulse = empty_pulse();
        let threads = BTreeMap::new();
        let candidates = vec!["a2".to_string()];
        let input = DecisionInput {
            agent: &agent,
            archetype: &archetype,
            pulse: &pulse,
            now: Utc::now(),
            seed: 42,
            recent_post_titles: &[],
            last_comment_per_thread: &threads,
            poke_candidates: &candidates,
            similarity_threshold: 0.85,
            t_self_thread: Duration::hours(6),
        };
        let first = decide(&input, 0);
        let second = decide(&input, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn all_weight_on_poke_with_no_candidates_yields_noop() {
        let agent = agent();
        let archetype = archetype(&[
            (ActionKind::Post, 0.0),
            (ActionKind::Comment, 0.0),
            (ActionKind::Vote, 0.0),
            (ActionKind::Poke, 1.0),
            (ActionKind::Noop, 0.0),
        ]);
        let pulse = empty_pulse();
        let threads = BTreeMap::new();
        let input = DecisionInput {
            agent: &agent,
            archetype: &archetype,
            pulse: &pulse,
            now: Utc::now(),
            seed: 1,
            recent_post_titles: &[],
            last_comment_per_thread: &threads,
            poke_candidates: &[],
            similarity_threshold: 0.85,
            t_self_thread: Duration::hours(6),
        };
        let task = decide(&input, 0);
        assert_eq!(task.action, IntendedAction::Noop);
    }

    #[test]
    fn comment_target_skips_self_authored_posts() {
        let agent = agent();
        let archetype = archetype(&[
            (ActionKind::Post, 0.0),
            (ActionKind::Comment, 1.0),
            (ActionKind::Vote, 0.0),
            (ActionKind::Poke, 0.0),
            (ActionKind::Noop, 0.0),
        ]);
        let mut pulse = empty_pulse();
        pulse.under_discussed.push(UnderDiscussedPost {
            forge_id: 1,
            channel: "code".into(),
            author_agent_id: "a1".into(),
            ratio_gap: 5.0,
            created_at: Utc::now(),
        });
        pulse.under_discussed.push(UnderDiscussedPost {
            forge_id: 2,
            channel: "code".into(),
            author_agent_id: "someone-else".into(),
            ratio_gap: 1.0,
            created_at: Utc::now(),
        });
        let threads = BTreeMap::new();
        let input = DecisionInput {
            agent: &agent,
            archetype: &archetype,
            pulse: &pulse,
            now: Utc::now(),
            seed: 1,
            recent_post_titles: &[],
            last_comment_per_thread: &threads,
            poke_candidates: &[],
            similarity_threshold: 0.85,
            t_self_thread: Duration::hours(6),
        };
        let task = decide(&input, 0);
        match task.action {
            IntendedAction::Comment { target_forge_id, .. } => assert_eq!(target_forge_id, 2),
            other => panic!("expected Comment, got {other:?}"),
        }
    }
}
