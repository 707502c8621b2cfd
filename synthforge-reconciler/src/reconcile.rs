//! Single-writer dispatch: `(snapshot, result_batch) -> new_snapshot`. Must be
//! commutative under interleaved result application — there is no per-result
//! ordering dependency except within a single agent's own counters, which a single
//! stream already serializes.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use synthforge_state::append_soul_line;
use synthforge_types::{
    ChangeEntry, ChangeKind, FailureKind, Meta, PokeEntry, ResultRecord, SkipReason, StateSnapshot,
    Summon,
};

use crate::error::ReconcileError;

/// Distinct pokers required within `T_summon` before a dormant target gets an active
/// summon record. Not named as a tunable in the specification's tunables table —
/// chosen here and recorded as an implementation decision.
const SUMMON_POKER_THRESHOLD: usize = 3;

fn failure_detail(reason: &SkipReason) -> String {
    match reason {
        SkipReason::DuplicateContent { similar_to_forge_id } => {
            format!("skipped: duplicate of post {similar_to_forge_id}")
        }
        SkipReason::Cancelled => "skipped: cycle cancelled".to_string(),
        SkipReason::Lurk => "skipped: decision kernel chose noop".to_string(),
        SkipReason::CapReached => "skipped: per-agent mutation cap reached".to_string(),
        SkipReason::DryRun => "skipped: dry run".to_string(),
    }
}

fn failure_kind_detail(failure: &FailureKind) -> String {
    match failure {
        FailureKind::LlmUnavailable { detail }
        | FailureKind::LlmMalformedOutput { detail }
        | FailureKind::ForgeRateLimited { detail }
        | FailureKind::ForgeTransient { detail }
        | FailureKind::ForgeAuth { detail }
        | FailureKind::Unknown { detail } => detail.clone(),
    }
}

/// Applies one cycle's result batch to `snapshot`, producing the new state and
/// appending soul-file lines as a side effect under `root`. Order of `results` does
/// not affect the outcome aside from soul-file line order.
#[allow(clippy::too_many_arguments)]
pub async fn reconcile(
    mut snapshot: StateSnapshot,
    results: &[ResultRecord],
    root: &Path,
    now: DateTime<Utc>,
    t_retain: Duration,
    t_summon: Duration,
) -> Result<StateSnapshot, ReconcileError> {
    for result in results {
        match result {
            ResultRecord::Created { agent_id, forge_id, channel, at } => {
                apply_created(&mut snapshot, agent_id, *forge_id, channel, *at);
                append_soul_line(root, agent_id, &format!("{at}: posted {forge_id} in {channel}")).await?;
            }
            ResultRecord::Commented { agent_id, target_forge_id, comment_forge_id, at } => {
                apply_commented(&mut snapshot, agent_id, *target_forge_id, *at);
                append_soul_line(
                    root,
                    agent_id,
                    &format!("{at}: commented {comment_forge_id} on {target_forge_id}"),
                )
                .await?;
            }
            ResultRecord::Voted { agent_id, target_forge_id, reaction, at } => {
                snapshot.stats.total_votes += 1;
                snapshot.changes.entries.push(ChangeEntry {
                    kind: ChangeKind::Voted,
                    agent_id: agent_id.clone(),
                    at: *at,
                    detail: format!("{reaction:?} on {target_forge_id}"),
                });
                // Per-post reaction counts are the forge's own and get refreshed on
                // the next snapshot read, not incremented here.
            }
            ResultRecord::Poked { agent_id, target_agent_id, at } => {
                apply_poked(&mut snapshot, agent_id, target_agent_id, *at, t_summon);
            }
            ResultRecord::Skipped { agent_id, reason, at } => {
                snapshot.changes.entries.push(ChangeEntry {
                    kind: ChangeKind::Failed,
                    agent_id: agent_id.clone(),
                    at: *at,
                    detail: failure_detail(reason),
                });
            }
            ResultRecord::Failed { agent_id, failure, at } => {
                snapshot.changes.entries.push(ChangeEntry {
                    kind: ChangeKind::Failed,
                    agent_id: agent_id.clone(),
                    at: *at,
                    detail: failure_kind_detail(failure),
                });
            }
        }
    }

    prune_changes(&mut snapshot, now, t_retain);
    touch_meta(&mut snapshot);
    Ok(snapshot)
}

fn apply_created(snapshot: &mut StateSnapshot, agent_id: &str, forge_id: u64, channel: &str, at: DateTime<Utc>) {
    if snapshot.posted_log.posts.iter().any(|p| p.forge_id == forge_id) {
        return;
    }
    snapshot.posted_log.posts.push(synthforge_types::PostMirror {
        forge_id,
        number: forge_id,
        title: String::new(),
        byline_agent_id: agent_id.to_string(),
        channel: channel.to_string(),
        created_at: at,
        reactions: Default::default(),
        comment_count: 0,
        metadata: None,
    });
    snapshot.stats.total_posts += 1;
    if let Some(c) = snapshot.channels.channels.iter_mut().find(|c| c.slug == channel) {
        c.post_count += 1;
    }
    if let Some(a) = snapshot.agents.agents.iter_mut().find(|a| a.id == agent_id) {
        a.post_count += 1;
    }
    snapshot.changes.entries.push(ChangeEntry {
        kind: ChangeKind::Created,
        agent_id: agent_id.to_string(),
        at,
        detail: format!("post {forge_id} in {channel}"),
    });
}

fn apply_commented(snapshot: &mut StateSnapshot, agent_id: &str, target_forge_id: u64, at: DateTime<Utc>) {
    snapshot.changes.entries.push(ChangeEntry {
        kind: ChangeKind::Commented,
        agent_id: agent_id.to_string(),
        at,
        detail: format!("commented on {target_forge_id}"),
    });
    snapshot.stats.total_comments += 1;
    if let Some(a) = snapshot.agents.agents.iter_mut().find(|a| a.id == agent_id) {
        a.comment_count += 1;
    }
    if let Some(target_author) = snapshot
        .posted_log
        .posts
        .iter()
        .find(|p| p.forge_id == target_forge_id)
        .map(|p| p.byline_agent_id.clone())
    {
        if target_author != agent_id {
            if let Some(edge) = snapshot
                .social_graph
                .edges
                .iter_mut()
                .find(|e| e.from_agent_id == agent_id && e.to_agent_id == target_author)
            {
                edge.weight += 1.0;
            } else {
                snapshot.social_graph.edges.push(synthforge_types::SocialGraphEdge {
                    from_agent_id: agent_id.to_string(),
                    to_agent_id: target_author,
                    weight: 1.0,
                });
            }
        }
    }
}

fn apply_poked(snapshot: &mut StateSnapshot, agent_id: &str, target_agent_id: &str, at: DateTime<Utc>, t_summon: Duration) {
    snapshot.changes.entries.push(ChangeEntry {
        kind: ChangeKind::Poked,
        agent_id: agent_id.to_string(),
        at,
        detail: format!("poked {target_agent_id}"),
    });
    snapshot.pokes.pokes.push(PokeEntry {
        poker_agent_id: agent_id.to_string(),
        target_agent_id: target_agent_id.to_string(),
        at,
    });

    let Some(target) = snapshot.agents.agents.iter().find(|a| a.id == target_agent_id) else {
        return;
    };
    if target.status != synthforge_types::AgentStatus::Dormant {
        return;
    }
    let already_summoned = snapshot
        .summons
        .summons
        .iter()
        .any(|s| s.target_agent_id == target_agent_id && !s.resolved);
    if already_summoned {
        return;
    }

    let window_start = at - t_summon;
    let mut distinct_pokers: Vec<String> = snapshot
        .pokes
        .pokes
        .iter()
        .filter(|p| p.target_agent_id == target_agent_id && p.at >= window_start)
        .map(|p| p.poker_agent_id.clone())
        .collect();
    distinct_pokers.sort();
    distinct_pokers.dedup();

    if distinct_pokers.len() >= SUMMON_POKER_THRESHOLD {
        snapshot.summons.summons.push(Summon {
            target_agent_id: target_agent_id.to_string(),
            created_at: at,
            distinct_pokers,
            resolved: false,
        });
    }
}

fn prune_changes(snapshot: &mut StateSnapshot, now: DateTime<Utc>, t_retain: Duration) {
    let cutoff = now - t_retain;
    snapshot.changes.entries.retain(|e| e.at >= cutoff);
}

fn touch_meta(snapshot: &mut StateSnapshot) {
    snapshot.agents.meta = Meta::touched(snapshot.agents.agents.len());
    snapshot.channels.meta = Meta::touched(snapshot.channels.channels.len());
    snapshot.stats.meta = Meta::touched(1);
    snapshot.posted_log.meta = Meta::touched(snapshot.posted_log.posts.len());
    snapshot.changes.meta = Meta::touched(snapshot.changes.entries.len());
    snapshot.trending.meta = Meta::touched(snapshot.trending.entries.len());
    snapshot.pokes.meta = Meta::touched(snapshot.pokes.pokes.len());
    snapshot.summons.meta = Meta::touched(snapshot.summons.summons.len());
    snapshot.predictions.meta = Meta::touched(snapshot.predictions.predictions.len());
    snapshot.social_graph.meta = Meta::touched(snapshot.social_graph.edges.len());
    snapshot.ghost_memory.meta = Meta::touched(snapshot.ghost_memory.entries.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthforge_types::{
        AgentsFile, ChangesFile, Channel, ChannelsFile, GhostMemoryFile, PokesFile, PredictionsFile,
        SocialGraphFile, StatsFile, SummonsFile, TrendingFile,
    };
    use synthforge_types::{Agent, AgentStatus, PersonalityTraits};

    fn agent(id: &str, status: AgentStatus) -> Agent {
        Agent {
            id: id.to_string(),
            display_name: id.to_string(),
            framework: "curator".into(),
            biography: "".into(),
            last_heartbeat: Utc::now(),
            status,
            post_count: 0,
            comment_count: 0,
            poke_count: 0,
            subscribed_channels: vec![],
            traits: PersonalityTraits::new(),
        }
    }

    fn empty_snapshot() -> StateSnapshot {
        StateSnapshot {
            agents: AgentsFile { meta: Meta::new(0), agents: vec![] },
            channels: ChannelsFile { meta: Meta::new(0), channels: vec![] },
            stats: StatsFile { meta: Meta::new(1), total_posts: 0, total_comments: 0, total_votes: 0, total_pokes: 0 },
            posted_log: synthforge_types::PostedLogFile { meta: Meta::new(0), posts: vec![] },
            changes: ChangesFile { meta: Meta::new(0), entries: vec![] },
            trending: TrendingFile { meta: Meta::new(0), entries: vec![] },
            pokes: PokesFile { meta: Meta::new(0), pokes: vec![] },
            summons: SummonsFile { meta: Meta::new(0), summons: vec![] },
            predictions: PredictionsFile { meta: Meta::new(0), predictions: vec![] },
            social_graph: SocialGraphFile { meta: Meta::new(0), edges: vec![] },
            ghost_memory: GhostMemoryFile { meta: Meta::new(0), entries: Default::default() },
        }
    }

    #[tokio::test]
    async fn created_increments_stats_and_channel_and_author_counters() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = empty_snapshot();
        snapshot.channels.channels.push(Channel {
            slug: "code".into(),
            name: "Code".into(),
            description: "".into(),
            target_ratio: 1.0,
            post_count: 0,
        });
        snapshot.agents.agents.push(agent("a1", AgentStatus::Active));

        let results = vec![ResultRecord::Created {
            agent_id: "a1".into(),
            forge_id: 1,
            channel: "code".into(),
            at: Utc::now(),
        }];
        let out = reconcile(snapshot, &results, dir.path(), Utc::now(), Duration::days(30), Duration::days(1))
            .await
            .unwrap();
        assert_eq!(out.stats.total_posts, 1);
        assert_eq!(out.channels.channels[0].post_count, 1);
        assert_eq!(out.agents.agents[0].post_count, 1);
        assert_eq!(out.posted_log.posts.len(), 1);
    }

    #[tokio::test]
    async fn poke_creates_summon_once_three_distinct_pokers_reached() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = empty_snapshot();
        snapshot.agents.agents.push(agent("dormant-1", AgentStatus::Dormant));

        let results = vec![
            ResultRecord::Poked { agent_id: "p1".into(), target_agent_id: "dormant-1".into(), at: Utc::now() },
            ResultRecord::Poked { agent_id: "p2".into(), target_agent_id: "dormant-1".into(), at: Utc::now() },
            ResultRecord::Poked { agent_id: "p3".into(), target_agent_id: "dormant-1".into(), at: Utc::now() },
        ];
        let out = reconcile(snapshot, &results, dir.path(), Utc::now(), Duration::days(30), Duration::days(1))
            .await
            .unwrap();
        assert_eq!(out.pokes.pokes.len(), 3);
        assert_eq!(out.summons.summons.len(), 1);
        assert!(!out.summons.summons[0].resolved);
    }

    #[tokio::test]
    async fn pokes_outside_the_summon_window_do_not_count_toward_the_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let mut snapshot = empty_snapshot();
        snapshot.agents.agents.push(agent("dormant-1", AgentStatus::Dormant));
        snapshot.pokes.pokes.push(PokeEntry {
            poker_agent_id: "stale-1".into(),
            target_agent_id: "dormant-1".into(),
            at: now - Duration::days(2),
        });
        snapshot.pokes.pokes.push(PokeEntry {
            poker_agent_id: "stale-2".into(),
            target_agent_id: "dormant-1".into(),
            at: now - Duration::days(2),
        });

        let results = vec![ResultRecord::Poked { agent_id: "p1".into(), target_agent_id: "dormant-1".into(), at: now }];
        let out = reconcile(snapshot, &results, dir.path(), now, Duration::days(30), Duration::days(1))
            .await
            .unwrap();
        assert_eq!(out.pokes.pokes.len(), 3);
        assert!(out.summons.summons.is_empty());
    }

    #[tokio::test]
    async fn failed_and_skipped_results_leave_counters_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = empty_snapshot();
        snapshot.agents.agents.push(agent("a1", AgentStatus::Active));
        let results = vec![
            ResultRecord::Failed {
                agent_id: "a1".into(),
                failure: FailureKind::ForgeRateLimited { detail: "429".into() },
                at: Utc::now(),
            },
            ResultRecord::Skipped {
                agent_id: "a1".into(),
                reason: SkipReason::Lurk,
                at: Utc::now(),
            },
        ];
        let out = reconcile(snapshot, &results, dir.path(), Utc::now(), Duration::days(30), Duration::days(1))
            .await
            .unwrap();
        assert_eq!(out.stats.total_posts, 0);
        assert_eq!(out.agents.agents[0].post_count, 0);
        assert_eq!(out.changes.entries.len(), 2);
    }

    #[tokio::test]
    async fn changes_older_than_retain_window_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = empty_snapshot();
        let now = Utc::now();
        snapshot.changes.entries.push(ChangeEntry {
            kind: ChangeKind::Failed,
            agent_id: "a1".into(),
            at: now - Duration::days(60),
            detail: "ancient".into(),
        });
        let out = reconcile(snapshot, &[], dir.path(), now, Duration::days(30), Duration::days(1))
            .await
            .unwrap();
        assert!(out.changes.entries.is_empty());
    }

    #[tokio::test]
    async fn empty_result_batch_is_a_noop_modulo_meta() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = empty_snapshot();
        snapshot.agents.agents.push(agent("a1", AgentStatus::Active));
        let before = snapshot.clone();
        let out = reconcile(snapshot, &[], dir.path(), Utc::now(), Duration::days(30), Duration::days(1))
            .await
            .unwrap();
        assert_eq!(out.agents.agents, before.agents.agents);
        assert_eq!(out.stats.total_posts, before.stats.total_posts);
    }
}
