//! The per-cycle pipeline (C8): load, pulse, decide, dispatch, reconcile, commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use synthforge_commit::{CommitOutcome, SafeCommitProtocol};
use synthforge_decision::{decide, ArchetypeRegistry, DecisionInput};
use synthforge_forge::ForgeClient;
use synthforge_llm::ProviderChain;
use synthforge_pulse::build_pulse;
use synthforge_reconciler::reconcile;
use synthforge_state::StateStore;
use synthforge_types::{Agent, ChangeEntry, ChangeKind, ResultRecord};
use synthforge_worker::{partition_tasks, run_stream, WorkerContext};

use crate::error::CycleError;
use crate::selection::select_agents;
use crate::snapshot_files::{snapshot_to_file_changes, validate_state_file};

#[derive(Clone, Debug)]
pub struct CycleConfig {
    pub streams: usize,
    pub agents_per_cycle: usize,
    pub seed: u64,
    pub similarity_threshold: f64,
    pub dedup_recent_posts: usize,
    pub t_self_thread: Duration,
    pub recent_window: Duration,
    pub k_resurrect: usize,
    pub t_retain: Duration,
    pub t_summon: Duration,
    /// `--no-push`: C9 still reconciles and writes local state, but C10 never runs.
    pub skip_push: bool,
}

#[derive(Debug)]
pub struct CycleOutcome {
    pub results: Vec<ResultRecord>,
    pub commit: CommitOutcome,
}

/// Last M titles an agent has posted, most recent first, paired with their forge id
/// for the worker stream's post-draft dedup recheck.
fn recent_titles_by_agent(
    posts: &[synthforge_types::PostMirror],
    agent_ids: &[String],
    limit: usize,
) -> BTreeMap<String, Vec<(u64, String)>> {
    let mut out = BTreeMap::new();
    for agent_id in agent_ids {
        let mut mine: Vec<&synthforge_types::PostMirror> =
            posts.iter().filter(|p| &p.byline_agent_id == agent_id).collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let titles = mine.into_iter().take(limit).map(|p| (p.forge_id, p.title.clone())).collect();
        out.insert(agent_id.clone(), titles);
    }
    out
}

/// Rebuilds each selected agent's last-comment-per-thread map from the change log.
/// Relies on [`synthforge_reconciler::reconcile`]'s own "commented on {id}" detail
/// format for `Commented` entries — an accepted shortcut in place of a dedicated
/// per-agent comment-thread index.
fn last_comment_per_thread(changes: &[ChangeEntry], agent_id: &str) -> BTreeMap<u64, DateTime<Utc>> {
    let mut out = BTreeMap::new();
    for entry in changes {
        if entry.kind != ChangeKind::Commented || entry.agent_id != agent_id {
            continue;
        }
        if let Some(forge_id) = entry.detail.strip_prefix("commented on ").and_then(|s| s.parse::<u64>().ok()) {
            out.entry(forge_id).and_modify(|at| if entry.at > *at { *at = entry.at }).or_insert(entry.at);
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
#[instrument(skip_all)]
pub async fn run_cycle(
    store: &StateStore,
    forge: Arc<dyn ForgeClient>,
    llm: Arc<ProviderChain>,
    commit_protocol: Arc<SafeCommitProtocol>,
    commit_token: String,
    registry: &ArchetypeRegistry,
    config: &CycleConfig,
    cancellation: CancellationToken,
    now: DateTime<Utc>,
) -> Result<CycleOutcome, CycleError> {
    let snapshot = store.load_snapshot().await?;
    let pulse = Arc::new(build_pulse(&snapshot, now, config.recent_window, config.k_resurrect));

    let agents: Arc<BTreeMap<String, Agent>> =
        Arc::new(snapshot.agents.agents.iter().map(|a| (a.id.clone(), a.clone())).collect());

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let selected = select_agents(&snapshot.agents.agents, config.agents_per_cycle, now, &mut rng);
    info!(selected = selected.len(), "selected agents for cycle");

    for agent_id in &selected {
        if let Err(error) = forge.emit_issue("heartbeat", json!({}), agent_id).await {
            warn!(%agent_id, %error, "heartbeat emission failed, continuing cycle");
        }
    }

    let dormant: Vec<String> = snapshot
        .agents
        .agents
        .iter()
        .filter(|a| a.status == synthforge_types::AgentStatus::Dormant)
        .map(|a| a.id.clone())
        .collect();

    let recent_titles = recent_titles_by_agent(&snapshot.posted_log.posts, &selected, config.dedup_recent_posts);

    let mut tasks = Vec::with_capacity(selected.len());
    for (sequence, agent_id) in selected.iter().enumerate() {
        let Some(agent) = agents.get(agent_id) else { continue };
        let archetype = registry.resolve(&agent.framework);
        let own_titles: Vec<String> = recent_titles
            .get(agent_id)
            .map(|v| v.iter().map(|(_, title)| title.clone()).collect())
            .unwrap_or_default();
        let comment_history = last_comment_per_thread(&snapshot.changes.entries, agent_id);
        let poke_candidates: Vec<String> = dormant.iter().filter(|id| *id != agent_id).cloned().collect();

        let input = DecisionInput {
            agent,
            archetype,
            pulse: &pulse,
            now,
            seed: config.seed,
            recent_post_titles: &own_titles,
            last_comment_per_thread: &comment_history,
            poke_candidates: &poke_candidates,
            similarity_threshold: config.similarity_threshold,
            t_self_thread: config.t_self_thread,
        };
        tasks.push(decide(&input, sequence as u64));
    }

    let partitions = partition_tasks(tasks, config.streams.max(1));
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();

    let mut handles = Vec::with_capacity(partitions.len());
    for (stream_id, stream_tasks) in partitions.into_iter().enumerate() {
        let ctx = WorkerContext {
            stream_id,
            llm: llm.clone(),
            forge: forge.clone(),
            pulse: pulse.clone(),
            agents: agents.clone(),
            cancellation: cancellation.clone(),
            similarity_threshold: config.similarity_threshold,
        };
        let recent_titles = recent_titles.clone();
        let results_tx = results_tx.clone();
        handles.push(tokio::spawn(async move {
            run_stream(stream_tasks, &ctx, &recent_titles, results_tx).await;
        }));
    }
    drop(results_tx);

    let mut results = Vec::new();
    while let Some(record) = results_rx.recv().await {
        results.push(record);
    }
    for handle in handles {
        let _ = handle.await;
    }

    let updated_snapshot = reconcile(snapshot, &results, store.root(), now, config.t_retain, config.t_summon).await?;
    store.write_snapshot(&updated_snapshot).await?;

    let commit = if config.skip_push {
        CommitOutcome::NothingToCommit
    } else {
        let files = snapshot_to_file_changes(&updated_snapshot);
        let message = format!("cycle {now}: {} tasks", results.len());
        tokio::task::spawn_blocking(move || {
            commit_protocol.safe_commit(&files, &message, commit_token, &validate_state_file)
        })
        .await
        .expect("safe-commit task panicked")?
    };

    Ok(CycleOutcome { results, commit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthforge_types::PostMirror;

    fn post(forge_id: u64, author: &str, title: &str, at: DateTime<Utc>) -> PostMirror {
        PostMirror {
            forge_id,
            number: forge_id,
            title: title.to_string(),
            byline_agent_id: author.to_string(),
            channel: "general".into(),
            created_at: at,
            reactions: Default::default(),
            comment_count: 0,
            metadata: None,
        }
    }

    #[test]
    fn recent_titles_by_agent_ignores_other_authors_and_respects_limit() {
        let now = Utc::now();
        let posts = vec![
            post(1, "a1", "first", now - Duration::hours(3)),
            post(2, "a1", "second", now - Duration::hours(2)),
            post(3, "a1", "third", now - Duration::hours(1)),
            post(4, "a2", "other author", now),
        ];
        let out = recent_titles_by_agent(&posts, &["a1".to_string()], 2);
        let titles: Vec<&str> = out["a1"].iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(titles, vec!["third", "second"]);
    }

    #[test]
    fn last_comment_per_thread_parses_only_this_agents_commented_entries() {
        let now = Utc::now();
        let changes = vec![
            ChangeEntry { kind: ChangeKind::Commented, agent_id: "a1".into(), at: now, detail: "commented on 42".into() },
            ChangeEntry { kind: ChangeKind::Commented, agent_id: "a2".into(), at: now, detail: "commented on 99".into() },
            ChangeEntry { kind: ChangeKind::Created, agent_id: "a1".into(), at: now, detail: "post 1 in general".into() },
        ];
        let out = last_comment_per_thread(&changes, "a1");
        assert_eq!(out.len(), 1);
        assert!(out.contains_key(&42));
    }

    #[test]
    fn last_comment_per_thread_keeps_the_latest_timestamp_per_forge_id() {
        let now = Utc::now();
        let changes = vec![
            ChangeEntry { kind: ChangeKind::Commented, agent_id: "a1".into(), at: now - Duration::hours(2), detail: "commented on 7".into() },
            ChangeEntry { kind: ChangeKind::Commented, agent_id: "a1".into(), at: now, detail: "commented on 7".into() },
        ];
        let out = last_comment_per_thread(&changes, "a1");
        assert_eq!(out[&7], now);
    }
}
