//! The worker stream: consumes one partition of a cycle's task set and emits a
//! [`ResultRecord`] per task.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use synthforge_decision::post_similarity_score;
use synthforge_forge::ForgeClient;
use synthforge_llm::ProviderChain;
use synthforge_pulse::Pulse;
use synthforge_types::{Agent, CycleTask, FailureKind, IntendedAction, ResultRecord, SkipReason};

use crate::failure::{from_chain_error, from_forge_error};
use crate::prompt::{comment_prompt, poke_prompt, post_prompt};

/// A post title similar enough to count as a duplicate. Matches the decision
/// kernel's default but is not itself configurable per-task; a fresh dedup recheck
/// happens here because drafted content — not the decision kernel's placeholder — is
/// what actually gets compared.
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Everything a stream needs that is shared read-only across every stream in a cycle.
pub struct WorkerContext {
    pub stream_id: usize,
    pub llm: Arc<ProviderChain>,
    pub forge: Arc<dyn ForgeClient>,
    pub pulse: Arc<Pulse>,
    pub agents: Arc<BTreeMap<String, Agent>>,
    pub cancellation: CancellationToken,
    pub similarity_threshold: f64,
}

impl WorkerContext {
    pub fn agent(&self, agent_id: &str) -> Option<&Agent> {
        self.agents.get(agent_id)
    }
}

fn find_duplicate(recent: &[(u64, String)], candidate: &str, threshold: f64) -> Option<u64> {
    recent
        .iter()
        .find(|(_, title)| post_similarity_score(title, candidate) >= threshold)
        .map(|(forge_id, _)| *forge_id)
}

fn skipped(agent_id: &str, reason: SkipReason, now: DateTime<Utc>) -> ResultRecord {
    ResultRecord::Skipped {
        agent_id: agent_id.to_string(),
        reason,
        at: now,
    }
}

fn failed(agent_id: &str, failure: FailureKind, now: DateTime<Utc>) -> ResultRecord {
    ResultRecord::Failed {
        agent_id: agent_id.to_string(),
        failure,
        at: now,
    }
}

/// Runs every task in `tasks` against `ctx`, sending one [`ResultRecord`] per task to
/// `results`. `recent_titles` maps agent id to that agent's last `M` posts
/// (forge id, title) for the post-draft dedup recheck.
#[instrument(skip_all, fields(stream_id = ctx.stream_id, tasks = tasks.len()))]
pub async fn run_stream(
    tasks: Vec<CycleTask>,
    ctx: &WorkerContext,
    recent_titles: &BTreeMap<String, Vec<(u64, String)>>,
    results: UnboundedSender<ResultRecord>,
) {
    for task in tasks {
        if ctx.cancellation.is_cancelled() {
            let _ = results.send(skipped(&task.agent_id, SkipReason::Cancelled, Utc::now()));
            continue;
        }
        let record = run_task(&task, ctx, recent_titles).await;
        if results.send(record).is_err() {
            warn!("result channel closed, stream exiting early");
            return;
        }
    }
}

#[instrument(skip(ctx, recent_titles), fields(agent_id = %task.agent_id))]
async fn run_task(
    task: &CycleTask,
    ctx: &WorkerContext,
    recent_titles: &BTreeMap<String, Vec<(u64, String)>>,
) -> ResultRecord {
    let now = Utc::now();
    let Some(agent) = ctx.agent(&task.agent_id) else {
        return failed(
            &task.agent_id,
            FailureKind::Unknown {
                detail: "agent missing from loaded snapshot".to_string(),
            },
            now,
        );
    };

    match &task.action {
        IntendedAction::Noop => skipped(&task.agent_id, SkipReason::Lurk, now),
        IntendedAction::Post { channel, content_mode, .. } => {
            run_post(agent, channel, content_mode.as_deref(), ctx, recent_titles).await
        }
        IntendedAction::Comment { target_forge_id, .. } => run_comment(agent, *target_forge_id, ctx).await,
        IntendedAction::Vote { target_forge_id, reaction } => run_vote(agent, *target_forge_id, *reaction, ctx).await,
        IntendedAction::Poke { target_agent_id, .. } => run_poke(agent, target_agent_id, ctx).await,
    }
}

async fn run_post(
    agent: &Agent,
    channel: &str,
    content_mode: Option<&str>,
    ctx: &WorkerContext,
    recent_titles: &BTreeMap<String, Vec<(u64, String)>>,
) -> ResultRecord {
    let now = Utc::now();
    let prompt = post_prompt(agent, channel, content_mode);
    let response = match ctx.llm.generate(&prompt).await {
        Ok(response) => response,
        Err(error) => return failed(&agent.id, from_chain_error(error), now),
    };
    let Some(parsed) = response.parsed else {
        return failed(
            &agent.id,
            FailureKind::LlmMalformedOutput {
                detail: "post draft response carried no parsed JSON".to_string(),
            },
            now,
        );
    };
    let title = parsed["title"].as_str().unwrap_or_default();
    let body = parsed["body"].as_str().unwrap_or_default();

    let empty = Vec::new();
    let own_recent = recent_titles.get(&agent.id).unwrap_or(&empty);
    if let Some(similar_to_forge_id) = find_duplicate(own_recent, title, ctx.similarity_threshold) {
        return skipped(
            &agent.id,
            SkipReason::DuplicateContent { similar_to_forge_id },
            now,
        );
    }

    match ctx.forge.create_discussion(channel, title, body, &agent.id).await {
        Ok(mirror) => {
            info!(forge_id = mirror.forge_id, channel, "post created");
            ResultRecord::Created {
                agent_id: agent.id.clone(),
                forge_id: mirror.forge_id,
                channel: channel.to_string(),
                at: now,
            }
        }
        Err(error) => failed(&agent.id, from_forge_error(error), now),
    }
}

async fn run_comment(agent: &Agent, target_forge_id: u64, ctx: &WorkerContext) -> ResultRecord {
    let now = Utc::now();
    let thread_context = ctx
        .pulse
        .under_discussed
        .iter()
        .find(|p| p.forge_id == target_forge_id)
        .map(|p| format!("channel {}, ratio gap {:.2}", p.channel, p.ratio_gap))
        .unwrap_or_else(|| format!("forge id {target_forge_id}"));

    let prompt = comment_prompt(agent, &thread_context);
    let response = match ctx.llm.generate(&prompt).await {
        Ok(response) => response,
        Err(error) => return failed(&agent.id, from_chain_error(error), now),
    };
    let Some(parsed) = response.parsed else {
        return failed(
            &agent.id,
            FailureKind::LlmMalformedOutput {
                detail: "comment draft response carried no parsed JSON".to_string(),
            },
            now,
        );
    };
    let body = parsed["body"].as_str().unwrap_or_default();

    match ctx.forge.add_comment(target_forge_id, body, &agent.id).await {
        Ok(comment_ref) => ResultRecord::Commented {
            agent_id: agent.id.clone(),
            target_forge_id,
            comment_forge_id: comment_ref.forge_id,
            at: now,
        },
        Err(error) => failed(&agent.id, from_forge_error(error), now),
    }
}

async fn run_vote(
    agent: &Agent,
    target_forge_id: u64,
    reaction: synthforge_types::ReactionKind,
    ctx: &WorkerContext,
) -> ResultRecord {
    let now = Utc::now();
    match ctx.forge.add_reaction(target_forge_id, reaction).await {
        Ok(()) => ResultRecord::Voted {
            agent_id: agent.id.clone(),
            target_forge_id,
            reaction,
            at: now,
        },
        Err(error) => failed(&agent.id, from_forge_error(error), now),
    }
}

async fn run_poke(agent: &Agent, target_agent_id: &str, ctx: &WorkerContext) -> ResultRecord {
    let now = Utc::now();
    let prompt = poke_prompt(agent, target_agent_id);
    let response = match ctx.llm.generate(&prompt).await {
        Ok(response) => response,
        Err(error) => return failed(&agent.id, from_chain_error(error), now),
    };
    let note = response
        .parsed
        .as_ref()
        .and_then(|p| p["note"].as_str())
        .unwrap_or(&response.content)
        .to_string();

    let payload = json!({ "target_agent_id": target_agent_id, "note": note });
    match ctx.forge.emit_issue("poke", payload, &agent.id).await {
        Ok(_issue_ref) => ResultRecord::Poked {
            agent_id: agent.id.clone(),
            target_agent_id: target_agent_id.to_string(),
            at: now,
        },
        Err(error) => failed(&agent.id, from_forge_error(error), now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;
    use synthforge_forge::{Comment, CommentRef, IssueRef, PostDetail};
    use synthforge_llm::{LlmClient, MockLlm, ProviderChain};
    use synthforge_pulse::Pulse;
    use synthforge_types::{AgentStatus, PersonalityTraits, PostMirror, ReactionKind};

    struct StubForge {
        created: Mutex<Vec<(String, String)>>,
    }

    impl StubForge {
        fn new() -> Self {
            Self { created: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ForgeClient for StubForge {
        async fn list_recent_discussions(&self, _channel: &str, _limit: u32) -> Result<Vec<PostMirror>, synthforge_forge::ForgeError> {
            Ok(vec![])
        }
        async fn read_discussion(&self, number: u64) -> Result<PostDetail, synthforge_forge::ForgeError> {
            Ok(PostDetail {
                mirror: PostMirror {
                    forge_id: number,
                    number,
                    title: String::new(),
                    byline_agent_id: "a1".into(),
                    channel: "code".into(),
                    created_at: Utc::now(),
                    reactions: Default::default(),
                    comment_count: 0,
                    metadata: None,
                },
                body: String::new(),
            })
        }
        async fn read_comments(&self, _number: u64) -> Result<Vec<Comment>, synthforge_forge::ForgeError> {
            Ok(vec![])
        }
        async fn create_discussion(
            &self,
            channel: &str,
            title: &str,
            _body: &str,
            _agent_id: &str,
        ) -> Result<PostMirror, synthforge_forge::ForgeError> {
            self.created.lock().unwrap().push((channel.to_string(), title.to_string()));
            Ok(PostMirror {
                forge_id: 99,
                number: 1,
                title: title.to_string(),
                byline_agent_id: "a1".into(),
                channel: channel.to_string(),
                created_at: Utc::now(),
                reactions: Default::default(),
                comment_count: 0,
                metadata: None,
            })
        }
        async fn add_comment(&self, _number: u64, _body: &str, _agent_id: &str) -> Result<CommentRef, synthforge_forge::ForgeError> {
            Ok(CommentRef { forge_id: 7 })
        }
        async fn add_reaction(&self, _target_id: u64, _kind: ReactionKind) -> Result<(), synthforge_forge::ForgeError> {
            Ok(())
        }
        async fn emit_issue(&self, _action_kind: &str, _payload: Value, _agent_id: &str) -> Result<IssueRef, synthforge_forge::ForgeError> {
            Ok(IssueRef { forge_id: 55 })
        }
    }

    fn agent(id: &str) -> Agent {
        Agent {
            id: id.to_string(),
            display_name: id.to_string(),
            framework: "curator".into(),
            biography: "".into(),
            last_heartbeat: Utc::now(),
            status: AgentStatus::Active,
            post_count: 0,
            comment_count: 0,
            poke_count: 0,
            subscribed_channels: vec![],
            traits: PersonalityTraits::new(),
        }
    }

    fn empty_pulse() -> Pulse {
        Pulse {
            computed_at: Utc::now(),
            channels: vec![],
            under_discussed: vec![],
            prediction_resolutions_due: vec![],
            summons_near_threshold: vec![],
        }
    }

    fn context(forge: Arc<dyn ForgeClient>, llm: Arc<ProviderChain>) -> WorkerContext {
        let mut agents = BTreeMap::new();
        agents.insert("a1".to_string(), agent("a1"));
        WorkerContext {
            stream_id: 0,
            llm,
            forge,
            pulse: Arc::new(empty_pulse()),
            agents: Arc::new(agents),
            cancellation: CancellationToken::new(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    #[tokio::test]
    async fn noop_task_yields_lurk_skip() {
        let forge = Arc::new(StubForge::new());
        let llm = Arc::new(ProviderChain::new(vec![], 1, std::time::Duration::from_millis(1)));
        let ctx = context(forge, llm);
        let task = CycleTask { agent_id: "a1".into(), action: IntendedAction::Noop, sequence: 0 };
        let record = run_task(&task, &ctx, &BTreeMap::new()).await;
        assert!(matches!(record, ResultRecord::Skipped { reason: SkipReason::Lurk, .. }));
    }

    #[tokio::test]
    async fn successful_post_draft_creates_discussion() {
        let forge = Arc::new(StubForge::new());
        let llm_client: Arc<dyn LlmClient> = Arc::new(MockLlm::scripted(
            "p1",
            vec![r#"{"title": "brand new idea", "body": "hello"}"#.to_string()],
        ));
        let llm = Arc::new(ProviderChain::new(vec![llm_client], 1, std::time::Duration::from_millis(1)));
        let ctx = context(forge.clone(), llm);
        let task = CycleTask {
            agent_id: "a1".into(),
            action: IntendedAction::Post {
                channel: "code".into(),
                title: String::new(),
                body: String::new(),
                content_mode: None,
            },
            sequence: 0,
        };
        let record = run_task(&task, &ctx, &BTreeMap::new()).await;
        assert!(matches!(record, ResultRecord::Created { forge_id: 99, .. }));
        assert_eq!(forge.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_draft_title_skips_before_reaching_forge() {
        let forge = Arc::new(StubForge::new());
        let llm_client: Arc<dyn LlmClient> = Arc::new(MockLlm::scripted(
            "p1",
            vec![r#"{"title": "an old idea repeated", "body": "hello"}"#.to_string()],
        ));
        let llm = Arc::new(ProviderChain::new(vec![llm_client], 1, std::time::Duration::from_millis(1)));
        let ctx = context(forge.clone(), llm);
        let mut recent = BTreeMap::new();
        recent.insert("a1".to_string(), vec![(5u64, "an old idea repeated".to_string())]);
        let task = CycleTask {
            agent_id: "a1".into(),
            action: IntendedAction::Post {
                channel: "code".into(),
                title: String::new(),
                body: String::new(),
                content_mode: None,
            },
            sequence: 0,
        };
        let record = run_task(&task, &ctx, &recent).await;
        assert!(matches!(
            record,
            ResultRecord::Skipped { reason: SkipReason::DuplicateContent { similar_to_forge_id: 5 }, .. }
        ));
        assert!(forge.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancellation_short_circuits_remaining_tasks() {
        let forge = Arc::new(StubForge::new());
        let llm = Arc::new(ProviderChain::new(vec![], 1, std::time::Duration::from_millis(1)));
        let ctx = context(forge, llm);
        ctx.cancellation.cancel();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let tasks = vec![
            CycleTask { agent_id: "a1".into(), action: IntendedAction::Noop, sequence: 0 },
            CycleTask { agent_id: "a1".into(), action: IntendedAction::Noop, sequence: 1 },
        ];
        run_stream(tasks, &ctx, &BTreeMap::new(), tx).await;
        let mut seen = 0;
        while let Ok(record) = rx.try_recv() {
            assert!(matches!(record, ResultRecord::Skipped { reason: SkipReason::Cancelled, .. }));
            seen += 1;
        }
        assert_eq!(seen, 2);
    }
}
