//! Octocrab-backed [`ForgeClient`]. Discussions are modeled as labeled issues — the
//! forge platform this targets exposes topic channels as issue labels rather than
//! GitHub's native (GraphQL-only) Discussions feature.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use octocrab::models::reactions::ReactionContent;
use octocrab::Octocrab;
use serde_json::Value;
use synthforge_types::{PostMetadata, PostMirror, ReactionKind};

use crate::byline::{parse_byline, with_byline};
use crate::client::{Comment, CommentRef, ForgeClient, IssueRef, PostDetail};
use crate::error::ForgeError;
use synthforge_pacer::Pacer;

pub struct OctocrabForgeClient {
    client: Octocrab,
    owner: String,
    repo: String,
    pacer: Arc<dyn Pacer>,
}

impl OctocrabForgeClient {
    pub fn new(client: Octocrab, owner: impl Into<String>, repo: impl Into<String>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
            pacer,
        }
    }

    fn issues(&self) -> octocrab::issues::IssueHandler<'_> {
        self.client.issues(&self.owner, &self.repo)
    }
}

fn reaction_content(kind: ReactionKind) -> ReactionContent {
    match kind {
        ReactionKind::ThumbsUp => ReactionContent::PlusOne,
        ReactionKind::ThumbsDown => ReactionContent::MinusOne,
        ReactionKind::Rocket => ReactionContent::Rocket,
        ReactionKind::Eyes => ReactionContent::Eyes,
        ReactionKind::Heart => ReactionContent::Heart,
        ReactionKind::Confused => ReactionContent::Confused,
        ReactionKind::Hooray => ReactionContent::Hooray,
        ReactionKind::Laugh => ReactionContent::Laugh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_content_maps_all_eight_kinds() {
        assert!(matches!(reaction_content(ReactionKind::ThumbsUp), ReactionContent::PlusOne));
        assert!(matches!(reaction_content(ReactionKind::ThumbsDown), ReactionContent::MinusOne));
        assert!(matches!(reaction_content(ReactionKind::Rocket), ReactionContent::Rocket));
        assert!(matches!(reaction_content(ReactionKind::Eyes), ReactionContent::Eyes));
        assert!(matches!(reaction_content(ReactionKind::Heart), ReactionContent::Heart));
        assert!(matches!(reaction_content(ReactionKind::Confused), ReactionContent::Confused));
        assert!(matches!(reaction_content(ReactionKind::Hooray), ReactionContent::Hooray));
        assert!(matches!(reaction_content(ReactionKind::Laugh), ReactionContent::Laugh));
    }
}

fn classify_octocrab_error(error: octocrab::Error) -> ForgeError {
    match &error {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code;
            let message = source.message.clone();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                ForgeError::Auth(message)
            } else if status.as_u16() == 429 {
                ForgeError::RateLimited(message)
            } else if status.as_u16() == 404 {
                ForgeError::NotFound(message)
            } else if status.is_server_error() {
                ForgeError::Transient(message)
            } else {
                ForgeError::Unavailable(message)
            }
        }
        other => ForgeError::Transient(other.to_string()),
    }
}

fn issue_to_mirror(issue: &octocrab::models::issues::Issue, channel: &str) -> PostMirror {
    let (byline_agent_id, _) = parse_byline(issue.body.as_deref().unwrap_or_default());
    PostMirror {
        forge_id: *issue.id,
        number: issue.number,
        title: issue.title.clone(),
        byline_agent_id: byline_agent_id.unwrap_or_default(),
        channel: channel.to_string(),
        created_at: issue.created_at,
        reactions: Default::default(),
        comment_count: issue.comments as u64,
        metadata: Some(PostMetadata {
            post_type: synthforge_types::parse_post_type(&issue.title),
            tags: issue.labels.iter().map(|l| l.name.clone()).collect(),
        }),
    }
}

#[async_trait]
impl ForgeClient for OctocrabForgeClient {
    async fn list_recent_discussions(&self, channel: &str, limit: u32) -> Result<Vec<PostMirror>, ForgeError> {
        let page = self
            .issues()
            .list()
            .labels(&[channel.to_string()])
            .sort(octocrab::params::issues::Sort::Created)
            .direction(octocrab::params::Direction::Descending)
            .per_page(limit as u8)
            .send()
            .await
            .map_err(classify_octocrab_error)?;
        Ok(page.items.iter().map(|issue| issue_to_mirror(issue, channel)).collect())
    }

    async fn read_discussion(&self, number: u64) -> Result<PostDetail, ForgeError> {
        let issue = self.issues().get(number).await.map_err(classify_octocrab_error)?;
        let body = issue.body.clone().unwrap_or_default();
        let channel = issue
            .labels
            .first()
            .map(|l| l.name.clone())
            .unwrap_or_default();
        let mirror = issue_to_mirror(&issue, &channel);
        Ok(PostDetail { mirror, body })
    }

    async fn read_comments(&self, number: u64) -> Result<Vec<Comment>, ForgeError> {
        let page = self
            .issues()
            .list_comments(number)
            .send()
            .await
            .map_err(classify_octocrab_error)?;
        Ok(page
            .items
            .into_iter()
            .map(|c| {
                let body = c.body.unwrap_or_default();
                let (byline_agent_id, rest) = parse_byline(&body);
                Comment {
                    forge_id: *c.id,
                    byline_agent_id,
                    body: rest.to_string(),
                    created_at: c.created_at,
                }
            })
            .collect())
    }

    async fn create_discussion(
        &self,
        channel: &str,
        title: &str,
        body: &str,
        agent_id: &str,
    ) -> Result<PostMirror, ForgeError> {
        self.pacer.acquire().await;
        let stamped = with_byline(agent_id, body);
        let issue = self
            .issues()
            .create(title)
            .body(&stamped)
            .labels(vec![channel.to_string()])
            .send()
            .await
            .map_err(classify_octocrab_error)?;
        Ok(issue_to_mirror(&issue, channel))
    }

    async fn add_comment(&self, number: u64, body: &str, agent_id: &str) -> Result<CommentRef, ForgeError> {
        self.pacer.acquire().await;
        let stamped = with_byline(agent_id, body);
        let comment = self
            .issues()
            .create_comment(number, stamped)
            .await
            .map_err(classify_octocrab_error)?;
        Ok(CommentRef { forge_id: *comment.id })
    }

    async fn add_reaction(&self, target_id: u64, kind: ReactionKind) -> Result<(), ForgeError> {
        // Every `Vote` task the decision kernel emits targets a discussion/post (see
        // `pick_comment_target` in synthforge-decision), never a bare comment, so this
        // always reacts through the issue-reaction endpoint, not the comment one.
        self.pacer.acquire().await;
        self.issues()
            .create_reaction(target_id, reaction_content(kind))
            .await
            .map_err(classify_octocrab_error)?;
        Ok(())
    }

    async fn emit_issue(&self, action_kind: &str, payload: Value, agent_id: &str) -> Result<IssueRef, ForgeError> {
        self.pacer.acquire().await;
        let title = format!("[inbox:{action_kind}] {agent_id} @ {}", Utc::now().to_rfc3339());
        let body = with_byline(agent_id, &payload.to_string());
        let issue = self
            .issues()
            .create(&title)
            .body(&body)
            .labels(vec!["inbox".to_string()])
            .send()
            .await
            .map_err(classify_octocrab_error)?;
        Ok(IssueRef { forge_id: *issue.id })
    }
}
