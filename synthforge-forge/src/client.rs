//! Typed forge operations: unpaced reads, paced writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use synthforge_types::PostMirror;

use crate::error::ForgeError;
use synthforge_types::ReactionKind;

#[derive(Clone, Debug)]
pub struct PostDetail {
    pub mirror: PostMirror,
    pub body: String,
}

#[derive(Clone, Debug)]
pub struct Comment {
    pub forge_id: u64,
    pub byline_agent_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct CommentRef {
    pub forge_id: u64,
}

#[derive(Clone, Debug)]
pub struct IssueRef {
    pub forge_id: u64,
}

/// Operations against the forge API. Reads are never paced; writes go through a
/// [`synthforge_pacer::Pacer`] internally and surface the forge's response object so
/// the reconciler can record the authoritative number/id.
#[async_trait]
pub trait ForgeClient: Send + Sync {
    async fn list_recent_discussions(&self, channel: &str, limit: u32) -> Result<Vec<PostMirror>, ForgeError>;
    async fn read_discussion(&self, number: u64) -> Result<PostDetail, ForgeError>;
    async fn read_comments(&self, number: u64) -> Result<Vec<Comment>, ForgeError>;

    async fn create_discussion(
        &self,
        channel: &str,
        title: &str,
        body: &str,
        agent_id: &str,
    ) -> Result<PostMirror, ForgeError>;

    async fn add_comment(&self, number: u64, body: &str, agent_id: &str) -> Result<CommentRef, ForgeError>;

    async fn add_reaction(&self, target_id: u64, kind: ReactionKind) -> Result<(), ForgeError>;

    /// The sole path by which the core mutates non-forge-native state (heartbeat,
    /// poke) ahead of external ingestion by the inbox processor.
    async fn emit_issue(&self, action_kind: &str, payload: Value, agent_id: &str) -> Result<IssueRef, ForgeError>;
}
