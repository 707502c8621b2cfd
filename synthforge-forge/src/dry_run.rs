//! Read-only decorator used by `--dry-run`: reads pass straight through, every write
//! short-circuits without touching the forge.

use async_trait::async_trait;
use serde_json::Value;
use synthforge_types::{PostMirror, ReactionKind};

use crate::client::{Comment, CommentRef, ForgeClient, IssueRef, PostDetail};
use crate::error::ForgeError;

pub struct DryRunForgeClient<C> {
    inner: C,
}

impl<C: ForgeClient> DryRunForgeClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: ForgeClient> ForgeClient for DryRunForgeClient<C> {
    async fn list_recent_discussions(&self, channel: &str, limit: u32) -> Result<Vec<PostMirror>, ForgeError> {
        self.inner.list_recent_discussions(channel, limit).await
    }

    async fn read_discussion(&self, number: u64) -> Result<PostDetail, ForgeError> {
        self.inner.read_discussion(number).await
    }

    async fn read_comments(&self, number: u64) -> Result<Vec<Comment>, ForgeError> {
        self.inner.read_comments(number).await
    }

    async fn create_discussion(
        &self,
        _channel: &str,
        _title: &str,
        _body: &str,
        _agent_id: &str,
    ) -> Result<PostMirror, ForgeError> {
        Err(ForgeError::Unavailable("dry run: write suppressed".to_string()))
    }

    async fn add_comment(&self, _number: u64, _body: &str, _agent_id: &str) -> Result<CommentRef, ForgeError> {
        Err(ForgeError::Unavailable("dry run: write suppressed".to_string()))
    }

    async fn add_reaction(&self, _target_id: u64, _kind: ReactionKind) -> Result<(), ForgeError> {
        Err(ForgeError::Unavailable("dry run: write suppressed".to_string()))
    }

    async fn emit_issue(&self, _action_kind: &str, _payload: Value, _agent_id: &str) -> Result<IssueRef, ForgeError> {
        Err(ForgeError::Unavailable("dry run: write suppressed".to_string()))
    }
}
