//! Result records: what actually happened after a task was attempted against the forge.
//!
//! Modeled as an explicit tagged union rather than a dict-with-kind-field so that
//! downstream matches on [`ResultRecord`] are exhaustive at compile time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reaction::ReactionKind;

/// Why a task was skipped without attempting a forge call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Deduplicated against an existing post above the similarity threshold.
    DuplicateContent { similar_to_forge_id: u64 },
    /// Worker stream was cancelled before this task's turn came up.
    Cancelled,
    /// Decision kernel produced a deliberate `Noop`.
    Lurk,
    /// Agent had already reached its per-cycle action cap.
    CapReached,
    /// `--dry-run` forced the forge client's read-only decorator to short-circuit
    /// the write before it reached the forge.
    DryRun,
}

/// Why a forge mutation attempt failed after retries were exhausted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    LlmUnavailable { detail: String },
    LlmMalformedOutput { detail: String },
    ForgeRateLimited { detail: String },
    ForgeTransient { detail: String },
    ForgeAuth { detail: String },
    Unknown { detail: String },
}

/// What happened to one [`crate::task::CycleTask`]. Exactly one variant per task,
/// emitted by the worker stream and consumed by the reconciler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultRecord {
    Created {
        agent_id: String,
        forge_id: u64,
        channel: String,
        at: DateTime<Utc>,
    },
    Commented {
        agent_id: String,
        target_forge_id: u64,
        comment_forge_id: u64,
        at: DateTime<Utc>,
    },
    Voted {
        agent_id: String,
        target_forge_id: u64,
        reaction: ReactionKind,
        at: DateTime<Utc>,
    },
    Poked {
        agent_id: String,
        target_agent_id: String,
        at: DateTime<Utc>,
    },
    Skipped {
        agent_id: String,
        reason: SkipReason,
        at: DateTime<Utc>,
    },
    Failed {
        agent_id: String,
        failure: FailureKind,
        at: DateTime<Utc>,
    },
}

impl ResultRecord {
    pub fn agent_id(&self) -> &str {
        match self {
            ResultRecord::Created { agent_id, .. }
            | ResultRecord::Commented { agent_id, .. }
            | ResultRecord::Voted { agent_id, .. }
            | ResultRecord::Poked { agent_id, .. }
            | ResultRecord::Skipped { agent_id, .. }
            | ResultRecord::Failed { agent_id, .. } => agent_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ResultRecord::Created { .. }
                | ResultRecord::Commented { .. }
                | ResultRecord::Voted { .. }
                | ResultRecord::Poked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_tags_correctly_and_exposes_agent_id() {
        let record = ResultRecord::Created {
            agent_id: "a1".into(),
            forge_id: 42,
            channel: "code".into(),
            at: Utc::now(),
        };
        assert_eq!(record.agent_id(), "a1");
        assert!(record.is_success());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "created");
    }

    #[test]
    fn skipped_and_failed_are_not_success() {
        let skipped = ResultRecord::Skipped {
            agent_id: "a2".into(),
            reason: SkipReason::Lurk,
            at: Utc::now(),
        };
        let failed = ResultRecord::Failed {
            agent_id: "a3".into(),
            failure: FailureKind::ForgeRateLimited {
                detail: "429".into(),
            },
            at: Utc::now(),
        };
        assert!(!skipped.is_success());
        assert!(!failed.is_success());
    }
}
