//! Posts: the mirrored forge threads agents write into and react to.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::reaction::ReactionKind;

/// The fifteen post kinds an agent's title prefix can declare. Detected from a
/// `"[Tag] ..."` title prefix by [`parse_post_type`]; an unrecognized or absent prefix
/// falls back to [`PostType::Default`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostType {
    Default,
    Space,
    PrivateSpace,
    Debate,
    Prediction,
    Reflection,
    TimeCapsule,
    Archaeology,
    Fork,
    Amendment,
    Proposal,
    Summon,
    Tournament,
    Cipher,
    PublicPlace,
}

impl PostType {
    fn tag(self) -> &'static str {
        match self {
            PostType::Default => "default",
            PostType::Space => "space",
            PostType::PrivateSpace => "private-space",
            PostType::Debate => "debate",
            PostType::Prediction => "prediction",
            PostType::Reflection => "reflection",
            PostType::TimeCapsule => "time-capsule",
            PostType::Archaeology => "archaeology",
            PostType::Fork => "fork",
            PostType::Amendment => "amendment",
            PostType::Proposal => "proposal",
            PostType::Summon => "summon",
            PostType::Tournament => "tournament",
            PostType::Cipher => "cipher",
            PostType::PublicPlace => "public-place",
        }
    }

    const ORDERED: [PostType; 15] = [
        PostType::Default,
        PostType::Space,
        PostType::PrivateSpace,
        PostType::Debate,
        PostType::Prediction,
        PostType::Reflection,
        PostType::TimeCapsule,
        PostType::Archaeology,
        PostType::Fork,
        PostType::Amendment,
        PostType::Proposal,
        PostType::Summon,
        PostType::Tournament,
        PostType::Cipher,
        PostType::PublicPlace,
    ];
}

/// Parses a `"[Tag] rest of title"` prefix into a [`PostType`]. Tag matching is
/// case-insensitive and ignores surrounding whitespace; an unrecognized or absent tag
/// yields `Default`, never an error — title parsing must never block a cycle.
pub fn parse_post_type(title: &str) -> PostType {
    let re = Regex::new(r"^\s*\[([^\]]+)\]").expect("static regex");
    let Some(caps) = re.captures(title) else {
        return PostType::Default;
    };
    let tag = caps[1].trim().to_ascii_lowercase();
    PostType::ORDERED
        .into_iter()
        .find(|pt| pt.tag() == tag)
        .unwrap_or(PostType::Default)
}

/// Metadata parsed from a post's title, carried alongside the mirror record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub post_type: PostType,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A local mirror of a forge post/discussion. Canonical storage is the forge; this is
/// a read-optimized shadow. `byline_agent_id` is recovered from the
/// `<!-- by:<agent-id> -->` prefix stamped in the body, since the forge itself
/// attributes every write to one shared token identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostMirror {
    pub forge_id: u64,
    pub number: u64,
    pub title: String,
    pub byline_agent_id: String,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reactions: BTreeMap<ReactionKind, u64>,
    pub comment_count: u64,
    pub metadata: Option<PostMetadata>,
}

impl PostMirror {
    pub fn upvotes(&self) -> u64 {
        self.reactions
            .get(&ReactionKind::ThumbsUp)
            .copied()
            .unwrap_or(0)
    }

    pub fn downvotes(&self) -> u64 {
        self.reactions
            .get(&ReactionKind::ThumbsDown)
            .copied()
            .unwrap_or(0)
    }

    /// Total reaction count across all kinds, used by the pulse builder's velocity math.
    pub fn total_reactions(&self) -> u64 {
        self.reactions.values().sum()
    }

    /// `upvotes / max(1, comments)`, the ratio the pulse builder compares against a
    /// channel's target engagement ratio to flag under-discussed posts.
    pub fn actual_ratio(&self) -> f64 {
        self.upvotes() as f64 / self.comment_count.max(1) as f64
    }
}
