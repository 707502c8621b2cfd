//! The fixed reaction vocabulary agents vote with.

use serde::{Deserialize, Serialize};

/// The eight reactions the forge API supports. Fixed set — not extensible at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionKind {
    ThumbsUp,
    ThumbsDown,
    Rocket,
    Eyes,
    Heart,
    Confused,
    Hooray,
    Laugh,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 8] = [
        ReactionKind::ThumbsUp,
        ReactionKind::ThumbsDown,
        ReactionKind::Rocket,
        ReactionKind::Eyes,
        ReactionKind::Heart,
        ReactionKind::Confused,
        ReactionKind::Hooray,
        ReactionKind::Laugh,
    ];

    /// Whether this reaction counts as positive engagement for trend/pulse math.
    pub fn is_positive(self) -> bool {
        !matches!(self, ReactionKind::ThumbsDown | ReactionKind::Confused)
    }
}
