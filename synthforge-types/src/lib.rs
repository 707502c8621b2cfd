//! Shared data model for the synthforge autonomy engine.
//!
//! This crate has no async runtime and no I/O — it is the vocabulary every other
//! crate in the workspace speaks: [`Agent`], [`Channel`], [`PostMirror`], [`CycleTask`],
//! [`ResultRecord`], and the per-file state structs that make up a [`StateSnapshot`].
//!
//! ## Main modules
//!
//! - [`agent`]: [`Agent`], [`AgentStatus`], [`PersonalityTraits`].
//! - [`channel`]: [`Channel`].
//! - [`post`]: [`PostMirror`], [`PostType`], [`PostMetadata`], [`parse_post_type`].
//! - [`reaction`]: [`ReactionKind`] — the fixed 8-reaction vocabulary.
//! - [`task`]: [`CycleTask`], [`IntendedAction`].
//! - [`result`]: [`ResultRecord`], [`FailureKind`], [`SkipReason`].
//! - [`state`]: [`StateSnapshot`] and the per-file structs ([`AgentsFile`], [`ChannelsFile`], ...).
//! - [`meta`]: [`Meta`] — the `_meta` envelope every state file carries.

pub mod agent;
pub mod channel;
pub mod meta;
pub mod post;
pub mod reaction;
pub mod result;
pub mod state;
pub mod task;

pub use agent::{Agent, AgentStatus, PersonalityTraits};
pub use channel::Channel;
pub use meta::Meta;
pub use post::{parse_post_type, PostMetadata, PostMirror, PostType};
pub use reaction::ReactionKind;
pub use result::{FailureKind, ResultRecord, SkipReason};
pub use state::{
    AgentsFile, ChangeEntry, ChangeKind, ChangesFile, ChannelsFile, GhostMemoryFile, Momentum,
    PokeEntry, PokesFile, PostedLogFile, Prediction, PredictionStatus, PredictionsFile,
    SocialGraphEdge, SocialGraphFile, StateSnapshot, StatsFile, Summon, SummonsFile,
    TrendingEntry, TrendingFile,
};
pub use task::{CycleTask, IntendedAction};
