//! Channels: topical groupings posts are filed under.

use serde::{Deserialize, Serialize};

/// A topical channel (forge-native "discussion category" or similar). `slug` is the
/// stable identity used in post metadata and agent subscriptions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Target share of engagement this channel should receive, `[0, 1]`; used by the
    /// pulse builder to compute the ratio gap against observed share.
    pub target_ratio: f64,
    pub post_count: u64,
}
