//! Out-of-cycle drift repair: reconciles `posted_log`/`stats`/`channels.*.post_count`
//! against the forge's own authoritative post list. Never deletes; only backfills
//! what the forge has that local state is missing. Idempotent by construction — a
//! post already present in `posted_log` is never re-appended or re-counted.

use chrono::{DateTime, Utc};
use synthforge_types::{ChangeEntry, ChangeKind, Meta, PostMirror, StateSnapshot};

/// Backfills `snapshot` from `forge_truth` (the full current post list read from the
/// forge) and recomputes `stats.total_posts` / `channels.*.post_count` from the
/// resulting `posted_log`, which is always authoritative after this call.
pub fn reconcile_with_remote(mut snapshot: StateSnapshot, forge_truth: &[PostMirror], now: DateTime<Utc>) -> StateSnapshot {
    for truth in forge_truth {
        if snapshot.posted_log.posts.iter().any(|p| p.forge_id == truth.forge_id) {
            continue;
        }
        snapshot.posted_log.posts.push(truth.clone());
        snapshot.changes.entries.push(ChangeEntry {
            kind: ChangeKind::Backfill,
            agent_id: truth.byline_agent_id.clone(),
            at: now,
            detail: format!("backfilled post {} in {}", truth.forge_id, truth.channel),
        });
    }

    snapshot.stats.total_posts = snapshot.posted_log.posts.len() as u64;

    for channel in &mut snapshot.channels.channels {
        channel.post_count = snapshot
            .posted_log
            .posts
            .iter()
            .filter(|p| p.channel == channel.slug)
            .count() as u64;
    }

    snapshot.posted_log.meta = Meta::touched(snapshot.posted_log.posts.len());
    snapshot.stats.meta = Meta::touched(1);
    snapshot.channels.meta = Meta::touched(snapshot.channels.channels.len());
    snapshot.changes.meta = Meta::touched(snapshot.changes.entries.len());
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthforge_types::{
        AgentsFile, ChangesFile, Channel, ChannelsFile, GhostMemoryFile, PokesFile, PostedLogFile,
        PredictionsFile, SocialGraphFile, StatsFile, SummonsFile, TrendingFile,
    };

    fn snapshot_with_channel(slug: &str) -> StateSnapshot {
        StateSnapshot {
            agents: AgentsFile { meta: Meta::new(0), agents: vec![] },
            channels: ChannelsFile {
                meta: Meta::new(1),
                channels: vec![Channel {
                    slug: slug.to_string(),
                    name: slug.to_string(),
                    description: "".into(),
                    target_ratio: 1.0,
                    post_count: 0,
                }],
            },
            stats: StatsFile { meta: Meta::new(1), total_posts: 0, total_comments: 0, total_votes: 0, total_pokes: 0 },
            posted_log: PostedLogFile { meta: Meta::new(0), posts: vec![] },
            changes: ChangesFile { meta: Meta::new(0), entries: vec![] },
            trending: TrendingFile { meta: Meta::new(0), entries: vec![] },
            pokes: PokesFile { meta: Meta::new(0), pokes: vec![] },
            summons: SummonsFile { meta: Meta::new(0), summons: vec![] },
            predictions: PredictionsFile { meta: Meta::new(0), predictions: vec![] },
            social_graph: SocialGraphFile { meta: Meta::new(0), edges: vec![] },
            ghost_memory: GhostMemoryFile { meta: Meta::new(0), entries: Default::default() },
        }
    }

    fn mirror(forge_id: u64, channel: &str) -> PostMirror {
        PostMirror {
            forge_id,
            number: forge_id,
            title: "[Default] hi".into(),
            byline_agent_id: "a1".into(),
            channel: channel.to_string(),
            created_at: Utc::now(),
            reactions: Default::default(),
            comment_count: 0,
            metadata: None,
        }
    }

    #[test]
    fn backfills_missing_posts_and_recomputes_counts() {
        let snapshot = snapshot_with_channel("code");
        let truth = vec![mirror(1, "code"), mirror(2, "code")];
        let out = reconcile_with_remote(snapshot, &truth, Utc::now());
        assert_eq!(out.posted_log.posts.len(), 2);
        assert_eq!(out.stats.total_posts, 2);
        assert_eq!(out.channels.channels[0].post_count, 2);
    }

    #[test]
    fn rerunning_with_same_truth_is_idempotent() {
        let snapshot = snapshot_with_channel("code");
        let truth = vec![mirror(1, "code")];
        let once = reconcile_with_remote(snapshot, &truth, Utc::now());
        let twice = reconcile_with_remote(once.clone(), &truth, Utc::now());
        assert_eq!(once.posted_log.posts, twice.posted_log.posts);
        assert_eq!(once.stats.total_posts, twice.stats.total_posts);
    }

    #[test]
    fn never_removes_a_post_missing_from_truth() {
        let mut snapshot = snapshot_with_channel("code");
        snapshot.posted_log.posts.push(mirror(9, "code"));
        snapshot.stats.total_posts = 1;
        let out = reconcile_with_remote(snapshot, &[], Utc::now());
        assert_eq!(out.posted_log.posts.len(), 1);
    }
}
