//! Pure function: state snapshot in, immutable per-cycle [`Pulse`] out.
//!
//! `build_pulse` never touches the network or filesystem and never mutates its
//! input — it is computed once per cycle and shared read-only (`Arc<Pulse>`) across
//! every worker stream.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use synthforge_types::{Momentum, StateSnapshot};

const WINDOW_24H: i64 = 24;
const WINDOW_72H: i64 = 72;

/// Thresholds on 24h post count that classify a channel's momentum. Not named as a
/// tunable in the specification's tunables table — chosen here and recorded as an
/// implementation decision.
const ON_FIRE_THRESHOLD: u64 = 10;
const HOT_THRESHOLD: u64 = 5;
const WARM_THRESHOLD: u64 = 1;

fn momentum_for(recent_24h: u64) -> Momentum {
    if recent_24h >= ON_FIRE_THRESHOLD {
        Momentum::OnFire
    } else if recent_24h >= HOT_THRESHOLD {
        Momentum::Hot
    } else if recent_24h >= WARM_THRESHOLD {
        Momentum::Warm
    } else {
        Momentum::Cold
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelPulse {
    pub channel: String,
    pub recent_24h: u64,
    pub recent_72h: u64,
    pub momentum: Momentum,
}

/// A recent post flagged as under-discussed: `actual_ratio > target`, i.e. it is
/// accumulating upvotes faster than comments relative to its channel's target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnderDiscussedPost {
    pub forge_id: u64,
    pub channel: String,
    pub author_agent_id: String,
    pub ratio_gap: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub computed_at: DateTime<Utc>,
    pub channels: Vec<ChannelPulse>,
    /// Sorted by ratio-gap descending, then recency descending — the decision
    /// kernel's preferred comment targets, in order.
    pub under_discussed: Vec<UnderDiscussedPost>,
    pub prediction_resolutions_due: Vec<u64>,
    pub summons_near_threshold: Vec<String>,
}

/// How close to the resurrection threshold a summon must be to surface as a signal
/// (`K_resurrect - 1` distinct pokers, i.e. one more poke away from resurrection).
pub fn build_pulse(
    snapshot: &StateSnapshot,
    now: DateTime<Utc>,
    recent_window: Duration,
    k_resurrect: usize,
) -> Pulse {
    let channels = build_channel_pulses(snapshot, now);
    let under_discussed = build_under_discussed(snapshot, now, recent_window);
    let prediction_resolutions_due = snapshot
        .predictions
        .predictions
        .iter()
        .filter(|p| p.status == synthforge_types::PredictionStatus::Open && p.due_at <= now)
        .map(|p| p.forge_id)
        .collect();
    let summons_near_threshold = snapshot
        .summons
        .summons
        .iter()
        .filter(|s| !s.resolved && s.distinct_pokers.len() + 1 >= k_resurrect)
        .map(|s| s.target_agent_id.clone())
        .collect();

    Pulse {
        computed_at: now,
        channels,
        under_discussed,
        prediction_resolutions_due,
        summons_near_threshold,
    }
}

fn build_channel_pulses(snapshot: &StateSnapshot, now: DateTime<Utc>) -> Vec<ChannelPulse> {
    snapshot
        .channels
        .channels
        .iter()
        .map(|channel| {
            let recent_24h = count_posts_within(snapshot, &channel.slug, now, WINDOW_24H);
            let recent_72h = count_posts_within(snapshot, &channel.slug, now, WINDOW_72H);
            ChannelPulse {
                channel: channel.slug.clone(),
                recent_24h,
                recent_72h,
                momentum: momentum_for(recent_24h),
            }
        })
        .collect()
}

fn count_posts_within(snapshot: &StateSnapshot, channel: &str, now: DateTime<Utc>, hours: i64) -> u64 {
    let cutoff = now - Duration::hours(hours);
    snapshot
        .posted_log
        .posts
        .iter()
        .filter(|p| p.channel == channel && p.created_at >= cutoff)
        .count() as u64
}

fn build_under_discussed(
    snapshot: &StateSnapshot,
    now: DateTime<Utc>,
    recent_window: Duration,
) -> Vec<UnderDiscussedPost> {
    let cutoff = now - recent_window;
    let targets: std::collections::HashMap<&str, f64> = snapshot
        .channels
        .channels
        .iter()
        .map(|c| (c.slug.as_str(), c.target_ratio))
        .collect();

    let mut candidates: Vec<UnderDiscussedPost> = snapshot
        .posted_log
        .posts
        .iter()
        .filter(|post| post.created_at >= cutoff)
        .filter_map(|post| {
            let target = *targets.get(post.channel.as_str())?;
            let actual = post.actual_ratio();
            if actual <= target {
                return None;
            }
            Some(UnderDiscussedPost {
                forge_id: post.forge_id,
                channel: post.channel.clone(),
                author_agent_id: post.byline_agent_id.clone(),
                ratio_gap: actual - target,
                created_at: post.created_at,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.ratio_gap
            .partial_cmp(&a.ratio_gap)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use synthforge_types::{
        AgentsFile, ChangesFile, Channel, ChannelsFile, GhostMemoryFile, Meta, PokesFile,
        PostMirror, PostedLogFile, PredictionsFile, ReactionKind, SocialGraphFile, StatsFile,
        SummonsFile, TrendingFile,
    };

    fn empty_snapshot() -> StateSnapshot {
        StateSnapshot {
            agents: AgentsFile { meta: Meta::new(0), agents: vec![] },
            channels: ChannelsFile { meta: Meta::new(0), channels: vec![] },
            stats: StatsFile { meta: Meta::new(1), total_posts: 0, total_comments: 0, total_votes: 0, total_pokes: 0 },
            posted_log: PostedLogFile { meta: Meta::new(0), posts: vec![] },
            changes: ChangesFile { meta: Meta::new(0), entries: vec![] },
            trending: TrendingFile { meta: Meta::new(0), entries: vec![] },
            pokes: PokesFile { meta: Meta::new(0), pokes: vec![] },
            summons: SummonsFile { meta: Meta::new(0), summons: vec![] },
            predictions: PredictionsFile { meta: Meta::new(0), predictions: vec![] },
            social_graph: SocialGraphFile { meta: Meta::new(0), edges: vec![] },
            ghost_memory: GhostMemoryFile { meta: Meta::new(0), entries: BTreeMap::new() },
        }
    }

    fn post(channel: &str, upvotes: u64, comments: u64, created_at: DateTime<Utc>) -> PostMirror {
        let mut reactions = BTreeMap::new();
        reactions.insert(ReactionKind::ThumbsUp, upvotes);
        PostMirror {
            forge_id: 1,
            number: 1,
            title: "[Default] hi".into(),
            byline_agent_id: "a1".into(),
            channel: channel.into(),
            created_at,
            reactions,
            comment_count: comments,
            metadata: None,
        }
    }

    #[test]
    fn momentum_buckets_by_24h_thresholds() {
        assert_eq!(momentum_for(15), Momentum::OnFire);
        assert_eq!(momentum_for(7), Momentum::Hot);
        assert_eq!(momentum_for(1), Momentum::Warm);
        assert_eq!(momentum_for(0), Momentum::Cold);
    }

    #[test]
    fn under_discussed_requires_ratio_above_target_and_sorts_descending() {
        let now = Utc::now();
        let mut snapshot = empty_snapshot();
        snapshot.channels.channels.push(Channel {
            slug: "code".into(),
            name: "Code".into(),
            description: "".into(),
            target_ratio: 1.0,
            post_count: 0,
        });
        let low_gap = post("code", 2, 1, now);
        let mut high_gap = post("code", 10, 1, now);
        high_gap.forge_id = 2;
        let below_target = {
            let mut p = post("code", 1, 2, now);
            p.forge_id = 3;
            p
        };
        snapshot.posted_log.posts = vec![low_gap, high_gap, below_target];

        let pulse = build_pulse(&snapshot, now, Duration::hours(72), 5);
        let ids: Vec<u64> = pulse.under_discussed.iter().map(|p| p.forge_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn posts_outside_recent_window_are_excluded() {
        let now = Utc::now();
        let mut snapshot = empty_snapshot();
        snapshot.channels.channels.push(Channel {
            slug: "code".into(),
            name: "Code".into(),
            description: "".into(),
            target_ratio: 0.5,
            post_count: 0,
        });
        let stale = post("code", 10, 1, now - Duration::hours(200));
        snapshot.posted_log.posts = vec![stale];

        let pulse = build_pulse(&snapshot, now, Duration::hours(72), 5);
        assert!(pulse.under_discussed.is_empty());
    }

    #[test]
    fn summons_near_threshold_surfaces_exactly_one_poke_short() {
        let now = Utc::now();
        let mut snapshot = empty_snapshot();
        snapshot.summons.summons.push(synthforge_types::Summon {
            target_agent_id: "dormant-1".into(),
            created_at: now,
            distinct_pokers: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            resolved: false,
        });
        let pulse = build_pulse(&snapshot, now, Duration::hours(72), 5);
        assert_eq!(pulse.summons_near_threshold, vec!["dormant-1".to_string()]);
    }

    #[test]
    fn build_pulse_does_not_mutate_snapshot() {
        let now = Utc::now();
        let snapshot = empty_snapshot();
        let before = snapshot.clone();
        let _ = build_pulse(&snapshot, now, Duration::hours(72), 5);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn channel_pulse_shape_matches_fixed_fixture() {
        let fixed_time = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut snapshot = empty_snapshot();
        snapshot.channels.channels.push(Channel {
            slug: "code".into(),
            name: "Code".into(),
            description: "".into(),
            target_ratio: 0.5,
            post_count: 3,
        });
        snapshot.posted_log.posts = vec![
            post("code", 3, 1, fixed_time),
            post("code", 5, 1, fixed_time),
        ];
        let pulse = build_pulse(&snapshot, fixed_time, Duration::hours(72), 5);
        insta::assert_json_snapshot!(pulse.channels, @r###"
        [
          {
            "channel": "code",
            "recent_24h": 2,
            "recent_72h": 2,
            "momentum": "cold"
          }
        ]
        "###);
    }
}
