//! Typed, documented defaults for every engine tunable, each overridable by one env var.
//!
//! `EngineSettings::from_env()` is the single place the rest of the workspace reads timing
//! and sizing constants from — no crate should read `std::env::var` directly for a tunable
//! named here.

use std::time::Duration;

fn env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// All tunables named in the tunables table, with env-var overrides and fixed defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    /// Minimum interval between outbound forge mutations (C2).
    pub t_gap: Duration,
    /// Per-provider LLM call timeout (C3).
    pub t_llm: Duration,
    /// Per-call forge HTTP timeout (C4).
    pub t_forge: Duration,
    /// Attempts per LLM provider before failing over (C3).
    pub llm_retries: u32,
    /// Forge read retry budget (C4).
    pub forge_read_retries: u32,
    /// Forge write retry budget (C4), kept small to avoid duplicate mutations.
    pub forge_write_retries: u32,
    /// Dormancy horizon read by decision/pulse code; the status transition itself belongs
    /// to a sibling, the core only reads this for context.
    pub t_dormant: Duration,
    /// Change-log retention window (C9).
    pub t_retain: Duration,
    /// Cadence of the continuous runner's outer loop (C11), overridable by `--interval`.
    pub t_cycle: Duration,
    /// Minimum spacing between repeat comments by the same agent under the same thread (C6).
    pub t_self_thread: Duration,
    /// Window within which distinct pokers count toward a summon (C9).
    pub t_summon: Duration,
    /// Maximum safe-commit retry attempts before surfacing a terminal error (C10).
    pub commit_max_attempts: u32,
    /// Default number of agents considered per cycle (C8), overridable by `--agents`.
    pub agents_per_cycle: u32,
    /// Default number of worker streams (C8), overridable by `--streams`.
    pub streams: u32,
    /// Cadence (in cycles) at which the trending sibling is invoked (C11).
    pub trending_every: u32,
    /// Distinct pokers required to resolve a summon and resurrect its target (C11).
    pub resurrect_pokers: u32,
    /// Jaccard similarity threshold above which two post titles are considered duplicates (C6).
    pub dedup_similarity: f64,
    /// Number of an agent's most recent posts checked for dedup (C6).
    pub dedup_recent_posts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            t_gap: Duration::from_secs(20),
            t_llm: Duration::from_secs(60),
            t_forge: Duration::from_secs(30),
            llm_retries: 3,
            forge_read_retries: 3,
            forge_write_retries: 1,
            t_dormant: Duration::from_secs(14 * 24 * 3600),
            t_retain: Duration::from_secs(30 * 24 * 3600),
            t_cycle: Duration::from_secs(1800),
            t_self_thread: Duration::from_secs(6 * 3600),
            t_summon: Duration::from_secs(24 * 3600),
            commit_max_attempts: 5,
            agents_per_cycle: 12,
            streams: 3,
            trending_every: 2,
            resurrect_pokers: 5,
            dedup_similarity: 0.85,
            dedup_recent_posts: 5,
        }
    }
}

impl EngineSettings {
    /// Reads every tunable from its env-var override, falling back to the documented default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            t_gap: env_duration_secs("SYNTHFORGE_T_GAP_SECS", d.t_gap),
            t_llm: env_duration_secs("SYNTHFORGE_T_LLM_SECS", d.t_llm),
            t_forge: env_duration_secs("SYNTHFORGE_T_FORGE_SECS", d.t_forge),
            llm_retries: env_u32("SYNTHFORGE_LLM_RETRIES", d.llm_retries),
            forge_read_retries: env_u32("SYNTHFORGE_FORGE_READ_RETRIES", d.forge_read_retries),
            forge_write_retries: env_u32("SYNTHFORGE_FORGE_WRITE_RETRIES", d.forge_write_retries),
            t_dormant: env_duration_secs(
                "SYNTHFORGE_T_DORMANT_DAYS",
                d.t_dormant,
            ),
            t_retain: env_duration_secs("SYNTHFORGE_T_RETAIN_DAYS", d.t_retain),
            t_cycle: env_duration_secs("SYNTHFORGE_INTERVAL_SECS", d.t_cycle),
            t_self_thread: env_duration_secs("SYNTHFORGE_T_SELF_THREAD_SECS", d.t_self_thread),
            t_summon: env_duration_secs("SYNTHFORGE_T_SUMMON_SECS", d.t_summon),
            commit_max_attempts: env_u32("SYNTHFORGE_COMMIT_MAX_ATTEMPTS", d.commit_max_attempts),
            agents_per_cycle: env_u32("SYNTHFORGE_AGENTS", d.agents_per_cycle),
            streams: env_u32("SYNTHFORGE_STREAMS", d.streams),
            trending_every: env_u32("SYNTHFORGE_TRENDING_EVERY", d.trending_every),
            resurrect_pokers: env_u32("SYNTHFORGE_RESURRECT_POKERS", d.resurrect_pokers),
            dedup_similarity: env_f64("SYNTHFORGE_DEDUP_SIMILARITY", d.dedup_similarity),
            dedup_recent_posts: env_u32("SYNTHFORGE_DEDUP_RECENT_POSTS", d.dedup_recent_posts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tunables_table() {
        let s = EngineSettings::default();
        assert_eq!(s.t_gap, Duration::from_secs(20));
        assert_eq!(s.commit_max_attempts, 5);
        assert_eq!(s.streams, 3);
        assert_eq!(s.agents_per_cycle, 12);
    }

    #[test]
    fn env_override_takes_effect() {
        std::env::set_var("SYNTHFORGE_T_GAP_SECS_TEST_GUARD", "1");
        std::env::set_var("SYNTHFORGE_COMMIT_MAX_ATTEMPTS", "9");
        let s = EngineSettings::from_env();
        assert_eq!(s.commit_max_attempts, 9);
        std::env::remove_var("SYNTHFORGE_COMMIT_MAX_ATTEMPTS");
        std::env::remove_var("SYNTHFORGE_T_GAP_SECS_TEST_GUARD");
    }

    #[test]
    fn malformed_override_falls_back_to_default() {
        std::env::set_var("SYNTHFORGE_STREAMS", "not-a-number");
        let s = EngineSettings::from_env();
        assert_eq!(s.streams, EngineSettings::default().streams);
        std::env::remove_var("SYNTHFORGE_STREAMS");
    }
}
