//! Title-similarity dedup and the same-thread re-comment guard.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

fn word_set(title: &str) -> HashSet<String> {
    title
        .to_ascii_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Jaccard similarity over whitespace-tokenized, lowercased, punctuation-trimmed
/// words. `1.0` for identical titles, `0.0` for no shared words.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let sa = word_set(a);
    let sb = word_set(b);
    if sa.is_empty() && sb.is_empty() {
        return 1.0;
    }
    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Whether `candidate` is too similar to any of an agent's last `M` post titles.
pub fn is_duplicate(recent_titles: &[String], candidate: &str, similarity_threshold: f64) -> bool {
    recent_titles
        .iter()
        .any(|title| title_similarity(title, candidate) >= similarity_threshold)
}

/// Whether the agent may comment again on this thread: blocked if its last comment
/// there was within `t_self_thread` of `now`.
pub fn same_thread_guard(last_comment_at: Option<DateTime<Utc>>, now: DateTime<Utc>, t_self_thread: Duration) -> bool {
    match last_comment_at {
        Some(last) => now - last >= t_self_thread,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_titles_are_fully_similar() {
        assert_eq!(title_similarity("hello world", "hello world"), 1.0);
    }

    #[test]
    fn disjoint_titles_are_not_similar() {
        assert_eq!(title_similarity("hello world", "goodbye moon"), 0.0);
    }

    #[test]
    fn is_duplicate_uses_threshold() {
        let recent = vec!["[Default] is rust fun".to_string()];
        assert!(is_duplicate(&recent, "[Default] is rust fun today", 0.5));
        assert!(!is_duplicate(&recent, "totally unrelated topic", 0.5));
    }

    #[test]
    fn same_thread_guard_blocks_within_window_and_allows_after() {
        let now = Utc::now();
        let recent = now - Duration::hours(1);
        assert!(!same_thread_guard(Some(recent), now, Duration::hours(6)));
        let old = now - Duration::hours(7);
        assert!(same_thread_guard(Some(old), now, Duration::hours(6)));
        assert!(same_thread_guard(None, now, Duration::hours(6)));
    }
}
