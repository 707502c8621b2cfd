//! Agent selection: up to `n` agents per cycle, weighted toward older heartbeats.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use synthforge_types::{Agent, AgentStatus};

/// Picks up to `n` distinct active agents, weighted by rank among active agents
/// ordered oldest-heartbeat-first (rank 1 = most stale). Weight is linear in rank so
/// a long-idle agent is more likely to be picked without guaranteeing it every time.
pub fn select_agents(agents: &[Agent], n: usize, now: DateTime<Utc>, rng: &mut ChaCha8Rng) -> Vec<String> {
    let mut candidates: Vec<&Agent> = agents.iter().filter(|a| a.status == AgentStatus::Active).collect();
    candidates.sort_by(|a, b| b.heartbeat_age(now).cmp(&a.heartbeat_age(now)));

    let mut weights: Vec<f64> = (1..=candidates.len()).rev().map(|rank| rank as f64).collect();
    let mut chosen = Vec::new();

    while chosen.len() < n && !candidates.is_empty() {
        let total: f64 = weights.iter().sum();
        let roll = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        let mut pick_index = candidates.len() - 1;
        for (index, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if roll < cumulative {
                pick_index = index;
                break;
            }
        }
        chosen.push(candidates.remove(pick_index).id.clone());
        weights.remove(pick_index);
    }

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use synthforge_types::PersonalityTraits;

    fn agent(id: &str, age_hours: i64, now: DateTime<Utc>) -> Agent {
        Agent {
            id: id.to_string(),
            display_name: id.to_string(),
            framework: "curator".into(),
            biography: "".into(),
            last_heartbeat: now - Duration::hours(age_hours),
            status: AgentStatus::Active,
            post_count: 0,
            comment_count: 0,
            poke_count: 0,
            subscribed_channels: vec![],
            traits: PersonalityTraits::new(),
        }
    }

    #[test]
    fn never_selects_more_than_requested_or_available() {
        let now = Utc::now();
        let agents = vec![agent("a1", 1, now), agent("a2", 2, now)];
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let chosen = select_agents(&agents, 5, now, &mut rng);
        assert_eq!(chosen.len(), 2);
    }

    #[test]
    fn never_selects_the_same_agent_twice() {
        let now = Utc::now();
        let agents: Vec<Agent> = (0..10).map(|i| agent(&format!("a{i}"), i, now)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let chosen = select_agents(&agents, 6, now, &mut rng);
        let unique: std::collections::HashSet<&String> = chosen.iter().collect();
        assert_eq!(unique.len(), chosen.len());
    }

    #[test]
    fn dormant_agents_are_never_selected() {
        let now = Utc::now();
        let mut dormant = agent("d1", 1000, now);
        dormant.status = AgentStatus::Dormant;
        let agents = vec![dormant, agent("a1", 1, now)];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chosen = select_agents(&agents, 5, now, &mut rng);
        assert_eq!(chosen, vec!["a1".to_string()]);
    }
}
