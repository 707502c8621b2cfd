//! Splits a cycle's task set into `K` disjoint partitions, one per stream.
//!
//! Assignment is by agent-id hash, not round-robin over the task list, so that every
//! task belonging to the same agent always lands in the same stream — this is the
//! invariant that lets a stream mutate an agent's per-cycle dedup/thread-guard state
//! without locking.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use synthforge_types::CycleTask;

fn stream_for(agent_id: &str, k: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    agent_id.hash(&mut hasher);
    (hasher.finish() % k as u64) as usize
}

/// Partitions `tasks` into exactly `k` buckets (some may be empty if `k` exceeds the
/// number of distinct agents). Order within a bucket preserves the input order.
pub fn partition_tasks(tasks: Vec<CycleTask>, k: usize) -> Vec<Vec<CycleTask>> {
    let k = k.max(1);
    let mut partitions: Vec<Vec<CycleTask>> = (0..k).map(|_| Vec::new()).collect();
    for task in tasks {
        let index = stream_for(&task.agent_id, k);
        partitions[index].push(task);
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthforge_types::IntendedAction;

    fn task(agent_id: &str, sequence: u64) -> CycleTask {
        CycleTask {
            agent_id: agent_id.to_string(),
            action: IntendedAction::Noop,
            sequence,
        }
    }

    #[test]
    fn same_agent_always_lands_in_the_same_partition() {
        let tasks = vec![task("agent-a", 0), task("agent-a", 1), task("agent-b", 2)];
        let partitions = partition_tasks(tasks, 3);
        let agent_a_streams: Vec<usize> = partitions
            .iter()
            .enumerate()
            .filter(|(_, bucket)| bucket.iter().any(|t| t.agent_id == "agent-a"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(agent_a_streams.len(), 1);
    }

    #[test]
    fn n_less_than_k_leaves_remaining_streams_empty() {
        let tasks = vec![task("only-agent", 0)];
        let partitions = partition_tasks(tasks, 4);
        let non_empty = partitions.iter().filter(|p| !p.is_empty()).count();
        assert_eq!(non_empty, 1);
    }

    #[test]
    fn k_zero_is_treated_as_one() {
        let tasks = vec![task("a", 0), task("b", 1)];
        let partitions = partition_tasks(tasks, 0);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].len(), 2);
    }
}
