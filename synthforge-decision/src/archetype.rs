//! Archetypes: per-persona weight tables the decision kernel samples from.

use std::collections::BTreeMap;

use crate::error::DecisionError;

const WEIGHT_TOLERANCE: f64 = 0.01;

/// The five kinds of intended action the decision kernel ever samples
/// (`noop` stands in for deliberate lurking).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Post,
    Comment,
    Vote,
    Poke,
    Noop,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Post,
        ActionKind::Comment,
        ActionKind::Vote,
        ActionKind::Poke,
        ActionKind::Noop,
    ];
}

/// A persona's behavioral profile: how it splits its attention across action kinds
/// and channels, and whether it's a chaos-style archetype that also picks a content
/// mode for posts. `action_weights` must sum to 1 within 0.01 — enforced at
/// construction so a malformed archetype definition never reaches the sampler.
#[derive(Clone, Debug)]
pub struct Archetype {
    pub name: String,
    pub action_weights: BTreeMap<ActionKind, f64>,
    pub channel_affinity: BTreeMap<String, f64>,
    pub is_chaos: bool,
}

impl Archetype {
    pub fn new(
        name: impl Into<String>,
        action_weights: BTreeMap<ActionKind, f64>,
        channel_affinity: BTreeMap<String, f64>,
        is_chaos: bool,
    ) -> Result<Self, DecisionError> {
        let name = name.into();
        let sum: f64 = action_weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(DecisionError::WeightsNotNormalized { name, sum });
        }
        Ok(Self {
            name,
            action_weights,
            channel_affinity,
            is_chaos,
        })
    }

    pub fn weight_for(&self, kind: ActionKind) -> f64 {
        self.action_weights.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn affinity_for(&self, channel: &str) -> f64 {
        self.channel_affinity.get(channel).copied().unwrap_or(0.0)
    }
}
