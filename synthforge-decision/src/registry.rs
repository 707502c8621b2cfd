//! Maps an agent's `framework` tag to its [`Archetype`] weight table. The actual
//! persona/seed content that colors prompts is out of scope here (supplied by the
//! worker stream's prompt builder) — this registry only carries the numeric policy
//! the kernel samples from.

use std::collections::BTreeMap;

use crate::archetype::{ActionKind, Archetype};

fn weights(pairs: &[(ActionKind, f64)]) -> BTreeMap<ActionKind, f64> {
    pairs.iter().copied().collect()
}

fn affinity(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Built-in archetypes. Any `framework` tag not in this table falls back to
/// [`default_archetype`] rather than failing the cycle.
pub struct ArchetypeRegistry {
    archetypes: BTreeMap<String, Archetype>,
}

impl ArchetypeRegistry {
    pub fn standard() -> Self {
        let mut archetypes = BTreeMap::new();
        for archetype in [philosopher(), curator(), chaos(), lurker_leaning()] {
            archetypes.insert(archetype.name.clone(), archetype);
        }
        Self { archetypes }
    }

    pub fn resolve(&self, framework: &str) -> &Archetype {
        self.archetypes
            .get(framework)
            .unwrap_or_else(|| self.archetypes.get("curator").expect("curator is always registered"))
    }
}

fn philosopher() -> Archetype {
    Archetype::new(
        "philosopher",
        weights(&[
            (ActionKind::Post, 0.20),
            (ActionKind::Comment, 0.45),
            (ActionKind::Vote, 0.15),
            (ActionKind::Poke, 0.05),
            (ActionKind::Noop, 0.15),
        ]),
        affinity(&[("philosophy", 0.9), ("general", 0.4)]),
        false,
    )
    .expect("philosopher weights sum to 1")
}

fn curator() -> Archetype {
    Archetype::new(
        "curator",
        weights(&[
            (ActionKind::Post, 0.30),
            (ActionKind::Comment, 0.25),
            (ActionKind::Vote, 0.30),
            (ActionKind::Poke, 0.05),
            (ActionKind::Noop, 0.10),
        ]),
        affinity(&[("general", 0.6), ("showcase", 0.8)]),
        false,
    )
    .expect("curator weights sum to 1")
}

fn chaos() -> Archetype {
    Archetype::new(
        "chaos",
        weights(&[
            (ActionKind::Post, 0.35),
            (ActionKind::Comment, 0.20),
            (ActionKind::Vote, 0.15),
            (ActionKind::Poke, 0.20),
            (ActionKind::Noop, 0.10),
        ]),
        affinity(&[("general", 0.7), ("off-topic", 0.9)]),
        true,
    )
    .expect("chaos weights sum to 1")
}

fn lurker_leaning() -> Archetype {
    Archetype::new(
        "lurker",
        weights(&[
            (ActionKind::Post, 0.05),
            (ActionKind::Comment, 0.10),
            (ActionKind::Vote, 0.20),
            (ActionKind::Poke, 0.05),
            (ActionKind::Noop, 0.60),
        ]),
        affinity(&[("general", 0.5)]),
        false,
    )
    .expect("lurker weights sum to 1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_framework_falls_back_to_curator() {
        let registry = ArchetypeRegistry::standard();
        assert_eq!(registry.resolve("no-such-framework").name, "curator");
    }

    #[test]
    fn known_framework_resolves_by_name() {
        let registry = ArchetypeRegistry::standard();
        assert_eq!(registry.resolve("chaos").name, "chaos");
        assert!(registry.resolve("chaos").is_chaos);
    }
}
