//! Maps each state-file type to the `_meta.count` it must satisfy.

use synthforge_types::{
    AgentsFile, ChangesFile, ChannelsFile, GhostMemoryFile, Meta, PokesFile, PostedLogFile,
    PredictionsFile, SocialGraphFile, StatsFile, SummonsFile, TrendingFile,
};

/// A state file whose `_meta.count` is checked against its own entry count on every
/// write (§4.1: "every write validates `_meta.count` against the enumerated entries
/// it summarizes; mismatch fails fast").
pub trait CountedFile {
    fn meta(&self) -> &Meta;
    fn actual_count(&self) -> usize;
}

impl CountedFile for AgentsFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.agents.len()
    }
}

impl CountedFile for ChannelsFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.channels.len()
    }
}

/// `stats.json` has no enumerable collection of its own; its count always trivially
/// matches a single summary record.
impl CountedFile for StatsFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        1
    }
}

impl CountedFile for PostedLogFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.posts.len()
    }
}

impl CountedFile for ChangesFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.entries.len()
    }
}

impl CountedFile for TrendingFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.entries.len()
    }
}

impl CountedFile for PokesFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.pokes.len()
    }
}

impl CountedFile for SummonsFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.summons.len()
    }
}

impl CountedFile for PredictionsFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.predictions.len()
    }
}

impl CountedFile for SocialGraphFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.edges.len()
    }
}

impl CountedFile for GhostMemoryFile {
    fn meta(&self) -> &Meta {
        &self.meta
    }
    fn actual_count(&self) -> usize {
        self.entries.len()
    }
}
