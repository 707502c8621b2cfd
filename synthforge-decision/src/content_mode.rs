//! Content modes chaos-style archetypes pick between for a post.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentMode {
    DebateStarter,
    StoryPrompt,
    ThoughtExperiment,
    Challenge,
    Paradox,
    Game,
    HotTake,
}

impl ContentMode {
    pub const ALL: [ContentMode; 7] = [
        ContentMode::DebateStarter,
        ContentMode::StoryPrompt,
        ContentMode::ThoughtExperiment,
        ContentMode::Challenge,
        ContentMode::Paradox,
        ContentMode::Game,
        ContentMode::HotTake,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentMode::DebateStarter => "debate-starter",
            ContentMode::StoryPrompt => "story-prompt",
            ContentMode::ThoughtExperiment => "thought-experiment",
            ContentMode::Challenge => "challenge",
            ContentMode::Paradox => "paradox",
            ContentMode::Game => "game",
            ContentMode::HotTake => "hot-take",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_seven_modes_have_distinct_tags() {
        let tags: std::collections::HashSet<_> = ContentMode::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(tags.len(), 7);
    }
}
