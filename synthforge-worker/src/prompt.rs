//! Assembles the [`PromptBundle`] handed to the LLM chain for each mutating action.
//! Every schema requires exactly the fields the caller extracts from `parsed` — a
//! provider that can't satisfy the schema never reaches the forge.

use serde_json::json;
use synthforge_llm::PromptBundle;
use synthforge_types::Agent;

const MAX_TOKENS: u32 = 600;

fn persona_system_prompt(agent: &Agent) -> String {
    format!(
        "You are {}, a synthetic forum persona with the archetype `{}`. Biography: {}. \
         Stay in character. Respond with nothing but the requested JSON object.",
        agent.display_name, agent.framework, agent.biography
    )
}

pub fn post_prompt(agent: &Agent, channel: &str, content_mode: Option<&str>) -> PromptBundle {
    let mode_hint = content_mode
        .map(|m| format!(" Write in the `{m}` content mode."))
        .unwrap_or_default();
    PromptBundle {
        system_prompt: persona_system_prompt(agent),
        context: format!(
            "Draft a new discussion post for the `{channel}` channel.{mode_hint} \
             Respond as JSON: {{\"title\": ..., \"body\": ...}}."
        ),
        max_tokens: MAX_TOKENS,
        schema: Some(json!({"required": ["title", "body"]})),
    }
}

pub fn comment_prompt(agent: &Agent, thread_context: &str) -> PromptBundle {
    PromptBundle {
        system_prompt: persona_system_prompt(agent),
        context: format!(
            "Write a comment reacting to this thread:\n{thread_context}\n\
             Respond as JSON: {{\"body\": ...}}."
        ),
        max_tokens: MAX_TOKENS,
        schema: Some(json!({"required": ["body"]})),
    }
}

pub fn poke_prompt(agent: &Agent, target_agent_id: &str) -> PromptBundle {
    PromptBundle {
        system_prompt: persona_system_prompt(agent),
        context: format!(
            "Write a short, in-character note poking `{target_agent_id}` to come back and \
             participate. Respond as JSON: {{\"note\": ...}}."
        ),
        max_tokens: 200,
        schema: Some(json!({"required": ["note"]})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use synthforge_types::{AgentStatus, PersonalityTraits};

    fn agent() -> Agent {
        Agent {
            id: "a1".into(),
            display_name: "A1".into(),
            framework: "curator".into(),
            biography: "collects links".into(),
            last_heartbeat: Utc::now(),
            status: AgentStatus::Active,
            post_count: 0,
            comment_count: 0,
            poke_count: 0,
            subscribed_channels: vec![],
            traits: PersonalityTraits::new(),
        }
    }

    #[test]
    fn post_prompt_requires_title_and_body() {
        let prompt = post_prompt(&agent(), "code", Some("hot-take"));
        let required = prompt.schema.unwrap()["required"].clone();
        assert_eq!(required, serde_json::json!(["title", "body"]));
        assert!(prompt.context.contains("hot-take"));
    }

    #[test]
    fn comment_prompt_requires_body_only() {
        let prompt = comment_prompt(&agent(), "thread text");
        let required = prompt.schema.unwrap()["required"].clone();
        assert_eq!(required, serde_json::json!(["body"]));
    }
}
