//! `async-openai`-backed provider implementation.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::{validate_response, LlmClient, LlmResponse, PromptBundle};

/// Wraps one OpenAI-compatible endpoint (official API or any compatible provider
/// reachable with a base URL override) as one link in the provider chain.
pub struct OpenAiClient {
    name: String,
    model: String,
    client: Client<OpenAIConfig>,
}

impl OpenAiClient {
    pub fn new(name: impl Into<String>, model: impl Into<String>, config: OpenAIConfig) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &PromptBundle) -> Result<LlmResponse, ProviderError> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.system_prompt.clone())
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?
            .into();
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.context.clone())
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?
            .into();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .max_tokens(prompt.max_tokens)
            .messages(vec![system, user])
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(classify_openai_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let parsed = validate_response(&content, prompt.schema.as_ref())?;
        Ok(LlmResponse {
            content,
            parsed,
            provider_name: self.name.clone(),
        })
    }
}

/// Maps the client's transport-level error into our taxonomy. `async-openai` does not
/// expose a typed status code on every variant, so this pattern-matches on the
/// stringified error as a best effort; HTTP-layer errors are classified transient.
fn classify_openai_error(error: async_openai::error::OpenAIError) -> ProviderError {
    let message = error.to_string();
    let lowercased = message.to_ascii_lowercase();
    if lowercased.contains("401") || lowercased.contains("unauthorized") || lowercased.contains("invalid api key") {
        ProviderError::Auth(message)
    } else if lowercased.contains("429") || lowercased.contains("rate limit") {
        ProviderError::RateLimited(message)
    } else if lowercased.contains("timed out") || lowercased.contains("timeout") {
        ProviderError::Timeout(message)
    } else {
        ProviderError::Transient(message)
    }
}
