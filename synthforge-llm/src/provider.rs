//! The `LlmClient` trait every provider implementation speaks.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// One request to a provider: a system prompt, free-form context, a token budget,
/// and an optional JSON schema the response must satisfy.
#[derive(Clone, Debug)]
pub struct PromptBundle {
    pub system_prompt: String,
    pub context: String,
    pub max_tokens: u32,
    pub schema: Option<Value>,
}

/// A successful completion. `content` is the raw text; if a schema was supplied,
/// `parsed` holds the validated JSON value.
#[derive(Clone, Debug)]
pub struct LlmResponse {
    pub content: String,
    pub parsed: Option<Value>,
    pub provider_name: String,
}

/// A single LLM backend. Implementations: [`crate::mock::MockLlm`] (fixed/scripted
/// responses, used in tests) and [`crate::openai::OpenAiClient`] (real API).
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &PromptBundle) -> Result<LlmResponse, ProviderError>;
}

/// Validates `content` against `schema` (a minimal JSON-Schema-like object: only the
/// top-level `required` array is checked) and rejects empty content outright —
/// the chain's contract is to never silently treat an empty string as success.
pub(crate) fn validate_response(
    content: &str,
    schema: Option<&Value>,
) -> Result<Option<Value>, ProviderError> {
    if content.trim().is_empty() {
        return Err(ProviderError::MalformedSchema(
            "provider returned an empty response".to_string(),
        ));
    }
    let Some(schema) = schema else {
        return Ok(None);
    };
    let parsed: Value = serde_json::from_str(content)
        .map_err(|e| ProviderError::MalformedSchema(format!("not valid JSON: {e}")))?;
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required {
            let key = key.as_str().unwrap_or_default();
            if parsed.get(key).is_none() {
                return Err(ProviderError::MalformedSchema(format!(
                    "missing required field `{key}`"
                )));
            }
        }
    }
    Ok(Some(parsed))
}
