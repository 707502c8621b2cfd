//! Ordered provider chain: failover with per-provider retry/backoff.

use std::sync::Arc;
use std::time::Duration;

use tracing::{instrument, warn};

use crate::error::{is_rate_limited, should_retry_same_provider, ChainError, ProviderError};
use crate::provider::{LlmClient, LlmResponse, PromptBundle};

/// Appends a schema reminder to the system prompt for the single parse-retry a
/// malformed response earns on its originating provider, per the chain's
/// reprompt-once-then-failover contract.
fn with_schema_reminder(prompt: &PromptBundle) -> PromptBundle {
    let mut reminded = prompt.clone();
    if let Some(schema) = &prompt.schema {
        reminded.system_prompt = format!(
            "{}\n\nYour previous response did not match the required JSON schema. Respond again with ONLY valid JSON matching this schema: {schema}",
            prompt.system_prompt
        );
    }
    reminded
}

/// Drives a list of providers in order. For each provider: up to `retries_per_provider`
/// attempts with exponential backoff between attempts for retryable failure classes
/// (rate-limited, transient, timeout); `auth` and `malformed-schema` skip straight to
/// the next provider; `unavailable` skips immediately without consuming a retry.
pub struct ProviderChain {
    providers: Vec<Arc<dyn LlmClient>>,
    retries_per_provider: u32,
    backoff_base: Duration,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn LlmClient>>, retries_per_provider: u32, backoff_base: Duration) -> Self {
        Self {
            providers,
            retries_per_provider,
            backoff_base,
        }
    }

    #[instrument(skip(self, prompt), fields(providers = self.providers.len()))]
    pub async fn generate(&self, prompt: &PromptBundle) -> Result<LlmResponse, ChainError> {
        if self.providers.is_empty() {
            return Err(ChainError::NoProviders);
        }

        let mut last_error: Option<ProviderError> = None;
        let mut all_rate_limited = true;

        for provider in &self.providers {
            match self.try_provider(provider.as_ref(), prompt).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if !is_rate_limited(&error) {
                        all_rate_limited = false;
                    }
                    warn!(provider = provider.name(), %error, "provider exhausted, moving to next");
                    last_error = Some(error);
                }
            }
        }

        if all_rate_limited {
            return Err(ChainError::AllRateLimited);
        }
        Err(ChainError::Exhausted {
            last: last_error.expect("loop ran at least once"),
        })
    }

    async fn try_provider(
        &self,
        provider: &dyn LlmClient,
        prompt: &PromptBundle,
    ) -> Result<LlmResponse, ProviderError> {
        let mut attempt = 0;
        loop {
            match provider.complete(prompt).await {
                Ok(response) => return Ok(response),
                Err(ProviderError::MalformedSchema(detail)) => {
                    warn!(provider = provider.name(), %detail, "malformed output, reprompting once with a schema reminder");
                    return provider.complete(&with_schema_reminder(prompt)).await;
                }
                Err(error) => {
                    if matches!(error, ProviderError::Unavailable(_)) {
                        return Err(error);
                    }
                    if !should_retry_same_provider(&error) || attempt + 1 >= self.retries_per_provider {
                        return Err(error);
                    }
                    let backoff = self.backoff_base * 2u32.pow(attempt);
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
