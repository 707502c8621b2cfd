//! A scriptable in-memory provider, used by the chain's own tests and by higher-level
//! crates (decision kernel, worker stream) that need a deterministic LLM for tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ProviderError;
use crate::provider::{validate_response, LlmClient, LlmResponse, PromptBundle};

type Behavior = Box<dyn Fn() -> Result<String, ProviderError> + Send + Sync>;

pub struct MockLlm {
    name: String,
    behavior: Behavior,
}

impl MockLlm {
    pub fn new(name: impl Into<String>, behavior: impl Fn() -> Result<String, ProviderError> + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            behavior: Box::new(behavior),
        }
    }

    pub fn always_err(name: impl Into<String>, make_err: impl Fn() -> ProviderError + Send + Sync + 'static) -> Self {
        Self::new(name, move || Err(make_err()))
    }

    /// Returns `responses` one at a time, in order, cycling through a shared index;
    /// once exhausted it keeps returning the last response.
    pub fn scripted(name: impl Into<String>, responses: Vec<String>) -> Self {
        let index = Mutex::new(0usize);
        let name = name.into();
        Self {
            name,
            behavior: Box::new(move || {
                let mut guard = index
                    .try_lock()
                    .expect("mock is single-threaded within one chain attempt");
                let i = (*guard).min(responses.len().saturating_sub(1));
                *guard += 1;
                Ok(responses
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| "".to_string()))
            }),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &PromptBundle) -> Result<LlmResponse, ProviderError> {
        let content = (self.behavior)()?;
        let parsed = validate_response(&content, prompt.schema.as_ref())?;
        Ok(LlmResponse {
            content,
            parsed,
            provider_name: self.name.clone(),
        })
    }
}
