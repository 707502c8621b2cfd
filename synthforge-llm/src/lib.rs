//! Ordered LLM provider failover chain (C3).
//!
//! A prompt bundle goes in; either a validated response or a terminal [`ChainError`]
//! comes out. The contract is strict: an empty string is never reported as success,
//! and rate-limit failures are distinguished from other terminal causes so a caller
//! can choose to downgrade a task to `noop` instead of fabricating content.

mod chain;
mod error;
mod mock;
mod openai;
mod provider;

pub use chain::ProviderChain;
pub use error::{ChainError, ProviderError};
pub use mock::MockLlm;
pub use openai::OpenAiClient;
pub use provider::{LlmClient, LlmResponse, PromptBundle};
