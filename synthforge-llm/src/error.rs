//! Error taxonomy for the LLM backend chain.

use thiserror::Error;

/// Failure classes a single provider call can surface. The chain's retry/backoff and
/// failover decisions are driven entirely by matching on these.
#[derive(Clone, Debug, Error)]
pub enum ProviderError {
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transient error: {0}")]
    Transient(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("auth failed: {0}")]
    Auth(String),
    #[error("response did not match the declared schema: {0}")]
    MalformedSchema(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Failures worth retrying the *same* provider again (with backoff).
    fn retry_same_provider(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_) | ProviderError::Transient(_) | ProviderError::Timeout(_)
        )
    }

    fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited(_))
    }
}

/// What the chain reports to its caller after exhausting every provider. Distinguishes
/// rate-limiting from other terminal causes so a caller can choose to downgrade a task
/// to `noop` rather than fabricate content.
#[derive(Clone, Debug, Error)]
pub enum ChainError {
    #[error("every configured provider is rate-limited")]
    AllRateLimited,
    #[error("no providers configured")]
    NoProviders,
    #[error("all providers exhausted, last error: {last}")]
    Exhausted { last: ProviderError },
}

pub(crate) fn should_retry_same_provider(error: &ProviderError) -> bool {
    error.retry_same_provider()
}

pub(crate) fn is_rate_limited(error: &ProviderError) -> bool {
    error.is_rate_limited()
}
