//! Maps collaborator error types onto the result record's failure taxonomy.

use synthforge_forge::ForgeError;
use synthforge_llm::ChainError;
use synthforge_types::FailureKind;

pub fn from_chain_error(error: ChainError) -> FailureKind {
    match error {
        ChainError::AllRateLimited => FailureKind::LlmUnavailable {
            detail: "every configured provider is rate-limited".to_string(),
        },
        ChainError::NoProviders => FailureKind::LlmUnavailable {
            detail: "no providers configured".to_string(),
        },
        ChainError::Exhausted { last } => FailureKind::LlmMalformedOutput {
            detail: last.to_string(),
        },
    }
}

pub fn from_forge_error(error: ForgeError) -> FailureKind {
    match error {
        ForgeError::RateLimited(detail) => FailureKind::ForgeRateLimited { detail },
        ForgeError::Transient(detail) => FailureKind::ForgeTransient { detail },
        ForgeError::Auth(detail) => FailureKind::ForgeAuth { detail },
        ForgeError::NotFound(detail) | ForgeError::Unavailable(detail) => FailureKind::Unknown { detail },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_forge_error_maps_to_rate_limited_failure() {
        let failure = from_forge_error(ForgeError::RateLimited("429".into()));
        assert!(matches!(failure, FailureKind::ForgeRateLimited { .. }));
    }

    #[test]
    fn no_providers_maps_to_llm_unavailable() {
        let failure = from_chain_error(ChainError::NoProviders);
        assert!(matches!(failure, FailureKind::LlmUnavailable { .. }));
    }
}
