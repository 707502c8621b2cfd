//! Wires every lower-level crate into one running engine: config, forge client, LLM
//! chain, safe-commit protocol, and archetype registry.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use octocrab::Octocrab;

use config::EngineSettings;
use synthforge_commit::SafeCommitProtocol;
use synthforge_decision::ArchetypeRegistry;
use synthforge_forge::{DryRunForgeClient, ForgeClient, OctocrabForgeClient};
use synthforge_llm::{LlmClient, OpenAiClient, ProviderChain};
use synthforge_pacer::{NullPacer, Pacer, RealPacer};
use synthforge_state::StateStore;

use crate::cli::Args;
use crate::error::RunError;

/// One provider slot: credentials and model come from a fixed pair of env vars so the
/// chain can skip a slot silently when its key is absent, per §4.3's failover contract.
struct ProviderSpec {
    name: &'static str,
    api_key_env: &'static str,
    base_url_env: &'static str,
    model_env: &'static str,
    default_model: &'static str,
}

const PROVIDER_SPECS: [ProviderSpec; 3] = [
    ProviderSpec {
        name: "openai-primary",
        api_key_env: "OPENAI_API_KEY",
        base_url_env: "OPENAI_BASE_URL",
        model_env: "OPENAI_MODEL",
        default_model: "gpt-4o-mini",
    },
    ProviderSpec {
        name: "openai-secondary",
        api_key_env: "SYNTHFORGE_PROVIDER_2_API_KEY",
        base_url_env: "SYNTHFORGE_PROVIDER_2_BASE_URL",
        model_env: "SYNTHFORGE_PROVIDER_2_MODEL",
        default_model: "gpt-4o-mini",
    },
    ProviderSpec {
        name: "openai-tertiary",
        api_key_env: "SYNTHFORGE_PROVIDER_3_API_KEY",
        base_url_env: "SYNTHFORGE_PROVIDER_3_BASE_URL",
        model_env: "SYNTHFORGE_PROVIDER_3_MODEL",
        default_model: "gpt-4o-mini",
    },
];

fn build_providers() -> Vec<Arc<dyn LlmClient>> {
    PROVIDER_SPECS
        .iter()
        .filter_map(|spec| {
            let api_key = std::env::var(spec.api_key_env).ok()?;
            let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
            if let Ok(base_url) = std::env::var(spec.base_url_env) {
                openai_config = openai_config.with_api_base(base_url);
            }
            let model = std::env::var(spec.model_env).unwrap_or_else(|_| spec.default_model.to_string());
            Some(Arc::new(OpenAiClient::new(spec.name, model, openai_config)) as Arc<dyn LlmClient>)
        })
        .collect()
}

pub struct Engine {
    pub settings: EngineSettings,
    pub store: StateStore,
    pub forge: Arc<dyn ForgeClient>,
    pub llm: Arc<ProviderChain>,
    pub commit_protocol: Arc<SafeCommitProtocol>,
    pub commit_token: String,
    pub registry: ArchetypeRegistry,
}

fn build_forge_client(dry_run: bool, settings: &EngineSettings) -> Result<(Arc<dyn ForgeClient>, String), RunError> {
    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| RunError::Config("GITHUB_TOKEN is required".to_string()))?;
    let owner = std::env::var("SYNTHFORGE_FORGE_OWNER")
        .map_err(|_| RunError::Config("SYNTHFORGE_FORGE_OWNER is required".to_string()))?;
    let repo = std::env::var("SYNTHFORGE_FORGE_REPO")
        .map_err(|_| RunError::Config("SYNTHFORGE_FORGE_REPO is required".to_string()))?;

    let client = Octocrab::builder()
        .personal_token(token.clone())
        .build()
        .map_err(|e| RunError::Config(format!("octocrab client: {e}")))?;

    let pacer: Arc<dyn Pacer> = if dry_run {
        Arc::new(NullPacer)
    } else {
        RealPacer::shared(settings.t_gap)
    };

    let client = OctocrabForgeClient::new(client, owner, repo, pacer);
    let forge: Arc<dyn ForgeClient> = if dry_run {
        Arc::new(DryRunForgeClient::new(client))
    } else {
        Arc::new(client)
    };
    Ok((forge, token))
}

/// Probes the forge with a single unpaced read so an unreachable host or a bad token
/// fails fast at startup instead of during the first cycle.
pub async fn check_forge_reachable(forge: &dyn ForgeClient) -> Result<(), RunError> {
    forge
        .list_recent_discussions("general", 1)
        .await
        .map(|_| ())
        .map_err(|e| RunError::ForgeUnreachable(e.to_string()))
}

pub fn boot(args: &Args) -> Result<Engine, RunError> {
    let settings = EngineSettings::from_env();
    let store = StateStore::new(args.state_dir.clone());

    let (forge, commit_token) = build_forge_client(args.dry_run, &settings)?;

    let providers = build_providers();
    if providers.is_empty() {
        return Err(RunError::NoProviders);
    }
    let llm = Arc::new(ProviderChain::new(providers, settings.llm_retries, settings.t_llm / settings.llm_retries.max(1)));

    let author_name = std::env::var("SYNTHFORGE_COMMIT_AUTHOR_NAME").unwrap_or_else(|_| "synthforge".to_string());
    let author_email = std::env::var("SYNTHFORGE_COMMIT_AUTHOR_EMAIL")
        .unwrap_or_else(|_| "synthforge@users.noreply.github.com".to_string());
    let remote_name = std::env::var("SYNTHFORGE_STATE_REMOTE").unwrap_or_else(|_| "origin".to_string());
    let branch = std::env::var("SYNTHFORGE_STATE_BRANCH").unwrap_or_else(|_| "main".to_string());

    let commit_protocol = Arc::new(SafeCommitProtocol::new(
        args.state_dir.clone(),
        remote_name,
        branch,
        author_name,
        author_email,
        settings.commit_max_attempts,
    ));

    let registry = ArchetypeRegistry::standard();

    Ok(Engine {
        settings,
        store,
        forge,
        llm,
        commit_protocol,
        commit_token,
        registry,
    })
}
