//! The continuous runner (C11): invokes one cycle on a fixed cadence, checking for a
//! stop-file or process signal between iterations, running the periodic resurrection
//! check, and triggering the trending sibling every `J`-th cycle.

use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use synthforge_orchestrator::{run_cycle, CycleConfig};
use synthforge_reconciler::reconcile_with_remote;

use crate::bootstrap::Engine;
use crate::cli::Args;
use crate::error::RunError;
use crate::resurrection::resurrect_eligible;
use crate::trending::{NoopTrendingSibling, TrendingSibling};

/// `build_under_discussed`'s own window is 72h; the runner mirrors that constant here
/// rather than inventing a separate tunable for it.
const RECENT_WINDOW: ChronoDuration = ChronoDuration::hours(72);

fn std_to_chrono(duration: std::time::Duration) -> ChronoDuration {
    ChronoDuration::from_std(duration).unwrap_or_else(|_| ChronoDuration::zero())
}

fn cycle_config(engine: &Engine, args: &Args, seed: u64) -> CycleConfig {
    CycleConfig {
        streams: args.streams.unwrap_or(engine.settings.streams) as usize,
        agents_per_cycle: args.agents.unwrap_or(engine.settings.agents_per_cycle) as usize,
        seed,
        similarity_threshold: engine.settings.dedup_similarity,
        dedup_recent_posts: engine.settings.dedup_recent_posts as usize,
        t_self_thread: std_to_chrono(engine.settings.t_self_thread),
        recent_window: RECENT_WINDOW,
        k_resurrect: engine.settings.resurrect_pokers as usize,
        t_retain: std_to_chrono(engine.settings.t_retain),
        t_summon: std_to_chrono(engine.settings.t_summon),
        skip_push: args.no_push || args.dry_run,
    }
}

fn listen_for_shutdown() -> CancellationToken {
    let token = CancellationToken::new();
    let watched = token.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        watched.cancel();
    });
    token
}

/// Runs exactly one cycle, applying the resurrection check first. Used by both `once`
/// and the continuous loop's body.
#[instrument(skip_all, fields(cycle_index))]
async fn run_one_cycle(
    engine: &Engine,
    args: &Args,
    cancellation: CancellationToken,
    seed: u64,
) -> Result<(), RunError> {
    maybe_resurrect(engine, args.no_push || args.dry_run).await?;

    let config = cycle_config(engine, args, seed);
    let now = Utc::now();

    let outcome = run_cycle(
        &engine.store,
        engine.forge.clone(),
        engine.llm.clone(),
        engine.commit_protocol.clone(),
        engine.commit_token.clone(),
        &engine.registry,
        &config,
        cancellation,
        now,
    )
    .await?;

    info!(
        results = outcome.results.len(),
        commit = ?outcome.commit,
        "cycle complete"
    );
    Ok(())
}

async fn maybe_resurrect(engine: &Engine, skip_push: bool) -> Result<(), RunError> {
    let snapshot = engine.store.load_snapshot().await?;
    let (snapshot, changed) = resurrect_eligible(
        snapshot,
        engine.settings.resurrect_pokers,
        std_to_chrono(engine.settings.t_summon),
        Utc::now(),
    );
    if !changed {
        return Ok(());
    }
    engine.store.write_snapshot(&snapshot).await?;
    if skip_push {
        return Ok(());
    }

    let files = synthforge_orchestrator::snapshot_to_file_changes(&snapshot);
    let commit_protocol = engine.commit_protocol.clone();
    let token = engine.commit_token.clone();
    let message = "resurrection check: promote resolved summons".to_string();
    let outcome = tokio::task::spawn_blocking(move || {
        commit_protocol.safe_commit(&files, &message, token, &synthforge_orchestrator::validate_state_file)
    })
    .await
    .expect("resurrection commit task panicked")?;
    info!(?outcome, "resurrection check resolved at least one summon");
    Ok(())
}

pub async fn run_once(engine: &Engine, args: &Args) -> Result<(), RunError> {
    let seed: u64 = rand::thread_rng().gen();
    run_one_cycle(engine, args, CancellationToken::new(), seed).await
}

pub async fn run_continuous(engine: &Engine, args: &Args) -> Result<(), RunError> {
    let shutdown = listen_for_shutdown();
    let trending: Box<dyn TrendingSibling> = match std::env::var("SYNTHFORGE_TRENDING_COMMAND") {
        Ok(command) => Box::new(crate::trending::ExternalCommandTrendingSibling { command, args: vec![] }),
        Err(_) => Box::new(NoopTrendingSibling),
    };

    let base_seed: u64 = std::env::var("SYNTHFORGE_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| rand::thread_rng().gen());

    let mut cycle_index: u64 = 0;
    loop {
        if args.stop_file.exists() {
            info!(path = ?args.stop_file, "stop file present, shutting down");
            break;
        }
        if shutdown.is_cancelled() {
            info!("shutdown signal received, finishing in-flight work and exiting");
            break;
        }

        let seed = base_seed.wrapping_add(cycle_index);
        run_one_cycle(engine, args, shutdown.clone(), seed).await?;

        cycle_index += 1;
        if cycle_index % u64::from(engine.settings.trending_every) == 0 {
            trending.invoke();
        }

        if args.cycles != 0 && cycle_index >= args.cycles as u64 {
            info!(cycles = cycle_index, "requested cycle count reached, exiting");
            break;
        }

        let interval = args.interval.map(std::time::Duration::from_secs).unwrap_or(engine.settings.t_cycle);
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.cancelled() => {
                info!("shutdown signal received during sleep, exiting");
                break;
            }
        }
    }
    Ok(())
}

pub async fn run_reconcile_drift(engine: &Engine) -> Result<(), RunError> {
    let snapshot = engine.store.load_snapshot().await?;
    let channels: Vec<String> = snapshot.channels.channels.iter().map(|c| c.slug.clone()).collect();

    let mut forge_truth = Vec::new();
    for channel in &channels {
        // `OctocrabForgeClient` narrows this to a `u8` page size internally, so a
        // drift repair run only ever sees a channel's most recent 255 discussions.
        let posts = engine
            .forge
            .list_recent_discussions(channel, 255)
            .await
            .map_err(|e| RunError::ForgeUnreachable(e.to_string()))?;
        forge_truth.extend(posts);
    }

    let repaired = reconcile_with_remote(snapshot, &forge_truth, Utc::now());
    engine.store.write_snapshot(&repaired).await?;

    let files = synthforge_orchestrator::snapshot_to_file_changes(&repaired);
    let commit_protocol = engine.commit_protocol.clone();
    let token = engine.commit_token.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        commit_protocol.safe_commit(
            &files,
            "reconcile-drift: backfill from forge truth",
            token,
            &synthforge_orchestrator::validate_state_file,
        )
    })
    .await
    .expect("reconcile-drift commit task panicked")?;
    info!(?outcome, "reconcile-drift complete");
    Ok(())
}
