//! Binary entry point: bootstraps config/logging, wires the engine, and dispatches
//! to the requested run mode. `anyhow`/`Box<dyn Error>` are deliberately confined to
//! this file — every library crate below it returns its own typed error.

mod bootstrap;
mod cli;
mod error;
mod log_format;
mod logging;
mod resurrection;
mod run_loop;
mod trending;

use clap::Parser;

use cli::{Args, Command};
use error::RunError;

async fn run(args: Args) -> Result<(), RunError> {
    let engine = bootstrap::boot(&args)?;
    bootstrap::check_forge_reachable(engine.forge.as_ref()).await?;

    match &args.command {
        Some(Command::Once) => run_loop::run_once(&engine, &args).await,
        Some(Command::ReconcileDrift) => run_loop::run_reconcile_drift(&engine).await,
        None => run_loop::run_continuous(&engine, &args).await,
    }
}

fn main() {
    let _ = dotenv::dotenv();
    if let Err(error) = config::load_and_apply("synthforge", None) {
        eprintln!("config error: {error}");
        std::process::exit(1);
    }
    logging::init();

    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().expect("build tokio runtime");
    let result = runtime.block_on(run(args));

    match result {
        Ok(()) => {}
        Err(error) => {
            tracing::error!(%error, "runner exiting with error");
            std::process::exit(error.exit_code());
        }
    }
}
