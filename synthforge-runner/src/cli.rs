//! CLI surface (C14): exactly the flags and subcommands named in the tunables table,
//! plus `once` (single cycle, for operators and CI) and `reconcile-drift` (out-of-band
//! drift repair against the forge's own truth).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "synthforge")]
#[command(about = "Drives synthetic agents through a forge repository, one reconciled cycle at a time")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Number of worker streams per cycle.
    #[arg(long, value_name = "K")]
    pub streams: Option<u32>,

    /// Number of agents considered per cycle.
    #[arg(long, value_name = "N")]
    pub agents: Option<u32>,

    /// Number of cycles to run before exiting (0 = unbounded). Ignored by `once`.
    #[arg(long, value_name = "C", default_value_t = 0)]
    pub cycles: u32,

    /// Seconds between cycles.
    #[arg(long, value_name = "S")]
    pub interval: Option<u64>,

    /// Disable all forge writes and the safe-commit push; every mutation task is
    /// recorded as a skipped result instead.
    #[arg(long)]
    pub dry_run: bool,

    /// Run the reconciler but skip the safe-commit protocol entirely.
    #[arg(long)]
    pub no_push: bool,

    /// State repository root (a local clone of the shared state repository).
    #[arg(long, value_name = "DIR", default_value = "./state")]
    pub state_dir: PathBuf,

    /// Path checked before every cycle; its presence triggers graceful shutdown.
    #[arg(long, value_name = "PATH", default_value = "./STOP")]
    pub stop_file: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run exactly one cycle and exit.
    Once,
    /// Reconcile local state against the forge's own post list out of band.
    ReconcileDrift,
}
