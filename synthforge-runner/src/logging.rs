//! Logging initialization (C13). Unlike the chat-oriented CLIs in this workspace,
//! the runner is a long-lived daemon: logs always go to stdout, span-correlated, so an
//! external supervisor (systemd, a process manager) can capture them directly.
//!
//! Reads `RUST_LOG`, defaulting to `info` for the engine's own targets and `warn` for
//! dependencies.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,octocrab=warn,hyper_util=warn"));

    let layer = tracing_subscriber::fmt::layer()
        .event_format(crate::log_format::TextWithSpanIds::new())
        .with_writer(std::io::stdout)
        .with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
}
