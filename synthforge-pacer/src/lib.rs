//! Process-global minimum-interval gate for outbound forge-API mutations.
//!
//! At most one outbound mutation may issue per `T_gap` across all worker streams
//! in the process. Read calls are never paced. The pacer is an explicit collaborator
//! passed by construction — never a process-global singleton — so tests and `--dry-run`
//! runs can swap in a pacer with different timing guarantees.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Blocks until it is this caller's turn to issue a forge mutation.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Blocks until at least the pacer's gap has elapsed since the most recent
    /// successful acquisition, then records a new timestamp and returns.
    async fn acquire(&self);
}

/// Mutex-guarded last-issued timestamp plus an async sleep. The real pacer used in
/// production: construct one and share it (via `Arc`) across every worker stream in
/// a cycle.
pub struct RealPacer {
    gap: Duration,
    last: Mutex<Option<Instant>>,
}

impl RealPacer {
    pub fn new(gap: Duration) -> Self {
        Self {
            gap,
            last: Mutex::new(None),
        }
    }

    pub fn shared(gap: Duration) -> Arc<Self> {
        Arc::new(Self::new(gap))
    }
}

#[async_trait]
impl Pacer for RealPacer {
    async fn acquire(&self) {
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.gap {
                let remaining = self.gap - elapsed;
                trace!(?remaining, "pacer sleeping");
                tokio::time::sleep(remaining).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// No-op pacer: every `acquire()` returns immediately. Used by `--dry-run` (reads are
/// already unpaced, so a dry run's read-only forge decorator never calls a pacer at
/// all, but this exists for tests that construct a pipeline without caring about
/// timing) and most unit tests that don't assert ordering.
#[derive(Default)]
pub struct NullPacer;

#[async_trait]
impl Pacer for NullPacer {
    async fn acquire(&self) {}
}

/// Like `RealPacer` but with a configurable, typically near-zero gap — used by tests
/// that must assert mutation ordering without paying for a real T_gap-sized sleep.
pub struct FastPacer {
    inner: RealPacer,
}

impl FastPacer {
    pub fn new(gap: Duration) -> Self {
        Self {
            inner: RealPacer::new(gap),
        }
    }
}

#[async_trait]
impl Pacer for FastPacer {
    async fn acquire(&self) {
        self.inner.acquire().await
    }
}
