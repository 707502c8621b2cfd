//! Decision-kernel errors. Per-cycle selection itself never throws — an
//! unsatisfiable constraint yields a `noop` task — these are strictly load-time
//! validation failures for archetype definitions.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum DecisionError {
    #[error("archetype `{name}` action weights sum to {sum:.4}, must be within 0.01 of 1.0")]
    WeightsNotNormalized { name: String, sum: f64 },
}
