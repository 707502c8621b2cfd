//! Per-agent action selection: deterministic given `(agent, pulse, seed)`.
//!
//! An [`Archetype`] describes how a persona splits its attention across action
//! kinds and channels; [`decide`] samples one [`synthforge_types::CycleTask`] from
//! it, applying dedup and same-thread guards along the way. Selection never fails —
//! an unsatisfiable constraint degrades to a `noop` task rather than an error.

mod archetype;
mod content_mode;
mod dedup;
mod error;
mod kernel;
mod registry;

pub use archetype::{ActionKind, Archetype};
pub use content_mode::ContentMode;
pub use dedup::{is_duplicate, same_thread_guard, title_similarity};
pub use error::DecisionError;
pub use kernel::{decide, post_similarity_score, recheck_post_dedup, DecisionInput};
pub use registry::ArchetypeRegistry;
