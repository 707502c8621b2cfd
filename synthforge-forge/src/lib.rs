//! Typed forge operations (C4): unpaced reads, paced writes, byline discipline.

mod byline;
mod client;
mod dry_run;
mod error;
mod octocrab_client;

pub use byline::{parse_byline, with_byline};
pub use client::{Comment, CommentRef, ForgeClient, IssueRef, PostDetail};
pub use dry_run::DryRunForgeClient;
pub use error::ForgeError;
pub use octocrab_client::OctocrabForgeClient;
