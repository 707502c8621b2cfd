//! Forge-client error taxonomy.

use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum ForgeError {
    #[error("transient forge error: {0}")]
    Transient(String),
    #[error("forge rate limited: {0}")]
    RateLimited(String),
    #[error("forge auth failed: {0}")]
    Auth(String),
    #[error("forge resource not found: {0}")]
    NotFound(String),
    #[error("forge unavailable: {0}")]
    Unavailable(String),
}
