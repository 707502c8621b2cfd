//! The `_meta` envelope carried by every flat JSON state file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{last_updated, count}` header present on every state file. `count` must always equal the
/// number of entries the file summarizes; the state store validates this on every write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub last_updated: DateTime<Utc>,
    pub count: usize,
}

impl Meta {
    pub fn new(count: usize) -> Self {
        Self {
            last_updated: Utc::now(),
            count,
        }
    }

    /// Rebuilds with a fresh timestamp and the given count; used after every mutating write.
    pub fn touched(count: usize) -> Self {
        Self::new(count)
    }
}
