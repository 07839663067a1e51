//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Hosts usually already have a stable UUID per player; [`PlayerId::from`]
//! wraps it. The `new()` constructor exists for tests and sandbox sessions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable unique identity of a player (the harvesting subject).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// A fresh time-ordered (v7) identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// The wrapped [`Uuid`].
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}
