//! Publisher domain model.

use super::{require_text, EntityId, ValidationError, TRANSIENT_ID};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A publishing house. Identity is `(id, name)`; `books_owned` is
/// store-computed and excluded from identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub id: EntityId,
    pub name: String,
    /// Number of owned books published by this publisher. Read-only.
    #[serde(default)]
    pub books_owned: u32,
}

impl Publisher {
    /// Creates a transient publisher, ready to be passed to `create`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TRANSIENT_ID,
            name: name.into(),
            books_owned: 0,
        }
    }

    /// Rebuilds a persisted publisher, as read from the store.
    pub fn with_id(id: EntityId, name: impl Into<String>, books_owned: u32) -> Self {
        Self {
            id,
            name: name.into(),
            books_owned,
        }
    }

    /// Whether the store has assigned a surrogate key.
    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    /// Checks domain invariants prior to persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "publisher", "name")
    }
}

impl PartialEq for Publisher {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for Publisher {}

impl Hash for Publisher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
    }
}

impl Ord for Publisher {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Publisher {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
