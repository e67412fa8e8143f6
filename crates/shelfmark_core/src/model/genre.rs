//! Genre domain model.

use super::{require_text, EntityId, ValidationError, TRANSIENT_ID};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A book genre, linked to books through the `book_genre` table.
///
/// Identity is `(id, name)`; link reconciliation relies on this, so the
/// store-computed `books_owned` counter must stay out of equality and
/// ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: EntityId,
    pub name: String,
    /// Number of owned books linked to this genre. Read-only.
    #[serde(default)]
    pub books_owned: u32,
}

impl Genre {
    /// Creates a transient genre, ready to be passed to `create`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TRANSIENT_ID,
            name: name.into(),
            books_owned: 0,
        }
    }

    /// Rebuilds a persisted genre, as read from the store.
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
        require_text(&self.name, "genre", "name")
    }
}

impl PartialEq for Genre {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for Genre {}

impl Hash for Genre {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
    }
}

impl Ord for Genre {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Genre {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
