//! Author domain model.

use super::{require_text, EntityId, ValidationError, TRANSIENT_ID};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A book author.
///
/// Identity is `(id, name, nationality)`; the `books_owned` counter is
/// computed by the store and excluded from equality, hashing and ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: EntityId,
    pub name: String,
    pub nationality: String,
    /// Number of owned books by this author. Read-only; supplied by the
    /// store, never written by this crate.
    #[serde(default)]
    pub books_owned: u32,
}

impl Author {
    /// Creates a transient author, ready to be passed to `create`.
    pub fn new(name: impl Into<String>, nationality: impl Into<String>) -> Self {
        Self {
            id: TRANSIENT_ID,
            name: name.into(),
            nationality: nationality.into(),
            books_owned: 0,
        }
    }

    /// Rebuilds a persisted author, as read from the store.
    pub fn with_id(
        id: EntityId,
        name: impl Into<String>,
        nationality: impl Into<String>,
        books_owned: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            nationality: nationality.into(),
            books_owned,
        }
    }

    /// Whether the store has assigned a surrogate key.
    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    /// Checks domain invariants prior to persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "author", "name")?;
        require_text(&self.nationality, "author", "nationality")?;
        Ok(())
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.nationality == other.nationality
    }
}

impl Eq for Author {}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.name.hash(state);
        self.nationality.hash(state);
    }
}

impl Ord for Author {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.nationality.cmp(&other.nationality))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Author {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::Author;

    #[test]
    fn equality_ignores_owned_counter() {
        let stored = Author::with_id(3, "Ursula K. Le Guin", "American", 7);
        let mut reread = stored.clone();
        reread.books_owned = 8;
        assert_eq!(stored, reread);
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(Author::new("", "Brazilian").validate().is_err());
        assert!(Author::new("Machado de Assis", "  ").validate().is_err());
        assert!(Author::new("Machado de Assis", "Brazilian")
            .validate()
            .is_ok());
    }
}
