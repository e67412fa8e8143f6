//! Domain models for the book catalog.
//!
//! # Responsibility
//! - Define the Author/Publisher/Genre/Book aggregate types and their
//!   identity semantics.
//! - Own domain-level validation raised before any write is attempted.
//!
//! # Invariants
//! - Identity/equality never includes store-computed `books_owned` counters.
//! - A transient entity carries [`TRANSIENT_ID`] until the store assigns a
//!   surrogate key.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author;
pub mod book;
pub mod genre;
pub mod publisher;

/// Surrogate key type shared by every catalog entity.
pub type EntityId = i64;

/// Sentinel id for entities that have not been persisted yet.
pub const TRANSIENT_ID: EntityId = -1;

/// Domain invariant violation, raised before persistence is attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required text attribute is empty or blank.
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    /// The required ISBN-13 fails the checksum rules.
    InvalidIsbn13(String),
    /// The optional ISBN-10 fails the checksum rules.
    InvalidIsbn10(String),
    /// ISBN-10 and ISBN-13 do not name the same edition.
    IsbnMismatch { isbn_10: String, isbn_13: String },
    /// A book must carry between one and three genres.
    GenreCount(usize),
    /// Price must not be negative.
    NegativePrice(f64),
    /// A referenced entity must be persisted before it can be linked.
    TransientReference {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::InvalidIsbn13(value) => write!(f, "not a valid ISBN-13: `{value}`"),
            Self::InvalidIsbn10(value) => write!(f, "not a valid ISBN-10: `{value}`"),
            Self::IsbnMismatch { isbn_10, isbn_13 } => write!(
                f,
                "ISBN-10 `{isbn_10}` does not derive the stored ISBN-13 `{isbn_13}`"
            ),
            Self::GenreCount(count) => {
                write!(f, "a book must have between 1 and 3 genres, got {count}")
            }
            Self::NegativePrice(price) => write!(f, "price must not be negative, got {price}"),
            Self::TransientReference { entity, field } => {
                write!(
                    f,
                    "{entity}.{field} references an entity that was never persisted"
                )
            }
        }
    }
}

impl Error for ValidationError {}

/// Shared non-empty check for required text attributes.
pub(crate) fn require_text(
    value: &str,
    entity: &'static str,
    field: &'static str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
