//! Book aggregate and format enumeration.
//!
//! # Responsibility
//! - Define the Book aggregate root, including its owned genre set.
//! - Enforce the aggregate invariants (ISBN consistency, genre count).
//!
//! # Invariants
//! - `isbn_13` is always present and checksum-valid.
//! - When `isbn_10` is set, deriving its ISBN-13 equivalent must reproduce
//!   `isbn_13` exactly.
//! - A persisted book carries between one and three genres.

use super::author::Author;
use super::genre::Genre;
use super::publisher::Publisher;
use super::{require_text, EntityId, ValidationError, TRANSIENT_ID};
use crate::isbn;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Physical/digital edition format of a book.
///
/// Persisted by symbolic name; the numeric code is kept stable for callers
/// that index formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Hardcover,
    Paperback,
    Ebook,
    Box,
}

impl Format {
    /// Stable numeric code for this format.
    pub fn code(self) -> i64 {
        match self {
            Self::Hardcover => 1,
            Self::Paperback => 2,
            Self::Ebook => 3,
            Self::Box => 4,
        }
    }

    /// Symbolic name as stored in the `book.format` column.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Hardcover => "HARDCOVER",
            Self::Paperback => "PAPERBACK",
            Self::Ebook => "EBOOK",
            Self::Box => "BOX",
        }
    }

    /// Parses a stored symbolic name, case-insensitively.
    ///
    /// Returns `None` for unknown names; callers on the read path must treat
    /// that as a fatal mapping error.
    pub fn from_db_str(value: &str) -> Option<Self> {
        let format = [Self::Hardcover, Self::Paperback, Self::Ebook, Self::Box]
            .into_iter()
            .find(|format| format.as_db_str().eq_ignore_ascii_case(value))?;
        Some(format)
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Hardcover => "Hardcover",
            Self::Paperback => "Paperback",
            Self::Ebook => "Ebook",
            Self::Box => "Box",
        };
        write!(f, "{label}")
    }
}

/// The Book aggregate root.
///
/// Owns its genre link set: persisting a book also reconciles the
/// `book_genre` rows, so mutations to `genres` only take effect through a
/// repository `create`/`update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: EntityId,
    pub title: String,
    pub isbn_10: Option<String>,
    pub isbn_13: String,
    /// Page count; `0` means unknown.
    pub pages: u32,
    pub read: bool,
    pub format: Format,
    pub author: Author,
    pub publisher: Publisher,
    pub purchase_date: Option<NaiveDate>,
    pub price: f64,
    pub review: Option<String>,
    pub genres: BTreeSet<Genre>,
}

impl Book {
    /// Creates a transient book with the required attributes; optional
    /// fields start unset and genres empty.
    pub fn new(
        title: impl Into<String>,
        isbn_13: impl Into<String>,
        format: Format,
        author: Author,
        publisher: Publisher,
    ) -> Self {
        Self {
            id: TRANSIENT_ID,
            title: title.into(),
            isbn_10: None,
            isbn_13: isbn_13.into(),
            pages: 0,
            read: false,
            format,
            author,
            publisher,
            purchase_date: None,
            price: 0.0,
            review: None,
            genres: BTreeSet::new(),
        }
    }

    /// Whether the store has assigned a surrogate key.
    pub fn is_persisted(&self) -> bool {
        self.id != TRANSIENT_ID
    }

    /// Adds a genre to the owned set; persisted by the next `create`/`update`.
    pub fn add_genre(&mut self, genre: Genre) {
        self.genres.insert(genre);
    }

    /// Flips the read flag. Persist with `update_read_status`.
    pub fn toggle_read(&mut self) {
        self.read = !self.read;
    }

    /// Checks the aggregate invariants prior to persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.title, "book", "title")?;

        if !isbn::is_valid_isbn13(&self.isbn_13) {
            return Err(ValidationError::InvalidIsbn13(self.isbn_13.clone()));
        }

        if let Some(isbn_10) = &self.isbn_10 {
            let derived = isbn::convert_to_isbn13(isbn_10)
                .map_err(|_| ValidationError::InvalidIsbn10(isbn_10.clone()))?;
            if derived != self.isbn_13 {
                return Err(ValidationError::IsbnMismatch {
                    isbn_10: isbn_10.clone(),
                    isbn_13: self.isbn_13.clone(),
                });
            }
        }

        if self.genres.is_empty() || self.genres.len() > 3 {
            return Err(ValidationError::GenreCount(self.genres.len()));
        }
        if self.genres.iter().any(|genre| !genre.is_persisted()) {
            return Err(ValidationError::TransientReference {
                entity: "book",
                field: "genres",
            });
        }

        if self.price < 0.0 {
            return Err(ValidationError::NegativePrice(self.price));
        }

        if !self.author.is_persisted() {
            return Err(ValidationError::TransientReference {
                entity: "book",
                field: "author",
            });
        }
        if !self.publisher.is_persisted() {
            return Err(ValidationError::TransientReference {
                entity: "book",
                field: "publisher",
            });
        }

        Ok(())
    }
}
