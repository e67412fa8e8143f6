//! Repository layer: the uniform CRUD contract and its SQLite
//! implementations.
//!
//! # Responsibility
//! - Define the generic [`Repository`] contract shared by all entity types.
//! - Isolate SQL details from callers; map rows to domain objects.
//!
//! # Invariants
//! - Write paths validate domain invariants before touching the store.
//! - Read paths reject corrupt persisted state instead of masking it.
//! - Each operation is one self-contained unit of work; statements and
//!   cursors never outlive the call that opened them.

use crate::db::DbError;
use crate::isbn::InvalidIsbn;
use crate::model::{EntityId, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod author_repo;
pub mod book_repo;
pub mod genre_repo;
pub mod link_delta;
pub mod publisher_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error covering persistence and mapping failures.
#[derive(Debug)]
pub enum RepoError {
    /// Domain invariant violated; raised before any write.
    Validation(ValidationError),
    /// ISBN codec rejected an identifier.
    InvalidIsbn(InvalidIsbn),
    /// Store/transport failure, wrapped and propagated uninterpreted.
    Db(DbError),
    /// A single-entity lookup matched zero rows.
    NotFound { entity: &'static str, id: EntityId },
    /// The store reported success but the expected side effect is missing.
    PersistenceFailure {
        entity: &'static str,
        reason: &'static str,
    },
    /// Persisted state failed to map back into a valid domain object.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidIsbn(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "no {entity} found for id {id}"),
            Self::PersistenceFailure { entity, reason } => {
                write!(f, "failed to persist {entity}: {reason}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidIsbn(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::PersistenceFailure { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidIsbn> for RepoError {
    fn from(value: InvalidIsbn) -> Self {
        Self::InvalidIsbn(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Uniform CRUD contract for catalog entities.
///
/// Entity-specific queries (substring filters, reference lookups) are
/// inherent methods on the concrete repositories.
pub trait Repository<T> {
    /// Fetches a single entity; `NotFound` when no row matches.
    fn get_by_id(&self, id: EntityId) -> RepoResult<T>;

    /// Fetches every occurrence; an empty store yields an empty collection.
    fn get_all(&self) -> RepoResult<Vec<T>>;

    /// Validates and inserts a transient entity, then returns the freshly
    /// read object so store-computed columns are populated.
    ///
    /// `PersistenceFailure` when the insert affects zero rows or yields no
    /// generated id.
    fn create(&mut self, entity: &T) -> RepoResult<T>;

    /// Overwrites all mutable columns of the row matching the entity id;
    /// `NotFound` when no row matches.
    fn update(&mut self, entity: &T) -> RepoResult<T>;

    /// Removes the row matching the id; `NotFound` when no row matches.
    fn delete(&mut self, id: EntityId) -> RepoResult<()>;
}
