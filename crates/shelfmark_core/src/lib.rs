//! Core persistence and domain logic for Shelfmark, a personal
//! book-collection manager.
//!
//! This crate is the single source of truth for catalog invariants: the
//! repository contracts, the join fan-out hydration of book aggregates, the
//! genre link reconciliation, and the ISBN checksum codecs.

pub mod db;
pub mod isbn;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::author::Author;
pub use model::book::{Book, Format};
pub use model::genre::Genre;
pub use model::publisher::Publisher;
pub use model::{EntityId, ValidationError, TRANSIENT_ID};
pub use repo::author_repo::SqliteAuthorRepository;
pub use repo::book_repo::SqliteBookRepository;
pub use repo::genre_repo::SqliteGenreRepository;
pub use repo::link_delta::LinkDelta;
pub use repo::publisher_repo::SqlitePublisherRepository;
pub use repo::{RepoError, RepoResult, Repository};
pub use service::book_service::{BookSearchField, BookService};
