//! Book use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for shells driving the book catalog.
//! - Dispatch free-text searches to the matching repository filter.
//! - Orchestrate the read-status toggle as a narrow write.
//!
//! # Invariants
//! - The service never bypasses repository validation contracts.
//! - ISBN search input is normalized (dashes stripped) before matching.

use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::genre::Genre;
use crate::model::publisher::Publisher;
use crate::model::EntityId;
use crate::repo::book_repo::SqliteBookRepository;
use crate::repo::{RepoResult, Repository};

/// Searchable book attribute, selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookSearchField {
    Title,
    AuthorName,
    Isbn,
}

/// Use-case facade over the book repository.
pub struct BookService<'conn> {
    repo: SqliteBookRepository<'conn>,
}

impl<'conn> BookService<'conn> {
    /// Creates a service using the provided repository.
    pub fn new(repo: SqliteBookRepository<'conn>) -> Self {
        Self { repo }
    }

    /// Creates a transient book and returns the persisted aggregate.
    pub fn create(&mut self, book: &Book) -> RepoResult<Book> {
        self.repo.create(book)
    }

    /// Updates a persisted book, reconciling its genre links.
    pub fn update(&mut self, book: &Book) -> RepoResult<Book> {
        self.repo.update(book)
    }

    /// Fetches one book by id.
    pub fn get(&self, id: EntityId) -> RepoResult<Book> {
        self.repo.get_by_id(id)
    }

    /// Fetches the whole catalog.
    pub fn get_all(&self) -> RepoResult<Vec<Book>> {
        self.repo.get_all()
    }

    /// Every book by the given author.
    pub fn get_by_author(&self, author: &Author) -> RepoResult<Vec<Book>> {
        self.repo.get_by_author(author)
    }

    /// Every book by the given publisher.
    pub fn get_by_publisher(&self, publisher: &Publisher) -> RepoResult<Vec<Book>> {
        self.repo.get_by_publisher(publisher)
    }

    /// Every book linked to the given genre.
    pub fn get_by_genre(&self, genre: &Genre) -> RepoResult<Vec<Book>> {
        self.repo.get_by_genre(genre)
    }

    /// Substring search on the selected attribute.
    ///
    /// ISBN input may arrive hyphenated (`978-0-306-...`); the stored form
    /// is bare digits, so dashes are stripped before matching.
    pub fn search(&self, field: BookSearchField, input: &str) -> RepoResult<Vec<Book>> {
        match field {
            BookSearchField::Title => self.repo.filter_by_title(input),
            BookSearchField::AuthorName => self.repo.filter_by_author_name(input),
            BookSearchField::Isbn => self.repo.filter_by_isbn(&input.replace('-', "")),
        }
    }

    /// Flips the book's read flag and persists only that column.
    pub fn toggle_read(&mut self, book: &mut Book) -> RepoResult<()> {
        book.toggle_read();
        self.repo.update_read_status(book)
    }

    /// Deletes a book and its genre links.
    pub fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        self.repo.delete(id)
    }
}
