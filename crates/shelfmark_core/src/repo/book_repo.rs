//! Book repository: aggregate-root persistence over SQLite.
//!
//! # Responsibility
//! - CRUD for the Book aggregate, including its genre link rows.
//! - Hydrate joined (book, genre) row streams into grouped aggregates.
//! - Reconcile link state through [`LinkDelta`] on update.
//!
//! # Invariants
//! - Every read joins through `book_genre`, so hydration must group by book
//!   id without assuming row adjacency.
//! - Write paths validate the aggregate before the first statement runs.
//! - `update` re-reads the stored link set, then applies exactly the
//!   computed delta; the read and the write are not isolated from other
//!   writers, which leaves a known lost-update window.
//! - Deleting a book removes its link rows in the same transaction; the
//!   schema does not cascade.

use crate::model::author::Author;
use crate::model::book::{Book, Format};
use crate::model::genre::Genre;
use crate::model::publisher::Publisher;
use crate::model::EntityId;
use crate::repo::author_repo::SqliteAuthorRepository;
use crate::repo::genre_repo::{parse_genre_row, SqliteGenreRepository};
use crate::repo::link_delta::LinkDelta;
use crate::repo::publisher_repo::SqlitePublisherRepository;
use crate::repo::{RepoError, RepoResult, Repository};
use rusqlite::{params, Connection, Params, Row, Rows};
use std::collections::{BTreeMap, BTreeSet};

const BOOK_SELECT_SQL: &str = "SELECT
    b.id,
    b.title,
    b.isbn_10,
    b.isbn_13,
    b.pages,
    b.read,
    b.format,
    b.author_id,
    b.publisher_id,
    b.purchase_date,
    b.price,
    b.review,
    bg.genre_id
FROM book b
INNER JOIN book_genre bg ON bg.book_id = b.id";

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository over a migrated connection.
    ///
    /// Takes the connection mutably: book writes span several statements and
    /// run inside a transaction.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Substring match on book title.
    pub fn filter_by_title(&self, title: &str) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE b.title LIKE ?1;"),
            [format!("%{title}%")],
        )
    }

    /// Substring match on the name of the book's author.
    pub fn filter_by_author_name(&self, name: &str) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!(
                "{BOOK_SELECT_SQL}
                 INNER JOIN author a ON a.id = b.author_id
                 WHERE a.name LIKE ?1;"
            ),
            [format!("%{name}%")],
        )
    }

    /// Substring match against either ISBN column.
    pub fn filter_by_isbn(&self, isbn: &str) -> RepoResult<Vec<Book>> {
        let pattern = format!("%{isbn}%");
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE b.isbn_10 LIKE ?1 OR b.isbn_13 LIKE ?2;"),
            params![pattern, pattern],
        )
    }

    /// Every book written by the given (persisted) author.
    pub fn get_by_author(&self, author: &Author) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE b.author_id = ?1;"),
            [author.id],
        )
    }

    /// Every book released by the given (persisted) publisher.
    pub fn get_by_publisher(&self, publisher: &Publisher) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!("{BOOK_SELECT_SQL} WHERE b.publisher_id = ?1;"),
            [publisher.id],
        )
    }

    /// Every book linked to the given (persisted) genre.
    ///
    /// The match is on the link table, but the returned aggregates carry
    /// their complete genre sets.
    pub fn get_by_genre(&self, genre: &Genre) -> RepoResult<Vec<Book>> {
        self.query_books(
            &format!(
                "{BOOK_SELECT_SQL}
                 WHERE b.id IN (SELECT book_id FROM book_genre WHERE genre_id = ?1);"
            ),
            [genre.id],
        )
    }

    /// Narrow update of the read flag only; no other column is touched.
    pub fn update_read_status(&mut self, book: &Book) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE book SET read = ?1 WHERE id = ?2;",
            params![book.read, book.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "book",
                id: book.id,
            });
        }
        Ok(())
    }

    fn query_books<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Book>> {
        let conn: &Connection = &*self.conn;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        hydrate_book_rows(conn, &mut rows)
    }

    /// Current link state, as stored. Read fresh on every update so the
    /// delta reflects the store, not a stale in-memory copy.
    fn linked_genres(&self, book_id: EntityId) -> RepoResult<BTreeSet<Genre>> {
        let conn: &Connection = &*self.conn;
        let mut stmt = conn.prepare(
            "SELECT g.id, g.name, g.books_owned
             FROM book_genre bg
             INNER JOIN genre_owned_counts g ON g.id = bg.genre_id
             WHERE bg.book_id = ?1;",
        )?;
        let mut rows = stmt.query([book_id])?;
        let mut genres = BTreeSet::new();
        while let Some(row) = rows.next()? {
            genres.insert(parse_genre_row(row)?);
        }
        Ok(genres)
    }
}

impl Repository<Book> for SqliteBookRepository<'_> {
    fn get_by_id(&self, id: EntityId) -> RepoResult<Book> {
        let mut books = self.query_books(&format!("{BOOK_SELECT_SQL} WHERE b.id = ?1;"), [id])?;
        match books.pop() {
            Some(book) => Ok(book),
            None => Err(RepoError::NotFound { entity: "book", id }),
        }
    }

    fn get_all(&self) -> RepoResult<Vec<Book>> {
        self.query_books(&format!("{BOOK_SELECT_SQL};"), [])
    }

    fn create(&mut self, book: &Book) -> RepoResult<Book> {
        book.validate()?;

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO book (
                title, isbn_10, isbn_13, pages, read, format,
                author_id, publisher_id, purchase_date, price, review
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                book.title,
                book.isbn_10,
                book.isbn_13,
                i64::from(book.pages),
                book.read,
                book.format.as_db_str(),
                book.author.id,
                book.publisher.id,
                book.purchase_date,
                book.price,
                book.review,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "book",
                reason: "no rows affected",
            });
        }

        let id = tx.last_insert_rowid();
        if id <= 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "book",
                reason: "no generated id",
            });
        }

        for genre in &book.genres {
            tx.execute(
                "INSERT INTO book_genre (book_id, genre_id) VALUES (?1, ?2);",
                params![id, genre.id],
            )?;
        }
        tx.commit()?;

        self.get_by_id(id)
    }

    fn update(&mut self, book: &Book) -> RepoResult<Book> {
        book.validate()?;

        let current = self.linked_genres(book.id)?;
        let delta = LinkDelta::between(&current, &book.genres);

        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE book
             SET title = ?1, isbn_10 = ?2, isbn_13 = ?3, pages = ?4, read = ?5,
                 format = ?6, author_id = ?7, publisher_id = ?8,
                 purchase_date = ?9, price = ?10, review = ?11
             WHERE id = ?12;",
            params![
                book.title,
                book.isbn_10,
                book.isbn_13,
                i64::from(book.pages),
                book.read,
                book.format.as_db_str(),
                book.author.id,
                book.publisher.id,
                book.purchase_date,
                book.price,
                book.review,
                book.id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "book",
                id: book.id,
            });
        }

        for genre in &delta.remove {
            tx.execute(
                "DELETE FROM book_genre WHERE book_id = ?1 AND genre_id = ?2;",
                params![book.id, genre.id],
            )?;
        }
        for genre in &delta.add {
            tx.execute(
                "INSERT INTO book_genre (book_id, genre_id) VALUES (?1, ?2);",
                params![book.id, genre.id],
            )?;
        }
        tx.commit()?;

        Ok(book.clone())
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM book_genre WHERE book_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM book WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "book", id });
        }
        tx.commit()?;
        Ok(())
    }
}

/// Groups a joined (book, genre) row stream into one aggregate per book id.
///
/// Rows for the same book are not assumed to be contiguous; grouping is via
/// an id-keyed accumulating map. Referenced entities are resolved through
/// their repositories. Result is ordered by ascending book id.
fn hydrate_book_rows(conn: &Connection, rows: &mut Rows<'_>) -> RepoResult<Vec<Book>> {
    let authors = SqliteAuthorRepository::new(conn);
    let publishers = SqlitePublisherRepository::new(conn);
    let genres = SqliteGenreRepository::new(conn);

    let mut grouped: BTreeMap<EntityId, Book> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let id: EntityId = row.get("id")?;
        let genre = genres.get_by_id(row.get("genre_id")?)?;

        if let Some(book) = grouped.get_mut(&id) {
            book.add_genre(genre);
            continue;
        }

        let mut book = book_from_row(row, &authors, &publishers)?;
        book.add_genre(genre);
        grouped.insert(id, book);
    }

    let books: Vec<Book> = grouped.into_values().collect();
    for book in &books {
        book.validate()?;
    }
    Ok(books)
}

/// Builds a Book from the non-repeating columns of a joined row; the genre
/// set starts empty and is filled by the grouping loop.
fn book_from_row(
    row: &Row<'_>,
    authors: &SqliteAuthorRepository<'_>,
    publishers: &SqlitePublisherRepository<'_>,
) -> RepoResult<Book> {
    let format_name: String = row.get("format")?;
    let format = Format::from_db_str(&format_name).ok_or_else(|| {
        RepoError::InvalidData(format!("unknown format `{format_name}` in book.format"))
    })?;

    let pages: i64 = row.get("pages")?;
    let pages = u32::try_from(pages)
        .map_err(|_| RepoError::InvalidData(format!("negative pages `{pages}` in book.pages")))?;

    let author = authors.get_by_id(row.get("author_id")?)?;
    let publisher = publishers.get_by_id(row.get("publisher_id")?)?;

    Ok(Book {
        id: row.get("id")?,
        title: row.get("title")?,
        isbn_10: row.get("isbn_10")?,
        isbn_13: row.get("isbn_13")?,
        pages,
        read: row.get("read")?,
        format,
        author,
        publisher,
        purchase_date: row.get("purchase_date")?,
        price: row.get("price")?,
        review: row.get("review")?,
        genres: BTreeSet::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::{hydrate_book_rows, SqliteBookRepository, BOOK_SELECT_SQL};
    use crate::db::open_db_in_memory;
    use crate::model::author::Author;
    use crate::model::book::{Book, Format};
    use crate::model::genre::Genre;
    use crate::model::publisher::Publisher;
    use crate::repo::author_repo::SqliteAuthorRepository;
    use crate::repo::genre_repo::SqliteGenreRepository;
    use crate::repo::publisher_repo::SqlitePublisherRepository;
    use crate::repo::Repository;
    use rusqlite::Connection;
    use std::collections::BTreeSet;

    #[test]
    fn hydration_groups_non_contiguous_rows_by_id() {
        let mut conn = open_db_in_memory().unwrap();

        let (alpha, beta, gamma, first_id, second_id) = {
            let author = SqliteAuthorRepository::new(&conn)
                .create(&Author::new("Jorge Luis Borges", "Argentine"))
                .unwrap();
            let publisher = SqlitePublisherRepository::new(&conn)
                .create(&Publisher::new("Penguin"))
                .unwrap();
            let mut genres = SqliteGenreRepository::new(&conn);
            let alpha = genres.create(&Genre::new("Alpha")).unwrap();
            let beta = genres.create(&Genre::new("Beta")).unwrap();
            let gamma = genres.create(&Genre::new("Gamma")).unwrap();

            let mut repo = SqliteBookRepository::new(&mut conn);
            let mut first = Book::new(
                "Ficciones",
                "9780802130303",
                Format::Paperback,
                author.clone(),
                publisher.clone(),
            );
            first.add_genre(alpha.clone());
            first.add_genre(gamma.clone());
            let first = repo.create(&first).unwrap();

            let mut second = Book::new(
                "El Aleph",
                "9788499089515",
                Format::Hardcover,
                author,
                publisher,
            );
            second.add_genre(beta.clone());
            let second = repo.create(&second).unwrap();

            (alpha, beta, gamma, first.id, second.id)
        };

        // Ordering by genre id interleaves the first book's rows around the
        // second book's single row: (first, alpha), (second, beta),
        // (first, gamma).
        let conn_ref: &Connection = &conn;
        let mut stmt = conn_ref
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY bg.genre_id;"))
            .unwrap();
        let mut rows = stmt.query([]).unwrap();
        let books = hydrate_book_rows(conn_ref, &mut rows).unwrap();

        assert_eq!(books.len(), 2);
        let first = books.iter().find(|book| book.id == first_id).unwrap();
        let second = books.iter().find(|book| book.id == second_id).unwrap();

        let expected: BTreeSet<Genre> = [alpha, gamma].into_iter().collect();
        assert_eq!(first.genres, expected);
        assert_eq!(second.genres, [beta].into_iter().collect());
    }
}
