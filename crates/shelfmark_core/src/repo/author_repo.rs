//! Author repository: SQLite implementation of the CRUD contract.
//!
//! Reads go through the `author_owned_counts` view so the store-computed
//! counter rides along; writes target the base `author` table only.

use crate::model::author::Author;
use crate::model::EntityId;
use crate::repo::{RepoError, RepoResult, Repository};
use rusqlite::{params, Connection, Row};

const AUTHOR_SELECT_SQL: &str =
    "SELECT id, name, nationality, books_owned FROM author_owned_counts";

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    /// Constructs a repository over a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Substring match on author name.
    pub fn filter_by_name(&self, name: &str) -> RepoResult<Vec<Author>> {
        self.query_authors(
            &format!("{AUTHOR_SELECT_SQL} WHERE name LIKE ?1 ORDER BY name, id;"),
            &format!("%{name}%"),
        )
    }

    /// Substring match on author nationality.
    pub fn filter_by_nationality(&self, nationality: &str) -> RepoResult<Vec<Author>> {
        self.query_authors(
            &format!("{AUTHOR_SELECT_SQL} WHERE nationality LIKE ?1 ORDER BY name, id;"),
            &format!("%{nationality}%"),
        )
    }

    fn query_authors(&self, sql: &str, pattern: &str) -> RepoResult<Vec<Author>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([pattern])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }
}

impl Repository<Author> for SqliteAuthorRepository<'_> {
    fn get_by_id(&self, id: EntityId) -> RepoResult<Author> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => parse_author_row(row),
            None => Err(RepoError::NotFound {
                entity: "author",
                id,
            }),
        }
    }

    fn get_all(&self) -> RepoResult<Vec<Author>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{AUTHOR_SELECT_SQL} ORDER BY name, id;"))?;
        let mut rows = stmt.query([])?;
        let mut authors = Vec::new();
        while let Some(row) = rows.next()? {
            authors.push(parse_author_row(row)?);
        }
        Ok(authors)
    }

    fn create(&mut self, author: &Author) -> RepoResult<Author> {
        author.validate()?;

        let changed = self.conn.execute(
            "INSERT INTO author (name, nationality) VALUES (?1, ?2);",
            params![author.name, author.nationality],
        )?;
        if changed == 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "author",
                reason: "no rows affected",
            });
        }

        let id = self.conn.last_insert_rowid();
        if id <= 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "author",
                reason: "no generated id",
            });
        }

        self.get_by_id(id)
    }

    fn update(&mut self, author: &Author) -> RepoResult<Author> {
        author.validate()?;

        let changed = self.conn.execute(
            "UPDATE author SET name = ?1, nationality = ?2 WHERE id = ?3;",
            params![author.name, author.nationality, author.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "author",
                id: author.id,
            });
        }

        self.get_by_id(author.id)
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM author WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "author",
                id,
            });
        }
        Ok(())
    }
}

fn parse_author_row(row: &Row<'_>) -> RepoResult<Author> {
    let books_owned: i64 = row.get("books_owned")?;
    let books_owned = u32::try_from(books_owned).map_err(|_| {
        RepoError::InvalidData(format!("negative books_owned `{books_owned}` for author"))
    })?;

    Ok(Author {
        id: row.get("id")?,
        name: row.get("name")?,
        nationality: row.get("nationality")?,
        books_owned,
    })
}
