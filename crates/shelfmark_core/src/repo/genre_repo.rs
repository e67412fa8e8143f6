//! Genre repository: SQLite implementation of the CRUD contract.
//!
//! Deleting a genre that still links to owned books is refused by the
//! foreign key on `book_genre`; callers see the wrapped store error.

use crate::model::genre::Genre;
use crate::model::EntityId;
use crate::repo::{RepoError, RepoResult, Repository};
use rusqlite::{params, Connection, Row};

const GENRE_SELECT_SQL: &str = "SELECT id, name, books_owned FROM genre_owned_counts";

/// SQLite-backed genre repository.
pub struct SqliteGenreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGenreRepository<'conn> {
    /// Constructs a repository over a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Substring match on genre name.
    pub fn filter_by_name(&self, name: &str) -> RepoResult<Vec<Genre>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GENRE_SELECT_SQL} WHERE name LIKE ?1 ORDER BY name, id;"
        ))?;
        let mut rows = stmt.query([format!("%{name}%")])?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }
        Ok(genres)
    }
}

impl Repository<Genre> for SqliteGenreRepository<'_> {
    fn get_by_id(&self, id: EntityId) -> RepoResult<Genre> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GENRE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => parse_genre_row(row),
            None => Err(RepoError::NotFound { entity: "genre", id }),
        }
    }

    fn get_all(&self) -> RepoResult<Vec<Genre>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GENRE_SELECT_SQL} ORDER BY name, id;"))?;
        let mut rows = stmt.query([])?;
        let mut genres = Vec::new();
        while let Some(row) = rows.next()? {
            genres.push(parse_genre_row(row)?);
        }
        Ok(genres)
    }

    fn create(&mut self, genre: &Genre) -> RepoResult<Genre> {
        genre.validate()?;

        let changed = self
            .conn
            .execute("INSERT INTO genre (name) VALUES (?1);", params![genre.name])?;
        if changed == 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "genre",
                reason: "no rows affected",
            });
        }

        let id = self.conn.last_insert_rowid();
        if id <= 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "genre",
                reason: "no generated id",
            });
        }

        self.get_by_id(id)
    }

    fn update(&mut self, genre: &Genre) -> RepoResult<Genre> {
        genre.validate()?;

        let changed = self.conn.execute(
            "UPDATE genre SET name = ?1 WHERE id = ?2;",
            params![genre.name, genre.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "genre",
                id: genre.id,
            });
        }

        self.get_by_id(genre.id)
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM genre WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "genre", id });
        }
        Ok(())
    }
}

pub(crate) fn parse_genre_row(row: &Row<'_>) -> RepoResult<Genre> {
    let books_owned: i64 = row.get("books_owned")?;
    let books_owned = u32::try_from(books_owned).map_err(|_| {
        RepoError::InvalidData(format!("negative books_owned `{books_owned}` for genre"))
    })?;

    Ok(Genre {
        id: row.get("id")?,
        name: row.get("name")?,
        books_owned,
    })
}
