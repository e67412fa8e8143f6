//! Publisher repository: SQLite implementation of the CRUD contract.

use crate::model::publisher::Publisher;
use crate::model::EntityId;
use crate::repo::{RepoError, RepoResult, Repository};
use rusqlite::{params, Connection, Row};

const PUBLISHER_SELECT_SQL: &str = "SELECT id, name, books_owned FROM publisher_owned_counts";

/// SQLite-backed publisher repository.
pub struct SqlitePublisherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublisherRepository<'conn> {
    /// Constructs a repository over a migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Substring match on publisher name.
    pub fn filter_by_name(&self, name: &str) -> RepoResult<Vec<Publisher>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PUBLISHER_SELECT_SQL} WHERE name LIKE ?1 ORDER BY name, id;"
        ))?;
        let mut rows = stmt.query([format!("%{name}%")])?;
        let mut publishers = Vec::new();
        while let Some(row) = rows.next()? {
            publishers.push(parse_publisher_row(row)?);
        }
        Ok(publishers)
    }
}

impl Repository<Publisher> for SqlitePublisherRepository<'_> {
    fn get_by_id(&self, id: EntityId) -> RepoResult<Publisher> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLISHER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;

        match rows.next()? {
            Some(row) => parse_publisher_row(row),
            None => Err(RepoError::NotFound {
                entity: "publisher",
                id,
            }),
        }
    }

    fn get_all(&self) -> RepoResult<Vec<Publisher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLISHER_SELECT_SQL} ORDER BY name, id;"))?;
        let mut rows = stmt.query([])?;
        let mut publishers = Vec::new();
        while let Some(row) = rows.next()? {
            publishers.push(parse_publisher_row(row)?);
        }
        Ok(publishers)
    }

    fn create(&mut self, publisher: &Publisher) -> RepoResult<Publisher> {
        publisher.validate()?;

        let changed = self.conn.execute(
            "INSERT INTO publisher (name) VALUES (?1);",
            params![publisher.name],
        )?;
        if changed == 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "publisher",
                reason: "no rows affected",
            });
        }

        let id = self.conn.last_insert_rowid();
        if id <= 0 {
            return Err(RepoError::PersistenceFailure {
                entity: "publisher",
                reason: "no generated id",
            });
        }

        self.get_by_id(id)
    }

    fn update(&mut self, publisher: &Publisher) -> RepoResult<Publisher> {
        publisher.validate()?;

        let changed = self.conn.execute(
            "UPDATE publisher SET name = ?1 WHERE id = ?2;",
            params![publisher.name, publisher.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "publisher",
                id: publisher.id,
            });
        }

        self.get_by_id(publisher.id)
    }

    fn delete(&mut self, id: EntityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM publisher WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "publisher",
                id,
            });
        }
        Ok(())
    }
}

fn parse_publisher_row(row: &Row<'_>) -> RepoResult<Publisher> {
    let books_owned: i64 = row.get("books_owned")?;
    let books_owned = u32::try_from(books_owned).map_err(|_| {
        RepoError::InvalidData(format!(
            "negative books_owned `{books_owned}` for publisher"
        ))
    })?;

    Ok(Publisher {
        id: row.get("id")?,
        name: row.get("name")?,
        books_owned,
    })
}
