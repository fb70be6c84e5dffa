//! Tag repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create, read, rename and delete tags.
//!
//! # Invariants
//! - Tag names are unique (case-sensitive); collisions yield `Conflict`.
//! - Deleting a tag removes its work item links, never the work items.

use crate::model::tag::{TagCreate, TagId, TagRecord, TagUpdate};
use crate::repo::{
    ensure_connection_ready, log_invalid, log_write, storage_failure, Outcome, RepoResult,
    Response, TAGS_TABLE, WORK_ITEM_TAGS_TABLE,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for tag CRUD.
pub trait TagRepository {
    /// Inserts one tag; `Created` carries the new id.
    fn create(&self, tag: &TagCreate) -> Outcome;
    /// Loads one tag, `None` when absent.
    fn find(&self, id: TagId) -> RepoResult<Option<TagRecord>>;
    /// Lists all tags ordered by id.
    fn read(&self) -> RepoResult<Vec<TagRecord>>;
    /// Renames one tag.
    fn update(&self, tag: &TagUpdate) -> Response;
    /// Deletes one tag and its work item links.
    fn delete(&self, id: TagId) -> Response;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TAGS_TABLE, WORK_ITEM_TAGS_TABLE])?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create(&self, tag: &TagCreate) -> Outcome {
        if let Err(err) = tag.validate() {
            return Outcome::rejected(log_invalid("tag_create", &err));
        }

        match insert_tag(self.conn, tag) {
            Ok(id) => {
                log_write("tag_create", id, Response::Created);
                Outcome::created(id)
            }
            Err(err) => Outcome::rejected(storage_failure("tag_create", &err)),
        }
    }

    fn find(&self, id: TagId) -> RepoResult<Option<TagRecord>> {
        let tag = self
            .conn
            .query_row(
                "SELECT Id, Name FROM Tags WHERE Id = ?1;",
                [id],
                parse_tag_row,
            )
            .optional()?;
        Ok(tag)
    }

    fn read(&self) -> RepoResult<Vec<TagRecord>> {
        let mut stmt = self.conn.prepare("SELECT Id, Name FROM Tags ORDER BY Id ASC;")?;
        let tags = stmt
            .query_map([], parse_tag_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn update(&self, tag: &TagUpdate) -> Response {
        match rename_tag(self.conn, tag) {
            Ok(response) => {
                log_write("tag_update", tag.id, response);
                response
            }
            Err(err) => storage_failure("tag_update", &err),
        }
    }

    fn delete(&self, id: TagId) -> Response {
        match delete_tag(self.conn, id) {
            Ok(response) => {
                log_write("tag_delete", id, response);
                response
            }
            Err(err) => storage_failure("tag_delete", &err),
        }
    }
}

fn insert_tag(conn: &Connection, tag: &TagCreate) -> RepoResult<TagId> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute("INSERT INTO Tags (Name) VALUES (?1);", [tag.name.as_str()])?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

fn rename_tag(conn: &Connection, tag: &TagUpdate) -> RepoResult<Response> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if !tag_exists(&tx, tag.id)? {
        return Ok(Response::NotFound);
    }
    if let Err(err) = tag.validate() {
        return Ok(log_invalid("tag_update", &err));
    }

    tx.execute(
        "UPDATE Tags SET Name = ?2 WHERE Id = ?1;",
        params![tag.id, tag.name.as_str()],
    )?;
    tx.commit()?;
    Ok(Response::Updated)
}

fn delete_tag(conn: &Connection, id: TagId) -> RepoResult<Response> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    // WorkItemTags rows go with it through ON DELETE CASCADE.
    let changed = tx.execute("DELETE FROM Tags WHERE Id = ?1;", [id])?;
    if changed == 0 {
        return Ok(Response::NotFound);
    }
    tx.commit()?;
    Ok(Response::Deleted)
}

fn tag_exists(conn: &Connection, id: TagId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Tags WHERE Id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_tag_row(row: &Row<'_>) -> rusqlite::Result<TagRecord> {
    Ok(TagRecord {
        id: row.get("Id")?,
        name: row.get("Name")?,
    })
}
