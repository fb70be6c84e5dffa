//! Shared storage context for the three repositories.
//!
//! # Responsibility
//! - Own one migrated SQLite connection.
//! - Hand out tag, user and work item repositories borrowing it.
//!
//! # Invariants
//! - A context is used by one caller at a time; it is `Send` but not `Sync`.
//! - Each repository write is its own unit of work; nothing stays pending
//!   on the connection between calls.

use crate::db::{open_db, open_db_in_dir, open_db_in_memory, DbResult};
use crate::repo::tag_repo::SqliteTagRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::work_item_repo::SqliteWorkItemRepository;
use crate::repo::RepoResult;
use rusqlite::Connection;
use std::path::Path;

/// Owner of the kanban database connection.
pub struct KanbanContext {
    conn: Connection,
}

impl KanbanContext {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens (and migrates) `<dir>/App.db`.
    pub fn open_in_dir(dir: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_dir(dir)?,
        })
    }

    /// Opens a fresh in-memory board.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already-open connection. Repositories still verify the
    /// schema when they are created.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn tags(&self) -> RepoResult<SqliteTagRepository<'_>> {
        SqliteTagRepository::try_new(&self.conn)
    }

    pub fn users(&self) -> RepoResult<SqliteUserRepository<'_>> {
        SqliteUserRepository::try_new(&self.conn)
    }

    pub fn work_items(&self) -> RepoResult<SqliteWorkItemRepository<'_>> {
        SqliteWorkItemRepository::try_new(&self.conn)
    }
}
