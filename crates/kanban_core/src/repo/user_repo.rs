//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create, read, update and delete users.
//! - Guard deletion of users that still own work items.
//!
//! # Invariants
//! - Emails are unique; collisions yield `Conflict`.
//! - A user owning work items is only deleted when forced, and a forced
//!   delete removes those work items in the same transaction.

use crate::model::user::{UserCreate, UserId, UserRecord, UserUpdate};
use crate::repo::{
    ensure_connection_ready, log_invalid, log_write, storage_failure, Outcome, RepoResult,
    Response, ITEMS_TABLE, USERS_TABLE,
};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for user CRUD.
pub trait UserRepository {
    /// Inserts one user; `Created` carries the new id.
    fn create(&self, user: &UserCreate) -> Outcome;
    /// Loads one user, `None` when absent.
    fn find(&self, id: UserId) -> RepoResult<Option<UserRecord>>;
    /// Lists all users ordered by id.
    fn read(&self) -> RepoResult<Vec<UserRecord>>;
    /// Replaces name and email of one user.
    fn update(&self, user: &UserUpdate) -> Response;
    /// Deletes one user. Owners of work items need `force`.
    fn delete(&self, id: UserId, force: bool) -> Response;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[USERS_TABLE, ITEMS_TABLE])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, user: &UserCreate) -> Outcome {
        if let Err(err) = user.validate() {
            return Outcome::rejected(log_invalid("user_create", &err));
        }

        match insert_user(self.conn, user) {
            Ok(id) => {
                log_write("user_create", id, Response::Created);
                Outcome::created(id)
            }
            Err(err) => Outcome::rejected(storage_failure("user_create", &err)),
        }
    }

    fn find(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT Id, Name, Email FROM Users WHERE Id = ?1;",
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn read(&self) -> RepoResult<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Id, Name, Email FROM Users ORDER BY Id ASC;")?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    fn update(&self, user: &UserUpdate) -> Response {
        match update_user(self.conn, user) {
            Ok(response) => {
                log_write("user_update", user.id, response);
                response
            }
            Err(err) => storage_failure("user_update", &err),
        }
    }

    fn delete(&self, id: UserId, force: bool) -> Response {
        match delete_user(self.conn, id, force) {
            Ok(response) => {
                log_write("user_delete", id, response);
                response
            }
            Err(err) => storage_failure("user_delete", &err),
        }
    }
}

fn insert_user(conn: &Connection, user: &UserCreate) -> RepoResult<UserId> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO Users (Name, Email) VALUES (?1, ?2);",
        params![user.name.as_str(), user.email.as_str()],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

fn update_user(conn: &Connection, user: &UserUpdate) -> RepoResult<Response> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if !user_exists(&tx, user.id)? {
        return Ok(Response::NotFound);
    }
    if let Err(err) = user.validate() {
        return Ok(log_invalid("user_update", &err));
    }

    tx.execute(
        "UPDATE Users SET Name = ?2, Email = ?3 WHERE Id = ?1;",
        params![user.id, user.name.as_str(), user.email.as_str()],
    )?;
    tx.commit()?;
    Ok(Response::Updated)
}

fn delete_user(conn: &Connection, id: UserId, force: bool) -> RepoResult<Response> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if !user_exists(&tx, id)? {
        return Ok(Response::NotFound);
    }

    let owned_items = owned_item_count(&tx, id)?;
    if owned_items > 0 {
        if !force {
            return Ok(Response::Conflict);
        }
        // Links in WorkItemTags cascade with the items.
        let removed = tx.execute("DELETE FROM Items WHERE AssignedToId = ?1;", [id])?;
        info!("event=user_delete module=repo status=cascade user_id={id} removed_items={removed}");
    }

    tx.execute("DELETE FROM Users WHERE Id = ?1;", [id])?;
    tx.commit()?;
    Ok(Response::Deleted)
}

fn user_exists(conn: &Connection, id: UserId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Users WHERE Id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn owned_item_count(conn: &Connection, id: UserId) -> RepoResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM Items WHERE AssignedToId = ?1;",
        [id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get("Id")?,
        name: row.get("Name")?,
        email: row.get("Email")?,
    })
}
