//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide tag, user and work item CRUD over one shared connection.
//! - Classify storage failures into the `Response` taxonomy.
//! - Verify a connection is migrated before handing out a repository.
//!
//! # Invariants
//! - Writes validate payload bounds before touching storage.
//! - Every write runs in exactly one transaction; a failed write rolls
//!   back before its `Response` is returned.
//! - Writes never return `Err`; reads return `Err` only for transport or
//!   corrupted-data failures.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::validation::ValidationError;
use log::{error, info, warn};
use rusqlite::{ffi, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod response;
pub mod tag_repo;
pub mod user_repo;
pub mod work_item_repo;

pub use response::{Outcome, Response};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for reads and connection checks.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "kanban repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "kanban repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "kanban repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted kanban data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
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

/// Table name plus the columns a repository reads or writes.
pub(crate) type TableRequirement = (&'static str, &'static [&'static str]);

pub(crate) const TAGS_TABLE: TableRequirement = ("Tags", &["Id", "Name"]);
pub(crate) const USERS_TABLE: TableRequirement = ("Users", &["Id", "Name", "Email"]);
pub(crate) const ITEMS_TABLE: TableRequirement = (
    "Items",
    &[
        "Id",
        "Title",
        "AssignedToId",
        "State",
        "Description",
        "Created",
        "StateUpdated",
    ],
);
pub(crate) const WORK_ITEM_TAGS_TABLE: TableRequirement = ("WorkItemTags", &["TagId", "WorkItemId"]);

/// Rejects connections that are not migrated to the latest schema or that
/// miss any of the required tables/columns.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in requirements {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Returns whether the error is SQLite's uniqueness signal.
///
/// Other constraint kinds (CHECK, FOREIGN KEY, NOT NULL) return `false`.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _) => {
            sqlite_err.code == ErrorCode::ConstraintViolation
                && matches!(
                    sqlite_err.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
        }
        _ => false,
    }
}

/// Maps a failed write to `Conflict` (uniqueness) or `BadRequest`.
pub fn classify_storage_error(err: &RepoError) -> Response {
    match err {
        RepoError::Db(DbError::Sqlite(sqlite_err)) if is_unique_violation(sqlite_err) => {
            Response::Conflict
        }
        _ => Response::BadRequest,
    }
}

/// Classifies and logs a failed write. The transaction is already dropped
/// (rolled back) when this runs.
pub(crate) fn storage_failure(event: &'static str, err: &RepoError) -> Response {
    let response = classify_storage_error(err);
    match response {
        Response::Conflict => warn!(
            "event={event} module=repo status=conflict error_code=unique_violation error={err}"
        ),
        _ => error!(
            "event={event} module=repo status=bad_request error_code=storage_failure error={err}"
        ),
    }
    response
}

/// Logs the classified outcome of a write that reached storage.
pub(crate) fn log_write(event: &'static str, id: i64, response: Response) {
    if response.is_success() {
        info!("event={event} module=repo status=ok outcome={response} id={id}");
    } else {
        warn!("event={event} module=repo status={response} id={id}");
    }
}

/// Logs a payload rejected before storage was touched.
pub(crate) fn log_invalid(event: &'static str, err: &ValidationError) -> Response {
    warn!("event={event} module=repo status=bad_request error_code=validation error={err}");
    Response::BadRequest
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
