//! Work item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create, read, update and delete work items.
//! - Resolve tag names and assignees against existing rows.
//! - Apply the lifecycle rules of `delete` (hard delete, soft delete, refuse).
//!
//! # Invariants
//! - Tag names resolve by exact match; unknown names are dropped.
//! - A supplied assignee id must reference an existing user.
//! - `read` hides soft-deleted (`Removed`) items; filtered reads do not.
//! - Item lists are ordered by id, tag names by tag id.

use crate::model::tag::TagId;
use crate::model::user::UserId;
use crate::model::work_item::{
    DeleteTransition, WorkItemCreate, WorkItemDetails, WorkItemId, WorkItemRecord, WorkItemState,
    WorkItemUpdate,
};
use crate::repo::{
    ensure_connection_ready, log_invalid, log_write, storage_failure, Outcome, RepoError,
    RepoResult, Response, ITEMS_TABLE, TAGS_TABLE, USERS_TABLE, WORK_ITEM_TAGS_TABLE,
};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::collections::BTreeSet;

const ITEM_SELECT_SQL: &str = "SELECT
    i.Id,
    i.Title,
    COALESCE(u.Name, '') AS AssignedToName,
    i.State
FROM Items i
LEFT JOIN Users u ON u.Id = i.AssignedToId";

const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

/// Repository interface for work item CRUD and filtered reads.
pub trait WorkItemRepository {
    /// Inserts one item in state `New`; `Created` carries the new id.
    fn create(&self, item: &WorkItemCreate) -> Outcome;
    /// Lists all items except soft-deleted ones.
    fn read(&self) -> RepoResult<Vec<WorkItemRecord>>;
    /// Lists soft-deleted items.
    fn read_removed(&self) -> RepoResult<Vec<WorkItemRecord>>;
    /// Lists items linked to the tag with exactly this name.
    fn read_by_tag(&self, tag_name: &str) -> RepoResult<Vec<WorkItemRecord>>;
    /// Lists items assigned to the user.
    fn read_by_user(&self, user_id: UserId) -> RepoResult<Vec<WorkItemRecord>>;
    /// Lists items in the given state.
    fn read_by_state(&self, state: WorkItemState) -> RepoResult<Vec<WorkItemRecord>>;
    /// Loads one item with details, `None` when absent.
    fn find(&self, id: WorkItemId) -> RepoResult<Option<WorkItemDetails>>;
    /// Overwrites title, state and tag set; optionally assignee/description.
    fn update(&self, item: &WorkItemUpdate) -> Response;
    /// Deletes or soft-deletes one item depending on its state.
    fn delete(&self, id: WorkItemId) -> Response;
}

/// SQLite-backed work item repository.
pub struct SqliteWorkItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkItemRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[ITEMS_TABLE, USERS_TABLE, TAGS_TABLE, WORK_ITEM_TAGS_TABLE],
        )?;
        Ok(Self { conn })
    }

    fn list_items(&self, filter: ItemFilter<'_>) -> RepoResult<Vec<WorkItemRecord>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        match filter {
            ItemFilter::Visible => {
                sql.push_str(" AND i.State <> ?");
                bind_values.push(Value::Text(WorkItemState::Removed.as_db_str().to_string()));
            }
            ItemFilter::State(state) => {
                sql.push_str(" AND i.State = ?");
                bind_values.push(Value::Text(state.as_db_str().to_string()));
            }
            ItemFilter::Tag(name) => {
                sql.push_str(
                    " AND EXISTS (
                        SELECT 1
                        FROM WorkItemTags wt
                        INNER JOIN Tags t ON t.Id = wt.TagId
                        WHERE wt.WorkItemId = i.Id
                          AND t.Name = ?
                    )",
                );
                bind_values.push(Value::Text(name.to_string()));
            }
            ItemFilter::User(user_id) => {
                sql.push_str(" AND i.AssignedToId = ?");
                bind_values.push(Value::Integer(user_id));
            }
        }

        sql.push_str(" ORDER BY i.Id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let id: WorkItemId = row.get("Id")?;
            items.push(WorkItemRecord {
                id,
                title: row.get("Title")?,
                assigned_to_name: row.get("AssignedToName")?,
                tags: load_tag_names(self.conn, id)?,
                state: parse_state_column(row)?,
            });
        }

        Ok(items)
    }
}

/// Row filter for list projections.
#[derive(Debug, Clone, Copy)]
enum ItemFilter<'a> {
    /// Every state except `Removed`.
    Visible,
    State(WorkItemState),
    Tag(&'a str),
    User(UserId),
}

impl WorkItemRepository for SqliteWorkItemRepository<'_> {
    fn create(&self, item: &WorkItemCreate) -> Outcome {
        if let Err(err) = item.validate() {
            return Outcome::rejected(log_invalid("work_item_create", &err));
        }

        match insert_work_item(self.conn, item) {
            Ok(outcome) => {
                log_write(
                    "work_item_create",
                    outcome.id.unwrap_or_default(),
                    outcome.response,
                );
                outcome
            }
            Err(err) => Outcome::rejected(storage_failure("work_item_create", &err)),
        }
    }

    fn read(&self) -> RepoResult<Vec<WorkItemRecord>> {
        self.list_items(ItemFilter::Visible)
    }

    fn read_removed(&self) -> RepoResult<Vec<WorkItemRecord>> {
        self.list_items(ItemFilter::State(WorkItemState::Removed))
    }

    fn read_by_tag(&self, tag_name: &str) -> RepoResult<Vec<WorkItemRecord>> {
        self.list_items(ItemFilter::Tag(tag_name))
    }

    fn read_by_user(&self, user_id: UserId) -> RepoResult<Vec<WorkItemRecord>> {
        self.list_items(ItemFilter::User(user_id))
    }

    fn read_by_state(&self, state: WorkItemState) -> RepoResult<Vec<WorkItemRecord>> {
        self.list_items(ItemFilter::State(state))
    }

    fn find(&self, id: WorkItemId) -> RepoResult<Option<WorkItemDetails>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                i.Id,
                i.Title,
                i.Description,
                i.Created,
                COALESCE(u.Name, '') AS AssignedToName,
                i.State,
                i.StateUpdated
             FROM Items i
             LEFT JOIN Users u ON u.Id = i.AssignedToId
             WHERE i.Id = ?1;",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(WorkItemDetails {
                id,
                title: row.get("Title")?,
                description: row.get("Description")?,
                created: row.get("Created")?,
                assigned_to_name: row.get("AssignedToName")?,
                tags: load_tag_names(self.conn, id)?,
                state: parse_state_column(row)?,
                state_updated: row.get("StateUpdated")?,
            }));
        }

        Ok(None)
    }

    fn update(&self, item: &WorkItemUpdate) -> Response {
        match update_work_item(self.conn, item) {
            Ok(response) => {
                log_write("work_item_update", item.id, response);
                response
            }
            Err(err) => storage_failure("work_item_update", &err),
        }
    }

    fn delete(&self, id: WorkItemId) -> Response {
        match delete_work_item(self.conn, id) {
            Ok(response) => {
                log_write("work_item_delete", id, response);
                response
            }
            Err(err) => storage_failure("work_item_delete", &err),
        }
    }
}

fn insert_work_item(conn: &Connection, item: &WorkItemCreate) -> RepoResult<Outcome> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if let Some(user_id) = item.assigned_to_id {
        if !user_exists(&tx, user_id)? {
            warn!(
                "event=work_item_create module=repo status=bad_request error_code=unknown_assignee user_id={user_id}"
            );
            return Ok(Outcome::rejected(Response::BadRequest));
        }
    }

    tx.execute(
        &format!(
            "INSERT INTO Items (Title, AssignedToId, State, Description, Created, StateUpdated)
             VALUES (?1, ?2, ?3, ?4, {NOW_MS_SQL}, {NOW_MS_SQL});"
        ),
        params![
            item.title.as_str(),
            item.assigned_to_id,
            WorkItemState::New.as_db_str(),
            item.description.as_deref(),
        ],
    )?;
    let id = tx.last_insert_rowid();
    replace_tag_links(&tx, id, &item.tags)?;
    tx.commit()?;

    Ok(Outcome::created(id))
}

fn update_work_item(conn: &Connection, item: &WorkItemUpdate) -> RepoResult<Response> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    if load_state(&tx, item.id)?.is_none() {
        return Ok(Response::NotFound);
    }
    if let Err(err) = item.validate() {
        return Ok(log_invalid("work_item_update", &err));
    }
    if let Some(user_id) = item.assigned_to_id {
        if !user_exists(&tx, user_id)? {
            warn!(
                "event=work_item_update module=repo status=bad_request error_code=unknown_assignee user_id={user_id}"
            );
            return Ok(Response::BadRequest);
        }
    }

    // SET expressions see the old row, so `State <> ?3` compares against the
    // stored state.
    tx.execute(
        &format!(
            "UPDATE Items
             SET
                Title = ?2,
                State = ?3,
                AssignedToId = COALESCE(?4, AssignedToId),
                Description = COALESCE(?5, Description),
                StateUpdated = CASE WHEN State <> ?3 THEN {NOW_MS_SQL} ELSE StateUpdated END
             WHERE Id = ?1;"
        ),
        params![
            item.id,
            item.title.as_str(),
            item.state.as_db_str(),
            item.assigned_to_id,
            item.description.as_deref(),
        ],
    )?;
    replace_tag_links(&tx, item.id, &item.tags)?;
    tx.commit()?;

    Ok(Response::Updated)
}

fn delete_work_item(conn: &Connection, id: WorkItemId) -> RepoResult<Response> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let Some(state) = load_state(&tx, id)? else {
        return Ok(Response::NotFound);
    };

    let response = match state.delete_transition() {
        DeleteTransition::Reject => return Ok(Response::Conflict),
        DeleteTransition::SoftDelete => {
            tx.execute(
                &format!(
                    "UPDATE Items
                     SET State = ?2, StateUpdated = {NOW_MS_SQL}
                     WHERE Id = ?1;"
                ),
                params![id, WorkItemState::Removed.as_db_str()],
            )?;
            Response::Updated
        }
        DeleteTransition::HardDelete => {
            tx.execute("DELETE FROM Items WHERE Id = ?1;", [id])?;
            Response::Deleted
        }
        DeleteTransition::Unchanged => Response::Updated,
    };
    tx.commit()?;

    info!(
        "event=work_item_delete module=repo status=transition item_id={id} from_state={state} outcome={response}"
    );
    Ok(response)
}

/// Replaces the item's tag links with the existing tags named in `names`.
fn replace_tag_links(tx: &Transaction<'_>, item_id: WorkItemId, names: &[String]) -> RepoResult<()> {
    let tag_ids = resolve_tag_ids(tx, names)?;

    tx.execute("DELETE FROM WorkItemTags WHERE WorkItemId = ?1;", [item_id])?;
    for tag_id in &tag_ids {
        tx.execute(
            "INSERT INTO WorkItemTags (TagId, WorkItemId) VALUES (?1, ?2);",
            params![tag_id, item_id],
        )?;
    }

    let dropped = names.len().saturating_sub(tag_ids.len());
    if dropped > 0 {
        info!(
            "event=work_item_tags module=repo status=partial item_id={item_id} linked={} dropped={dropped}",
            tag_ids.len()
        );
    }
    Ok(())
}

fn resolve_tag_ids(conn: &Connection, names: &[String]) -> RepoResult<BTreeSet<TagId>> {
    let mut stmt = conn.prepare("SELECT Id FROM Tags WHERE Name = ?1;")?;
    let mut tag_ids = BTreeSet::new();
    for name in names {
        let found: Option<TagId> = stmt
            .query_row([name.as_str()], |row| row.get(0))
            .optional()?;
        if let Some(tag_id) = found {
            tag_ids.insert(tag_id);
        }
    }
    Ok(tag_ids)
}

fn load_tag_names(conn: &Connection, item_id: WorkItemId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.Name
         FROM WorkItemTags wt
         INNER JOIN Tags t ON t.Id = wt.TagId
         WHERE wt.WorkItemId = ?1
         ORDER BY t.Id ASC;",
    )?;
    let names = stmt
        .query_map([item_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

fn load_state(conn: &Connection, id: WorkItemId) -> RepoResult<Option<WorkItemState>> {
    let value: Option<String> = conn
        .query_row("SELECT State FROM Items WHERE Id = ?1;", [id], |row| {
            row.get(0)
        })
        .optional()?;
    value.map(|text| parse_state(&text)).transpose()
}

fn user_exists(conn: &Connection, id: UserId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Users WHERE Id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_state_column(row: &Row<'_>) -> RepoResult<WorkItemState> {
    let text: String = row.get("State")?;
    parse_state(&text)
}

fn parse_state(value: &str) -> RepoResult<WorkItemState> {
    WorkItemState::from_db_str(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid work item state `{value}` in Items.State"))
    })
}
