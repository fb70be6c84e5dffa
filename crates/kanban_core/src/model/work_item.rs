//! Work item lifecycle, payloads and read models.
//!
//! # Responsibility
//! - Define the five-state work item lifecycle and its delete rules.
//! - Define create/update payloads and list/detail projections.
//!
//! # Invariants
//! - New items always start in `WorkItemState::New`.
//! - `Resolved`, `Closed` and `Removed` items cannot be deleted.
//! - `Removed` is a soft-delete marker; the row stays in storage.
//! - Update accepts any target state; only delete is gated.

use crate::model::user::UserId;
use crate::model::validation::{ensure_max_chars, ValidationError, WORK_ITEM_TITLE_MAX_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Row id of a work item.
pub type WorkItemId = i64;

/// Work item lifecycle state.
///
/// Persisted and serialized by variant name (`"New"`, `"Active"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkItemState {
    New,
    Active,
    Resolved,
    Closed,
    /// Soft-deleted.
    Removed,
}

/// What `delete` does to an item in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTransition {
    /// Delete is refused with `Conflict`.
    Reject,
    /// Row and its tag links are removed.
    HardDelete,
    /// State moves to `Removed`; the row is kept.
    SoftDelete,
    /// No delete rule; row is saved untouched and reported as updated.
    /// None of the current states map here.
    Unchanged,
}

impl WorkItemState {
    pub const ALL: [WorkItemState; 5] = [
        Self::New,
        Self::Active,
        Self::Resolved,
        Self::Closed,
        Self::Removed,
    ];

    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Active => "Active",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Removed => "Removed",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_db_str() == value)
    }

    /// Returns whether `delete` must be refused for this state.
    pub fn is_delete_guarded(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Removed)
    }

    /// Delete rule for this state.
    pub fn delete_transition(self) -> DeleteTransition {
        match self {
            Self::Resolved | Self::Closed | Self::Removed => DeleteTransition::Reject,
            Self::Active => DeleteTransition::SoftDelete,
            Self::New => DeleteTransition::HardDelete,
        }
    }
}

impl Display for WorkItemState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Payload for creating one work item.
///
/// `tags` are matched by exact name against existing tags; unknown names
/// are dropped, never created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemCreate {
    pub title: String,
    pub assigned_to_id: Option<UserId>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl WorkItemCreate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assigned_to_id = Some(user_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_max_chars("work_item.title", &self.title, WORK_ITEM_TITLE_MAX_CHARS)
    }
}

/// Payload for overwriting one work item.
///
/// `assigned_to_id: None` and `description: None` keep the stored values.
/// The tag set is always replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemUpdate {
    pub id: WorkItemId,
    pub title: String,
    pub assigned_to_id: Option<UserId>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub state: WorkItemState,
}

impl WorkItemUpdate {
    pub fn new(id: WorkItemId, title: impl Into<String>, state: WorkItemState) -> Self {
        Self {
            id,
            title: title.into(),
            assigned_to_id: None,
            description: None,
            tags: Vec::new(),
            state,
        }
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assigned_to_id = Some(user_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_max_chars("work_item.title", &self.title, WORK_ITEM_TITLE_MAX_CHARS)
    }
}

/// Work item list projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemRecord {
    pub id: WorkItemId,
    pub title: String,
    /// Empty when the item is unassigned.
    pub assigned_to_name: String,
    /// Tag names ordered by tag id.
    pub tags: Vec<String>,
    pub state: WorkItemState,
}

/// Work item detail projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemDetails {
    pub id: WorkItemId,
    pub title: String,
    pub description: Option<String>,
    /// Unix epoch milliseconds.
    pub created: i64,
    /// Empty when the item is unassigned.
    pub assigned_to_name: String,
    pub tags: Vec<String>,
    pub state: WorkItemState,
    /// Unix epoch milliseconds of the last state change.
    pub state_updated: i64,
}

#[cfg(test)]
mod tests {
    use super::{DeleteTransition, WorkItemState};

    #[test]
    fn db_names_roundtrip_for_every_state() {
        for state in WorkItemState::ALL {
            assert_eq!(WorkItemState::from_db_str(state.as_db_str()), Some(state));
        }
        assert_eq!(WorkItemState::from_db_str("new"), None);
    }

    #[test]
    fn delete_rules_follow_lifecycle() {
        assert_eq!(
            WorkItemState::New.delete_transition(),
            DeleteTransition::HardDelete
        );
        assert_eq!(
            WorkItemState::Active.delete_transition(),
            DeleteTransition::SoftDelete
        );
        for state in [
            WorkItemState::Resolved,
            WorkItemState::Closed,
            WorkItemState::Removed,
        ] {
            assert!(state.is_delete_guarded());
            assert_eq!(state.delete_transition(), DeleteTransition::Reject);
        }
    }
}
