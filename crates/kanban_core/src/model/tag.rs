//! Tag payloads and read model.

use crate::model::validation::{ensure_max_chars, ValidationError, TAG_NAME_MAX_CHARS};
use serde::{Deserialize, Serialize};

/// Row id of a tag.
pub type TagId = i64;

/// Payload for creating one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCreate {
    pub name: String,
}

impl TagCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_max_chars("tag.name", &self.name, TAG_NAME_MAX_CHARS)
    }
}

/// Payload for renaming one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdate {
    pub id: TagId,
    pub name: String,
}

impl TagUpdate {
    pub fn new(id: TagId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_max_chars("tag.name", &self.name, TAG_NAME_MAX_CHARS)
    }
}

/// Tag read model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
}
