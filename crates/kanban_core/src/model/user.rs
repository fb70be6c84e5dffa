//! User payloads and read model.
//!
//! # Invariants
//! - Emails are unique across users (enforced by storage, reported as
//!   `Conflict`).
//! - Name bound differs between create (100) and update (50).

use crate::model::validation::{
    ensure_max_chars, ValidationError, USER_EMAIL_MAX_CHARS, USER_NAME_MAX_CHARS,
    USER_NAME_UPDATE_MAX_CHARS,
};
use serde::{Deserialize, Serialize};

/// Row id of a user.
pub type UserId = i64;

/// Payload for creating one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
}

impl UserCreate {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_max_chars("user.name", &self.name, USER_NAME_MAX_CHARS)?;
        ensure_max_chars("user.email", &self.email, USER_EMAIL_MAX_CHARS)
    }
}

/// Payload for replacing a user's name and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl UserUpdate {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_max_chars("user.name", &self.name, USER_NAME_UPDATE_MAX_CHARS)?;
        ensure_max_chars("user.email", &self.email, USER_EMAIL_MAX_CHARS)
    }
}

/// User read model. Owned work items are not projected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::{UserCreate, UserUpdate};

    #[test]
    fn update_name_bound_is_stricter_than_create() {
        let name = "n".repeat(75);
        assert!(UserCreate::new(name.clone(), "a@b").validate().is_ok());
        assert!(UserUpdate::new(1, name, "a@b").validate().is_err());
    }
}
