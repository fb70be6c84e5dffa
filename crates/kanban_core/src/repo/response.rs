//! Outcome taxonomy returned by every repository write.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Classified result of a repository write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Response {
    Created,
    Updated,
    Deleted,
    /// Target id does not exist.
    NotFound,
    /// Input failed validation or referenced a missing row.
    BadRequest,
    /// Uniqueness violation, or a state/ownership guard refused the write.
    Conflict,
}

impl Response {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Created | Self::Updated | Self::Deleted)
    }

    /// Stable snake_case label used in log events.
    pub fn as_log_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Conflict => "conflict",
        }
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_log_str())
    }
}

/// Result of a `create` call: the outcome plus the new row id on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub response: Response,
    pub id: Option<i64>,
}

impl Outcome {
    pub fn created(id: i64) -> Self {
        Self {
            response: Response::Created,
            id: Some(id),
        }
    }

    /// Failed create; carries no id.
    pub fn rejected(response: Response) -> Self {
        Self { response, id: None }
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, Response};

    #[test]
    fn only_write_kinds_count_as_success() {
        assert!(Response::Created.is_success());
        assert!(Response::Updated.is_success());
        assert!(Response::Deleted.is_success());
        assert!(!Response::NotFound.is_success());
        assert!(!Response::BadRequest.is_success());
        assert!(!Response::Conflict.is_success());
    }

    #[test]
    fn rejected_outcome_has_no_id() {
        assert_eq!(Outcome::rejected(Response::Conflict).id, None);
        assert_eq!(Outcome::created(7).id, Some(7));
    }
}
