//! Input bound checks shared by all write payloads.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum tag name length, in characters.
pub const TAG_NAME_MAX_CHARS: usize = 50;
/// Maximum user name length accepted on create, in characters.
pub const USER_NAME_MAX_CHARS: usize = 100;
/// Maximum user name length accepted on update, in characters.
///
/// Stricter than [`USER_NAME_MAX_CHARS`]; existing callers assert on both.
pub const USER_NAME_UPDATE_MAX_CHARS: usize = 50;
/// Maximum user email length, in characters.
pub const USER_EMAIL_MAX_CHARS: usize = 100;
/// Maximum work item title length, in characters.
pub const WORK_ITEM_TITLE_MAX_CHARS: usize = 100;

/// Payload validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field value exceeds its character bound.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong { field, max, actual } => write!(
                f,
                "{field} has {actual} characters, at most {max} are allowed"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Rejects `value` when it has more than `max` characters.
pub fn ensure_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_max_chars, ValidationError};

    #[test]
    fn bound_is_inclusive() {
        assert!(ensure_max_chars("name", &"a".repeat(50), 50).is_ok());
        assert_eq!(
            ensure_max_chars("name", &"a".repeat(51), 50),
            Err(ValidationError::TooLong {
                field: "name",
                max: 50,
                actual: 51
            })
        );
    }

    #[test]
    fn bound_counts_characters_not_bytes() {
        // 50 two-byte characters stay within a 50 character bound.
        assert!(ensure_max_chars("name", &"é".repeat(50), 50).is_ok());
    }
}
