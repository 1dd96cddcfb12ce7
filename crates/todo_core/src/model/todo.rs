//! Todo domain model.
//!
//! # Responsibility
//! - Define the persisted todo record and its identifier types.
//! - Validate user-supplied text and target positions.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another todo.
//! - `owner_id` is fixed at creation.
//! - `text` is stored trimmed and is never blank.
//! - `position` is non-negative.

use crate::ordering::position::Slot;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Store-assigned todo identifier.
pub type TodoId = i64;

/// Already-authenticated identifier of the user owning a list.
pub type OwnerId = Uuid;

/// One item of an owner's ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub owner_id: OwnerId,
    pub text: String,
    pub completed: bool,
    /// Zero-based rank within the owner's list.
    pub position: i64,
}

impl Todo {
    /// Projects this row onto the `(id, position)` pair the position engine
    /// works with.
    pub fn slot(&self) -> Slot {
        Slot {
            id: self.id,
            position: self.position,
        }
    }
}

/// Validation errors for caller-supplied todo input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Text is empty or whitespace-only.
    BlankText,
    /// Requested move target is below zero.
    NegativePosition(i64),
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankText => write!(f, "todo text must not be blank"),
            Self::NegativePosition(value) => {
                write!(f, "target position must be >= 0, got {value}")
            }
        }
    }
}

impl Error for TodoValidationError {}

/// Trims `text` and rejects blank input.
pub fn normalize_text(text: &str) -> Result<String, TodoValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TodoValidationError::BlankText);
    }
    Ok(trimmed.to_string())
}

/// Rejects negative move targets. Values past the end are left to the
/// position engine, which clamps them.
pub fn validate_target_position(position: i64) -> Result<i64, TodoValidationError> {
    if position < 0 {
        return Err(TodoValidationError::NegativePosition(position));
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::{normalize_text, validate_target_position, TodoValidationError};

    #[test]
    fn normalize_text_trims_surrounding_whitespace() {
        assert_eq!(normalize_text("  buy milk \n").unwrap(), "buy milk");
    }

    #[test]
    fn normalize_text_rejects_whitespace_only() {
        assert_eq!(
            normalize_text(" \t\n").unwrap_err(),
            TodoValidationError::BlankText
        );
        assert_eq!(normalize_text("").unwrap_err(), TodoValidationError::BlankText);
    }

    #[test]
    fn target_position_accepts_zero_and_rejects_negative() {
        assert_eq!(validate_target_position(0).unwrap(), 0);
        assert_eq!(validate_target_position(99).unwrap(), 99);
        assert_eq!(
            validate_target_position(-1).unwrap_err(),
            TodoValidationError::NegativePosition(-1)
        );
    }
}
