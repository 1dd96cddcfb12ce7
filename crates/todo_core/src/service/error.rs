//! Error taxonomy for todo operations.
//!
//! # Invariants
//! - `NotFound` and `Validation` are terminal and never retried by core.
//! - Every storage-level failure surfaces as `StorageFailure`, after the
//!   surrounding transaction has been rolled back.

use crate::model::todo::{TodoId, TodoValidationError};
use crate::ordering::position::PositionError;
use crate::repo::todo_repo::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by todo operations.
pub type TodoResult<T> = Result<T, TodoError>;

/// Errors returned by todo operations to the API layer.
#[derive(Debug)]
pub enum TodoError {
    /// Referenced todo is absent or owned by someone else.
    NotFound(TodoId),
    /// Caller input was malformed.
    Validation(TodoValidationError),
    /// The store could not complete or commit the transaction.
    StorageFailure(StoreError),
}

impl TodoError {
    /// Returns whether a caller may retry the same request against a fresh
    /// snapshot with a reasonable chance of success.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StorageFailure(err) => err.is_busy(),
            Self::NotFound(_) | Self::Validation(_) => false,
        }
    }
}

impl Display for TodoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::StorageFailure(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for TodoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Validation(err) => Some(err),
            Self::StorageFailure(err) => Some(err),
        }
    }
}

impl From<TodoValidationError> for TodoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for TodoError {
    fn from(value: StoreError) -> Self {
        Self::StorageFailure(value)
    }
}

impl From<PositionError> for TodoError {
    fn from(value: PositionError) -> Self {
        match value {
            PositionError::NotFound(id) => Self::NotFound(id),
        }
    }
}
