//! Todo list use-case service.
//!
//! # Responsibility
//! - Expose the owner-scoped verbs: create, delete, toggle, move, clear
//!   completed, list, plus edit and ordering maintenance.
//! - Reject malformed input before any transaction starts.
//!
//! # Invariants
//! - `owner_id` is trusted as already authenticated and is passed explicitly
//!   into every call.
//! - After every committed call the owner's positions are exactly `0..N`.
//! - Failed calls leave the owner's rows as they were.

use crate::model::todo::{normalize_text, validate_target_position, OwnerId, Todo, TodoId};
use crate::ordering::position::is_dense;
use crate::repo::todo_repo::TodoStore;
use crate::service::error::TodoResult;
use crate::service::mutation::{MutationOrchestrator, MutationSummary};

/// Read-only view of an owner's ordering health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingReport {
    /// Number of todos owned.
    pub count: usize,
    /// Whether positions are exactly `0..count`.
    pub dense: bool,
}

/// Todo list service facade.
pub struct TodoService<S: TodoStore> {
    orchestrator: MutationOrchestrator<S>,
}

impl<S: TodoStore> TodoService<S> {
    /// Creates service from store implementation.
    pub fn new(store: S) -> Self {
        Self {
            orchestrator: MutationOrchestrator::new(store),
        }
    }

    /// Appends a todo to the end of the owner's list.
    ///
    /// # Contract
    /// - Leading and trailing whitespace is trimmed before storing; the
    ///   returned and listed text is the trimmed value.
    /// - The new todo is uncompleted and placed at `max(position) + 1`.
    ///
    /// # Errors
    /// - `Validation(BlankText)` when `text` is blank after trim.
    pub fn create(&self, owner_id: OwnerId, text: &str) -> TodoResult<Todo> {
        let normalized = normalize_text(text)?;
        self.orchestrator
            .insert(owner_id, normalized.as_str())
            .map(|(todo, _)| todo)
    }

    /// Deletes one todo and shifts the ones behind it up.
    ///
    /// # Errors
    /// - `NotFound` when `id` is absent or not owned by `owner_id`.
    pub fn delete(&self, owner_id: OwnerId, id: TodoId) -> TodoResult<MutationSummary> {
        self.orchestrator.remove(owner_id, id)
    }

    /// Flips the completion flag and returns the updated todo.
    pub fn toggle_completed(&self, owner_id: OwnerId, id: TodoId) -> TodoResult<Todo> {
        self.orchestrator
            .flip_completed(owner_id, id)
            .map(|(todo, _)| todo)
    }

    /// Replaces the text of one todo without touching its position.
    ///
    /// Text is trimmed the same way as in [`Self::create`].
    pub fn edit_text(&self, owner_id: OwnerId, id: TodoId, text: &str) -> TodoResult<Todo> {
        let normalized = normalize_text(text)?;
        self.orchestrator
            .replace_text(owner_id, id, normalized.as_str())
            .map(|(todo, _)| todo)
    }

    /// Moves one todo to `requested_position`.
    ///
    /// Positions past the end of the list are clamped to the last slot.
    ///
    /// # Errors
    /// - `Validation(NegativePosition)` when `requested_position < 0`.
    /// - `NotFound` when `id` is absent or not owned by `owner_id`.
    pub fn move_todo(
        &self,
        owner_id: OwnerId,
        id: TodoId,
        requested_position: i64,
    ) -> TodoResult<MutationSummary> {
        let requested_position = validate_target_position(requested_position)?;
        self.orchestrator
            .reposition(owner_id, id, requested_position)
    }

    /// Deletes all completed todos and compacts the survivors.
    pub fn clear_completed(&self, owner_id: OwnerId) -> TodoResult<MutationSummary> {
        self.orchestrator.remove_completed(owner_id)
    }

    /// Lists the owner's todos ordered by `(position, id)`.
    pub fn list(&self, owner_id: OwnerId) -> TodoResult<Vec<Todo>> {
        Ok(self.orchestrator.store().read_ordered(owner_id)?)
    }

    /// Loads one owned todo.
    pub fn get(&self, owner_id: OwnerId, id: TodoId) -> TodoResult<Option<Todo>> {
        Ok(self.orchestrator.store().read_one(id, owner_id)?)
    }

    /// Checks whether the owner's positions satisfy the dense invariant.
    pub fn verify_ordering(&self, owner_id: OwnerId) -> TodoResult<OrderingReport> {
        let snapshot = self.list(owner_id)?;
        let slots = snapshot.iter().map(Todo::slot).collect::<Vec<_>>();
        Ok(OrderingReport {
            count: slots.len(),
            dense: is_dense(&slots),
        })
    }

    /// Renumbers the owner's todos to `0..N`, keeping their relative order.
    ///
    /// Writes nothing when the ordering is already dense.
    pub fn repair_ordering(&self, owner_id: OwnerId) -> TodoResult<MutationSummary> {
        self.orchestrator.renumber(owner_id)
    }
}
