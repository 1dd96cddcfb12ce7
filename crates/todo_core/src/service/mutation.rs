//! Transactional mutation orchestrator.
//!
//! # Responsibility
//! - Wrap snapshot read, position computation and diff write-back in one
//!   store transaction per operation.
//! - Report exactly how many rows each mutation wrote.
//!
//! # Invariants
//! - Only rows reported by the position engine are repositioned.
//! - A failing step aborts the whole transaction; no partial renumbering is
//!   ever committed.
//! - No input validation happens here; callers pass already-checked values.

use crate::model::todo::{OwnerId, Todo, TodoId};
use crate::ordering::position::{compact, delete_shift, insert_position, move_entry, Slot};
use crate::repo::todo_repo::TodoStore;
use crate::service::error::{TodoError, TodoResult};
use log::{info, warn};
use std::time::Instant;

/// Row writes performed by one committed mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSummary {
    /// Rows created.
    pub inserted: usize,
    /// Rows deleted.
    pub removed: usize,
    /// Rows whose position was rewritten.
    pub repositioned: usize,
    /// Rows whose text or completion flag was rewritten.
    pub updated: usize,
}

impl MutationSummary {
    /// Total number of row writes.
    pub fn writes(&self) -> usize {
        self.inserted + self.removed + self.repositioned + self.updated
    }

    /// Returns whether the mutation committed without writing any row.
    pub fn is_noop(&self) -> bool {
        self.writes() == 0
    }
}

/// Runs owner-scoped mutations against a [`TodoStore`].
pub struct MutationOrchestrator<S: TodoStore> {
    store: S,
}

impl<S: TodoStore> MutationOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store, for read-only access.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Appends a new uncompleted todo after the owner's current last item.
    pub fn insert(&self, owner_id: OwnerId, text: &str) -> TodoResult<(Todo, MutationSummary)> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<(Todo, MutationSummary)> {
                let snapshot = rows.fetch_owned_ordered(owner_id)?;
                let position = insert_position(&slots(&snapshot));
                let created = rows.insert_row(owner_id, text, position)?;
                let summary = MutationSummary {
                    inserted: 1,
                    ..MutationSummary::default()
                };
                Ok((created, summary))
            });
        log_outcome("todo_create", owner_id, None, started_at, &result);
        result
    }

    /// Deletes one owned todo and closes the gap behind it.
    pub fn remove(&self, owner_id: OwnerId, id: TodoId) -> TodoResult<MutationSummary> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<((), MutationSummary)> {
                let target = rows
                    .fetch_one(id, owner_id)?
                    .ok_or(TodoError::NotFound(id))?;
                let snapshot = rows.fetch_owned_ordered(owner_id)?;
                let removed = rows.delete_rows(owner_id, &[target.id])?;
                let updates = delete_shift(&slots(&snapshot), target.position);
                let repositioned = rows.apply_position_updates(owner_id, &updates)?;
                Ok((
                    (),
                    MutationSummary {
                        removed,
                        repositioned,
                        ..MutationSummary::default()
                    },
                ))
            });
        log_outcome("todo_delete", owner_id, Some(id), started_at, &result);
        result.map(|(_, summary)| summary)
    }

    /// Moves one owned todo to `requested_position`, clamped to the list
    /// bounds.
    pub fn reposition(
        &self,
        owner_id: OwnerId,
        id: TodoId,
        requested_position: i64,
    ) -> TodoResult<MutationSummary> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<((), MutationSummary)> {
                let snapshot = rows.fetch_owned_ordered(owner_id)?;
                let updates = move_entry(&slots(&snapshot), id, requested_position)?;
                let repositioned = rows.apply_position_updates(owner_id, &updates)?;
                Ok((
                    (),
                    MutationSummary {
                        repositioned,
                        ..MutationSummary::default()
                    },
                ))
            });
        log_outcome("todo_move", owner_id, Some(id), started_at, &result);
        result.map(|(_, summary)| summary)
    }

    /// Deletes every completed todo of the owner and renumbers survivors in
    /// their prior order.
    pub fn remove_completed(&self, owner_id: OwnerId) -> TodoResult<MutationSummary> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<((), MutationSummary)> {
                let snapshot = rows.fetch_owned_ordered(owner_id)?;
                let (done, survivors): (Vec<&Todo>, Vec<&Todo>) =
                    snapshot.iter().partition(|todo| todo.completed);

                let removed = if done.is_empty() {
                    0
                } else {
                    let ids = done.iter().map(|todo| todo.id).collect::<Vec<_>>();
                    rows.delete_rows(owner_id, &ids)?
                };
                let survivor_slots = survivors.iter().map(|todo| todo.slot()).collect::<Vec<_>>();
                let updates = compact(&survivor_slots);
                let repositioned = rows.apply_position_updates(owner_id, &updates)?;
                Ok((
                    (),
                    MutationSummary {
                        removed,
                        repositioned,
                        ..MutationSummary::default()
                    },
                ))
            });
        log_outcome("todo_clear_completed", owner_id, None, started_at, &result);
        result.map(|(_, summary)| summary)
    }

    /// Renumbers all of the owner's todos to `0..N` in their current order.
    pub fn renumber(&self, owner_id: OwnerId) -> TodoResult<MutationSummary> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<((), MutationSummary)> {
                let snapshot = rows.fetch_owned_ordered(owner_id)?;
                let updates = compact(&slots(&snapshot));
                let repositioned = rows.apply_position_updates(owner_id, &updates)?;
                Ok((
                    (),
                    MutationSummary {
                        repositioned,
                        ..MutationSummary::default()
                    },
                ))
            });
        log_outcome("todo_repair_order", owner_id, None, started_at, &result);
        result.map(|(_, summary)| summary)
    }

    /// Flips the completion flag of one owned todo.
    pub fn flip_completed(
        &self,
        owner_id: OwnerId,
        id: TodoId,
    ) -> TodoResult<(Todo, MutationSummary)> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<(Todo, MutationSummary)> {
                let mut todo = rows
                    .fetch_one(id, owner_id)?
                    .ok_or(TodoError::NotFound(id))?;
                todo.completed = !todo.completed;
                if !rows.set_completed(id, owner_id, todo.completed)? {
                    return Err(TodoError::NotFound(id));
                }
                let summary = MutationSummary {
                    updated: 1,
                    ..MutationSummary::default()
                };
                Ok((todo, summary))
            });
        log_outcome("todo_toggle", owner_id, Some(id), started_at, &result);
        result
    }

    /// Replaces the text of one owned todo.
    pub fn replace_text(
        &self,
        owner_id: OwnerId,
        id: TodoId,
        text: &str,
    ) -> TodoResult<(Todo, MutationSummary)> {
        let started_at = Instant::now();
        let result = self
            .store
            .write_transaction(|rows| -> TodoResult<(Todo, MutationSummary)> {
                if !rows.set_text(id, owner_id, text)? {
                    return Err(TodoError::NotFound(id));
                }
                let todo = rows
                    .fetch_one(id, owner_id)?
                    .ok_or(TodoError::NotFound(id))?;
                let summary = MutationSummary {
                    updated: 1,
                    ..MutationSummary::default()
                };
                Ok((todo, summary))
            });
        log_outcome("todo_edit", owner_id, Some(id), started_at, &result);
        result
    }
}

fn slots(snapshot: &[Todo]) -> Vec<Slot> {
    snapshot.iter().map(Todo::slot).collect()
}

// Logs ids and counts only; todo text never reaches the log file.
fn log_outcome<T>(
    event: &str,
    owner_id: OwnerId,
    todo_id: Option<TodoId>,
    started_at: Instant,
    result: &TodoResult<(T, MutationSummary)>,
) {
    let todo_id = todo_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match result {
        Ok((_, summary)) => info!(
            "event={} module=orchestrator status=ok owner_id={} todo_id={} inserted={} removed={} repositioned={} updated={} duration_ms={}",
            event,
            owner_id,
            todo_id,
            summary.inserted,
            summary.removed,
            summary.repositioned,
            summary.updated,
            started_at.elapsed().as_millis()
        ),
        Err(TodoError::StorageFailure(err)) => warn!(
            "event={} module=orchestrator status=error owner_id={} todo_id={} error_code=storage_failure retryable={} duration_ms={} error={}",
            event,
            owner_id,
            todo_id,
            err.is_busy(),
            started_at.elapsed().as_millis(),
            err
        ),
        Err(err) => info!(
            "event={} module=orchestrator status=rejected owner_id={} todo_id={} duration_ms={} error={}",
            event,
            owner_id,
            todo_id,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
