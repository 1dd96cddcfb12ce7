//! Pure position engine.
//!
//! # Responsibility
//! - Turn an ordered snapshot plus one requested change into the minimal set
//!   of `(id, new_position)` writes.
//!
//! # Invariants
//! - Functions never mutate their input and never touch storage.
//! - Applying the returned updates to a dense snapshot yields a dense
//!   snapshot (`0..N` with no gaps or duplicates).
//! - Move targets outside `0..N` are clamped, never rejected.

use crate::model::todo::TodoId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// `(id, position)` pair of one entry in an owner's ordered snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub id: TodoId,
    pub position: i64,
}

/// One position write produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: TodoId,
    pub position: i64,
}

/// Errors from position engine computations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// Target id is not part of the snapshot.
    NotFound(TodoId),
}

impl Display for PositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "todo {id} is not part of the snapshot"),
        }
    }
}

impl Error for PositionError {}

/// Returns the position for a newly appended entry.
///
/// `0` for an empty snapshot, otherwise one past the current maximum.
pub fn insert_position(slots: &[Slot]) -> i64 {
    slots
        .iter()
        .map(|slot| slot.position)
        .max()
        .map_or(0, |max| max + 1)
}

/// Closes the gap left by removing the entry at `deleted_position`.
///
/// Every entry ranked after the gap moves up by one; entries at or before it
/// are untouched. The removed entry itself may stay in `slots`: it sits at
/// `deleted_position` and is therefore never reported.
pub fn delete_shift(slots: &[Slot], deleted_position: i64) -> Vec<PositionUpdate> {
    slots
        .iter()
        .filter(|slot| slot.position > deleted_position)
        .map(|slot| PositionUpdate {
            id: slot.id,
            position: slot.position - 1,
        })
        .collect()
}

/// Moves `target_id` to `requested_position`, shifting the entries between the
/// old and new rank by one.
///
/// The requested position is clamped into `0..=len-1`. Moving an entry onto
/// its current position returns an empty diff. Updates are ordered by their
/// new position.
///
/// # Errors
/// - [`PositionError::NotFound`] when `target_id` is absent from `slots`.
pub fn move_entry(
    slots: &[Slot],
    target_id: TodoId,
    requested_position: i64,
) -> Result<Vec<PositionUpdate>, PositionError> {
    let old_position = slots
        .iter()
        .find(|slot| slot.id == target_id)
        .map(|slot| slot.position)
        .ok_or(PositionError::NotFound(target_id))?;

    let last = slots.len() as i64 - 1;
    let clamped = requested_position.clamp(0, last);
    if clamped == old_position {
        return Ok(Vec::new());
    }

    let mut updates = Vec::new();
    for slot in slots {
        if slot.id == target_id {
            continue;
        }
        let shifted = if old_position < clamped {
            (slot.position > old_position && slot.position <= clamped)
                .then_some(slot.position - 1)
        } else {
            (slot.position >= clamped && slot.position < old_position)
                .then_some(slot.position + 1)
        };
        if let Some(position) = shifted {
            updates.push(PositionUpdate {
                id: slot.id,
                position,
            });
        }
    }
    updates.push(PositionUpdate {
        id: target_id,
        position: clamped,
    });
    updates.sort_by_key(|update| (update.position, update.id));

    Ok(updates)
}

/// Renumbers `slots` to `0..N` in the given order.
///
/// Callers pass survivors in their prior `(position, id)` order; only entries
/// whose position changes are returned, so an already dense snapshot yields an
/// empty diff.
pub fn compact(slots: &[Slot]) -> Vec<PositionUpdate> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| {
            let position = index as i64;
            (slot.position != position).then_some(PositionUpdate {
                id: slot.id,
                position,
            })
        })
        .collect()
}

/// Returns whether positions in `slots` are exactly `0..N`.
pub fn is_dense(slots: &[Slot]) -> bool {
    let mut positions = slots.iter().map(|slot| slot.position).collect::<Vec<_>>();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as i64)
}

#[cfg(test)]
mod tests {
    use super::{
        compact, delete_shift, insert_position, is_dense, move_entry, PositionError,
        PositionUpdate, Slot,
    };

    fn apply_updates(slots: &[Slot], updates: &[PositionUpdate]) -> Vec<Slot> {
        let mut result = slots.to_vec();
        for update in updates {
            if let Some(slot) = result.iter_mut().find(|slot| slot.id == update.id) {
                slot.position = update.position;
            }
        }
        result.sort_by_key(|slot| (slot.position, slot.id));
        result
    }

    fn slots(pairs: &[(i64, i64)]) -> Vec<Slot> {
        pairs
            .iter()
            .map(|&(id, position)| Slot { id, position })
            .collect()
    }

    fn update(id: i64, position: i64) -> PositionUpdate {
        PositionUpdate { id, position }
    }

    #[test]
    fn insert_position_starts_at_zero_and_appends_after_max() {
        assert_eq!(insert_position(&[]), 0);
        assert_eq!(insert_position(&slots(&[(7, 0), (3, 1), (9, 2)])), 3);
    }

    #[test]
    fn delete_shift_moves_only_trailing_entries() {
        let snapshot = slots(&[(1, 0), (2, 1), (3, 2), (4, 3)]);
        assert_eq!(
            delete_shift(&snapshot, 1),
            vec![update(3, 1), update(4, 2)]
        );
        assert!(delete_shift(&snapshot, 3).is_empty());
    }

    #[test]
    fn delete_shift_on_single_entry_is_noop() {
        assert!(delete_shift(&slots(&[(1, 0)]), 0).is_empty());
        assert!(delete_shift(&[], 0).is_empty());
    }

    #[test]
    fn move_right_shifts_intermediate_entries_left() {
        let snapshot = slots(&[(1, 0), (2, 1), (3, 2)]);
        let updates = move_entry(&snapshot, 1, 2).unwrap();
        assert_eq!(updates, vec![update(2, 0), update(3, 1), update(1, 2)]);
        assert_eq!(
            apply_updates(&snapshot, &updates),
            slots(&[(2, 0), (3, 1), (1, 2)])
        );
    }

    #[test]
    fn move_left_shifts_intermediate_entries_right() {
        let snapshot = slots(&[(1, 0), (2, 1), (3, 2), (4, 3)]);
        let updates = move_entry(&snapshot, 4, 1).unwrap();
        assert_eq!(updates, vec![update(4, 1), update(2, 2), update(3, 3)]);
    }

    #[test]
    fn move_leaves_entries_outside_range_untouched() {
        let snapshot = slots(&[(1, 0), (2, 1), (3, 2), (4, 3), (5, 4)]);
        let updates = move_entry(&snapshot, 2, 3).unwrap();
        assert_eq!(updates, vec![update(3, 1), update(4, 2), update(2, 3)]);
    }

    #[test]
    fn move_clamps_out_of_range_targets() {
        let snapshot = slots(&[(1, 0), (2, 1), (3, 2)]);
        assert_eq!(
            move_entry(&snapshot, 1, 99).unwrap(),
            move_entry(&snapshot, 1, 2).unwrap()
        );
        assert_eq!(
            move_entry(&snapshot, 3, -5).unwrap(),
            move_entry(&snapshot, 3, 0).unwrap()
        );
    }

    #[test]
    fn move_to_current_position_is_empty_diff() {
        let snapshot = slots(&[(1, 0), (2, 1), (3, 2)]);
        assert!(move_entry(&snapshot, 2, 1).unwrap().is_empty());
        assert!(move_entry(&slots(&[(1, 0)]), 1, 5).unwrap().is_empty());
    }

    #[test]
    fn move_unknown_target_is_not_found() {
        assert_eq!(
            move_entry(&slots(&[(1, 0)]), 42, 0).unwrap_err(),
            PositionError::NotFound(42)
        );
        assert_eq!(move_entry(&[], 1, 0).unwrap_err(), PositionError::NotFound(1));
    }

    #[test]
    fn compact_reports_only_changed_entries() {
        let survivors = slots(&[(1, 0), (4, 2), (6, 5)]);
        assert_eq!(compact(&survivors), vec![update(4, 1), update(6, 2)]);
        assert!(compact(&slots(&[(1, 0), (2, 1)])).is_empty());
    }

    #[test]
    fn is_dense_detects_gaps_and_duplicates() {
        assert!(is_dense(&[]));
        assert!(is_dense(&slots(&[(2, 1), (1, 0)])));
        assert!(!is_dense(&slots(&[(1, 0), (2, 2)])));
        assert!(!is_dense(&slots(&[(1, 0), (2, 0)])));
        assert!(!is_dense(&slots(&[(1, 1)])));
    }
}
