use proptest::prelude::*;
use proptest::sample::Index;
use todo_core::ordering::position::{
    compact, delete_shift, insert_position, is_dense, move_entry, PositionUpdate, Slot,
};

fn dense_snapshot(min_len: usize) -> impl Strategy<Value = Vec<Slot>> {
    (min_len..24)
        .prop_flat_map(|len| Just((1..=len as i64).collect::<Vec<_>>()).prop_shuffle())
        .prop_map(|ids| {
            ids.into_iter()
                .enumerate()
                .map(|(position, id)| Slot {
                    id,
                    position: position as i64,
                })
                .collect::<Vec<_>>()
        })
}

// Updates for ids missing from `slots` are ignored.
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

fn ids(slots: &[Slot]) -> Vec<i64> {
    slots.iter().map(|slot| slot.id).collect()
}

proptest! {
    #[test]
    fn insert_appends_at_len(snapshot in dense_snapshot(0)) {
        prop_assert_eq!(insert_position(&snapshot), snapshot.len() as i64);
    }

    #[test]
    fn move_keeps_dense_and_lands_on_clamped_slot(
        snapshot in dense_snapshot(1),
        pick in any::<Index>(),
        requested in 0i64..40,
    ) {
        let target = snapshot[pick.index(snapshot.len())];
        let updates = move_entry(&snapshot, target.id, requested).unwrap();
        let after = apply_updates(&snapshot, &updates);

        prop_assert!(is_dense(&after));
        let landed = requested.min(snapshot.len() as i64 - 1) as usize;
        prop_assert_eq!(after[landed].id, target.id);

        let others_before = snapshot
            .iter()
            .filter(|slot| slot.id != target.id)
            .map(|slot| slot.id)
            .collect::<Vec<_>>();
        let others_after = after
            .iter()
            .filter(|slot| slot.id != target.id)
            .map(|slot| slot.id)
            .collect::<Vec<_>>();
        prop_assert_eq!(others_before, others_after);

        for update in &updates {
            let old = snapshot.iter().find(|slot| slot.id == update.id).unwrap();
            prop_assert_ne!(old.position, update.position);
        }
    }

    #[test]
    fn delete_shift_keeps_survivors_dense(snapshot in dense_snapshot(1), pick in any::<Index>()) {
        let deleted = snapshot[pick.index(snapshot.len())];
        let survivors = snapshot
            .iter()
            .copied()
            .filter(|slot| slot.id != deleted.id)
            .collect::<Vec<_>>();

        let updates = delete_shift(&snapshot, deleted.position);
        prop_assert!(updates.iter().all(|update| update.id != deleted.id));

        let after = apply_updates(&survivors, &updates);
        prop_assert!(is_dense(&after));
        prop_assert_eq!(ids(&after), ids(&survivors));
    }

    #[test]
    fn compact_after_clearing_keeps_order(
        (snapshot, completed) in dense_snapshot(0).prop_flat_map(|snapshot| {
            let len = snapshot.len();
            (Just(snapshot), proptest::collection::vec(any::<bool>(), len))
        }),
    ) {
        let survivors = snapshot
            .iter()
            .zip(&completed)
            .filter(|(_, done)| !**done)
            .map(|(slot, _)| *slot)
            .collect::<Vec<_>>();

        let updates = compact(&survivors);
        let after = apply_updates(&survivors, &updates);
        prop_assert!(is_dense(&after));
        prop_assert_eq!(ids(&after), ids(&survivors));
        if completed.iter().all(|done| !done) {
            prop_assert!(updates.is_empty());
        }
    }
}
