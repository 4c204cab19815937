//! Change application.

use crate::change::set::{ChangeKind, ChangeSet};
use crate::entity::Entity;
use crate::error::CoreResult;
use crate::table::RecordTable;
use chrono::{DateTime, Utc};

/// Applies `change_set` to `table` in submission order.
///
/// Every change receives the same `now` stamp. Returns the number of
/// changes processed, which includes deletes of absent keys.
///
/// Stops at the first failing change and returns its error; `table` is
/// then left with the changes before it applied. Callers that need
/// all-or-nothing semantics apply to a staged copy (see
/// [`crate::JsonStore::save_changes`]).
///
/// # Errors
///
/// - [`crate::CoreError::DuplicateKey`] for an `Added` change on a live key
/// - [`crate::CoreError::UpdateTargetAbsent`] for an `Updated` change on an
///   absent key
pub fn apply_change_set<E: Entity>(
    table: &mut RecordTable<E>,
    change_set: ChangeSet<E>,
    now: DateTime<Utc>,
) -> CoreResult<usize> {
    let mut applied = 0usize;

    for operation in change_set {
        let (key, entity, kind) = operation.into_parts();
        match kind {
            ChangeKind::Added => table.add(key, entity, now)?,
            ChangeKind::Updated => table.update(&key, entity, now)?,
            ChangeKind::Deleted => {
                table.delete(&key);
            }
        }
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::set::ChangeOperation;
    use crate::entity::EntityKey;
    use crate::error::CoreError;
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: u32,
        label: String,
    }

    impl Entity for Item {
        const TYPE_NAME: &'static str = "Item";

        fn key(&self) -> EntityKey {
            EntityKey::from(self.id)
        }
    }

    fn item(id: u32, label: &str) -> Item {
        Item {
            id,
            label: label.into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 5, 5, 5, 5).unwrap()
    }

    #[test]
    fn counts_every_operation() {
        let mut table = RecordTable::new();
        let changes = ChangeSet::new()
            .add(item(1, "a"))
            .add(item(2, "b"))
            .delete(item(9, "never stored"));

        assert_eq!(apply_change_set(&mut table, changes, now()).unwrap(), 3);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn applies_in_submission_order() {
        let mut table = RecordTable::new();
        let changes = ChangeSet::new()
            .add(item(1, "first"))
            .delete(item(1, "first"))
            .add(item(1, "second"));

        apply_change_set(&mut table, changes, now()).unwrap();
        assert_eq!(table.get(&EntityKey::from(1u32)).unwrap().entity().label, "second");
    }

    #[test]
    fn explicit_keys_are_respected() {
        let mut table = RecordTable::new();
        let changes: ChangeSet<Item> = [ChangeOperation::new(
            EntityKey::from("custom"),
            item(1, "a"),
            ChangeKind::Added,
        )]
        .into_iter()
        .collect();

        apply_change_set(&mut table, changes, now()).unwrap();
        assert!(table.contains(&EntityKey::from("custom")));
        assert!(!table.contains(&EntityKey::from(1u32)));
    }

    #[test]
    fn stops_at_first_failure() {
        let mut table = RecordTable::new();
        let changes = ChangeSet::new()
            .add(item(1, "a"))
            .update(item(2, "missing"))
            .add(item(3, "c"));

        let err = apply_change_set(&mut table, changes, now()).unwrap_err();
        assert!(matches!(err, CoreError::UpdateTargetAbsent { .. }));
        assert!(table.contains(&EntityKey::from(1u32)));
        assert!(!table.contains(&EntityKey::from(3u32)));
    }

    #[test]
    fn empty_change_set_applies_nothing() {
        let mut table: RecordTable<Item> = RecordTable::new();
        assert_eq!(apply_change_set(&mut table, ChangeSet::new(), now()).unwrap(), 0);
    }
}
