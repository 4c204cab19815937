//! In-memory record table.

use crate::entity::{Entity, EntityKey, EntityRecord, Metadata};
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Mapping from identity to record, with metadata stored inline.
///
/// This is the single source of truth for a store's contents. Iteration
/// order is ascending [`EntityKey`] order, which is also the order records
/// are written to disk.
///
/// The mutating operations maintain the metadata rules:
///
/// | operation | effect on metadata |
/// |-----------|--------------------|
/// | [`add`](Self::add) | new metadata, `created_at = last_modified_at = now` |
/// | [`update`](Self::update) | keeps `created_at`, sets `last_modified_at = now` |
/// | [`delete`](Self::delete) | removed with the record |
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable<E> {
    records: BTreeMap<EntityKey, EntityRecord<E>>,
}

impl<E> Default for RecordTable<E> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<E> RecordTable<E> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record for `key`.
    #[must_use]
    pub fn get(&self, key: &EntityKey) -> Option<&EntityRecord<E>> {
        self.records.get(key)
    }

    /// Returns `true` if a record exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.records.contains_key(key)
    }

    /// Number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates payloads in key order.
    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.records.values().map(EntityRecord::entity)
    }

    /// Iterates records in key order.
    pub fn records(&self) -> impl Iterator<Item = &EntityRecord<E>> {
        self.records.values()
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.records.keys()
    }

    /// Inserts a record read from storage, keyed by its metadata identity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Corrupted`] if the identity is already present.
    pub fn insert_loaded(&mut self, record: EntityRecord<E>) -> CoreResult<()> {
        let key = record.key().clone();
        if self.records.contains_key(&key) {
            return Err(CoreError::corrupted(format!(
                "duplicate identity {key} in store file"
            )));
        }
        self.records.insert(key, record);
        Ok(())
    }

    /// Removes the record for `key`.
    ///
    /// Returns `false` if there was nothing to remove; deleting an absent
    /// key is not an error.
    pub fn delete(&mut self, key: &EntityKey) -> bool {
        self.records.remove(key).is_some()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<E: Entity> RecordTable<E> {
    /// Adds a new record stamped at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateKey`] if `key` already has a record.
    pub fn add(&mut self, key: EntityKey, entity: E, now: DateTime<Utc>) -> CoreResult<()> {
        if self.records.contains_key(&key) {
            return Err(CoreError::DuplicateKey { key });
        }
        let metadata = Metadata::created(key.clone(), entity.type_tag(), now);
        self.records.insert(key, EntityRecord::new(entity, metadata));
        Ok(())
    }

    /// Replaces the payload of an existing record, stamped at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UpdateTargetAbsent`] if `key` has no record.
    pub fn update(&mut self, key: &EntityKey, entity: E, now: DateTime<Utc>) -> CoreResult<()> {
        let Some(existing) = self.records.get_mut(key) else {
            return Err(CoreError::UpdateTargetAbsent { key: key.clone() });
        };
        let metadata = existing.metadata().touched(entity.type_tag(), now);
        *existing = EntityRecord::new(entity, metadata);
        Ok(())
    }
}

impl<E> FromIterator<EntityRecord<E>> for RecordTable<E> {
    /// Collects records keyed by identity; a later duplicate replaces an
    /// earlier one. Use [`RecordTable::insert_loaded`] to reject duplicates.
    fn from_iter<I: IntoIterator<Item = EntityRecord<E>>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|record| (record.key().clone(), record))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Entity for Note {
        const TYPE_NAME: &'static str = "Note";

        fn key(&self) -> EntityKey {
            EntityKey::from(&self.id)
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.into(),
            body: body.into(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn add_sets_both_stamps() {
        let mut table = RecordTable::new();
        table.add("n1".into(), note("n1", "a"), t0()).unwrap();

        let record = table.get(&"n1".into()).unwrap();
        assert_eq!(record.metadata().created_at(), t0());
        assert_eq!(record.metadata().last_modified_at(), t0());
        assert_eq!(record.metadata().entity_type(), "Note");
        assert_eq!(record.metadata().identity(), &EntityKey::from("n1"));
    }

    #[test]
    fn add_existing_key_fails() {
        let mut table = RecordTable::new();
        table.add("n1".into(), note("n1", "a"), t0()).unwrap();

        let err = table.add("n1".into(), note("n1", "b"), t0()).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { .. }));
        assert_eq!(table.get(&"n1".into()).unwrap().entity().body, "a");
    }

    #[test]
    fn update_keeps_created_at() {
        let mut table = RecordTable::new();
        table.add("n1".into(), note("n1", "a"), t0()).unwrap();

        let later = t0() + Duration::hours(1);
        table.update(&"n1".into(), note("n1", "b"), later).unwrap();

        let record = table.get(&"n1".into()).unwrap();
        assert_eq!(record.entity().body, "b");
        assert_eq!(record.metadata().created_at(), t0());
        assert_eq!(record.metadata().last_modified_at(), later);
    }

    #[test]
    fn update_absent_key_fails() {
        let mut table: RecordTable<Note> = RecordTable::new();
        let err = table.update(&"ghost".into(), note("ghost", "x"), t0()).unwrap_err();
        assert!(matches!(err, CoreError::UpdateTargetAbsent { .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn delete_present_and_absent() {
        let mut table = RecordTable::new();
        table.add("n1".into(), note("n1", "a"), t0()).unwrap();

        assert!(!table.delete(&"ghost".into()));
        assert_eq!(table.len(), 1);

        assert!(table.delete(&"n1".into()));
        assert!(table.get(&"n1".into()).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn clear_removes_every_record() {
        let mut table = RecordTable::new();
        table.add("n1".into(), note("n1", "a"), t0()).unwrap();
        table.add("n2".into(), note("n2", "b"), t0()).unwrap();

        table.clear();

        assert!(table.is_empty());
        assert!(table.get(&"n1".into()).is_none());
        table.add("n1".into(), note("n1", "c"), t0()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn iteration_is_key_ordered() {
        let mut table = RecordTable::new();
        for id in ["c", "a", "b"] {
            table.add(id.into(), note(id, id), t0()).unwrap();
        }
        let keys: Vec<_> = table.keys().map(EntityKey::as_str).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        let bodies: Vec<_> = table.values().map(|n| n.body.as_str()).collect();
        assert_eq!(bodies, ["a", "b", "c"]);
    }

    #[test]
    fn insert_loaded_rejects_duplicates() {
        let mut table = RecordTable::new();
        let meta = Metadata::created("n1".into(), "Note", t0());
        table
            .insert_loaded(EntityRecord::new(note("n1", "a"), meta.clone()))
            .unwrap();

        let err = table
            .insert_loaded(EntityRecord::new(note("n1", "b"), meta))
            .unwrap_err();
        assert!(err.is_corruption());
    }
}
