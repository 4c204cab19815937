//! Store behavior checked end to end through the public API.

use chrono::Duration;
use mobiledb_core::{
    ChangeKind, ChangeSet, Clock, CoreError, Database, Entity, EntityKey, EntityRecord, StoreConfig,
};
use mobiledb_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reference model: key -> (payload, created_at, last_modified_at).
type Model = BTreeMap<EntityKey, (User, chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)>;

fn apply_to_model(
    model: &Model,
    changes: &ChangeSet<User>,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<Model> {
    let mut next = model.clone();
    for op in changes {
        let key = op.key().clone();
        match op.kind() {
            ChangeKind::Added => {
                if next.contains_key(&key) {
                    return None;
                }
                next.insert(key, (op.entity().clone(), now, now));
            }
            ChangeKind::Updated => {
                let (entity, _, modified) = next.get_mut(&key)?;
                *entity = op.entity().clone();
                *modified = now;
            }
            ChangeKind::Deleted => {
                next.remove(&key);
            }
        }
    }
    Some(next)
}

fn assert_matches_model(store: &mobiledb_core::JsonStore<User>, model: &Model) {
    assert_eq!(store.count().unwrap(), model.len());
    for (key, (entity, created, modified)) in model {
        let record: EntityRecord<User> = store.get(key).unwrap().expect("record missing");
        assert_eq!(record.entity(), entity);
        assert_eq!(record.metadata().created_at(), *created);
        assert_eq!(record.metadata().last_modified_at(), *modified);
        assert_eq!(record.metadata().identity(), key);
    }
}

proptest! {
    #![proptest_config(PropTestConfig::default().to_proptest_config())]

    #[test]
    fn store_matches_reference_model(
        sets in prop::collection::vec(change_set_strategy(6, 6), 1..8)
    ) {
        let fixture: TestStore<User> = TestStore::memory();
        let mut model = Model::new();

        for changes in sets {
            fixture.clock.advance(Duration::seconds(1));
            let now = fixture.clock.now();
            let expected = apply_to_model(&model, &changes, now);
            let submitted = changes.len();

            match (fixture.save_changes(changes), expected) {
                (Ok(applied), Some(next)) => {
                    prop_assert_eq!(applied, submitted);
                    model = next;
                }
                (Err(CoreError::DuplicateKey { .. } | CoreError::UpdateTargetAbsent { .. }), None) => {}
                (result, expected) => {
                    prop_assert!(false, "store returned {:?}, model expected {:?}", result, expected.is_some());
                }
            }
            assert_matches_model(&fixture.store, &model);
        }

        fixture.release();
        assert_matches_model(&fixture.store, &model);
    }
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn disk_round_trip_preserves_everything(users in distinct_users_strategy(24)) {
        let fixture: TestStore<User> = TestStore::disk();
        let changes = users.iter().cloned().fold(ChangeSet::new(), ChangeSet::add);
        fixture.save_changes(changes).unwrap();

        let reopened = fixture.reopen();
        prop_assert_eq!(reopened.count().unwrap(), users.len());
        for user in &users {
            let original = fixture.get(&user.key()).unwrap();
            let loaded = reopened.get(&user.key()).unwrap();
            prop_assert_eq!(original, loaded);
        }
    }

    #[test]
    fn narrowing_returns_exactly_the_matching_shapes(
        shapes in prop::collection::vec(shape_strategy(40), 0..30)
    ) {
        let fixture: TestStore<Shape> = TestStore::memory();
        let mut unique = BTreeMap::new();
        for shape in shapes {
            unique.insert(shape.key(), shape);
        }
        let changes = unique.values().cloned().fold(ChangeSet::new(), ChangeSet::add);
        fixture.save_changes(changes).unwrap();

        let circles = fixture.as_queryable::<Circle>().unwrap();
        let squares = fixture.as_queryable::<Square>().unwrap();
        let expected_circles: Vec<Circle> = unique.values().filter_map(Circle::narrow).collect();

        prop_assert_eq!(circles.into_vec(), expected_circles);
        prop_assert_eq!(squares.len() + fixture.records_tagged("Circle").unwrap().len(), unique.len());
    }
}

#[test]
fn add_find_persist_release_reload() {
    let fixture: TestStore<User> = TestStore::disk();
    let ann = User::new("u1", "Ann");

    fixture.save_changes(ChangeSet::new().add(ann.clone())).unwrap();
    assert_eq!(fixture.count().unwrap(), 1);
    assert_eq!(fixture.find_by_id(&"u1".into()).unwrap(), Some(ann.clone()));

    fixture.release();
    fixture.ensure_initialized().unwrap();
    assert_eq!(fixture.find_by_id(&"u1".into()).unwrap(), Some(ann));
}

#[test]
fn add_then_update_keeps_creation_stamp() {
    let fixture: TestStore<User> = TestStore::memory();
    let added_at = fixture.clock.now();

    fixture.save_changes(ChangeSet::new().add(User::new("k1", "v1"))).unwrap();
    fixture.clock.advance(Duration::hours(2));
    fixture.save_changes(ChangeSet::new().update(User::new("k1", "v2"))).unwrap();

    let record = fixture.get(&"k1".into()).unwrap().unwrap();
    assert_eq!(record.entity().name, "v2");
    assert_eq!(record.metadata().created_at(), added_at);
    assert_eq!(record.metadata().last_modified_at(), added_at + Duration::hours(2));
}

#[test]
fn concurrent_readers_writers_and_releases() {
    let fixture: TestStore<User> = TestStore::memory();
    let config = StressConfig {
        release_concurrently: true,
        ..StressConfig::default()
    };

    let report = stress_readers_and_writers(Arc::clone(&fixture.store), &config);

    assert!(report.is_clean(), "{report:?}");
    assert_eq!(fixture.count().unwrap(), config.expected_records());
    assert_eq!(fixture.reopen().count().unwrap(), config.expected_records());
}

#[test]
fn concurrent_disk_writers() {
    let fixture: TestStore<User> = TestStore::disk();
    let config = StressConfig {
        readers: 2,
        writers: 3,
        writes_per_writer: 15,
        batch_size: 4,
        release_concurrently: false,
    };

    let report = stress_readers_and_writers(Arc::clone(&fixture.store), &config);

    assert!(report.is_clean(), "{report:?}");
    assert_eq!(fixture.reopen().count().unwrap(), config.expected_records());
}

#[test]
fn database_keeps_types_in_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open_dir(dir.path(), StoreConfig::default());
        db.store::<User>()
            .unwrap()
            .save_changes(ChangeSet::new().add(User::new("u1", "Ann")))
            .unwrap();
        db.store::<Shape>()
            .unwrap()
            .save_changes(ChangeSet::new().add(Shape::square("s1", 2.0)))
            .unwrap();
    }

    assert!(dir.path().join("User.json").is_file());
    assert!(dir.path().join("Shape.json").is_file());

    let db = Database::open_dir(dir.path(), StoreConfig::new().eager_load(true));
    let shapes = db.store::<Shape>().unwrap();
    assert!(shapes.is_initialized());
    assert_eq!(
        shapes.as_queryable::<Square>().unwrap().into_vec(),
        vec![Square {
            id: "s1".into(),
            side: 2.0
        }]
    );
    assert_eq!(db.store::<User>().unwrap().count().unwrap(), 1);
}
