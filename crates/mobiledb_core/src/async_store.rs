//! Async facade over [`JsonStore`].

use crate::change::ChangeSet;
use crate::entity::{Entity, EntityKey, EntityRecord, Narrow};
use crate::error::{CoreError, CoreResult};
use crate::store::{JsonStore, QueryView};
use std::sync::Arc;

/// Runs every [`JsonStore`] operation on tokio's blocking pool.
///
/// Lock waits and file I/O never occupy an async worker thread, so a caller
/// on a latency-sensitive executor is not stalled while a save holds the
/// writer lock.
pub struct AsyncJsonStore<E: Entity> {
    inner: Arc<JsonStore<E>>,
}

impl<E: Entity> Clone for AsyncJsonStore<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> AsyncJsonStore<E> {
    /// Wraps a shared store.
    pub fn new(inner: Arc<JsonStore<E>>) -> Self {
        Self { inner }
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &Arc<JsonStore<E>> {
        &self.inner
    }

    async fn run<R, F>(&self, op: F) -> CoreResult<R>
    where
        F: FnOnce(&JsonStore<E>) -> CoreResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| CoreError::task_failed(e.to_string()))?
    }

    /// See [`JsonStore::ensure_initialized`].
    ///
    /// # Errors
    ///
    /// Propagates load failures, or [`CoreError::TaskFailed`] if the blocking
    /// task did not complete.
    pub async fn ensure_initialized(&self) -> CoreResult<()> {
        self.run(JsonStore::ensure_initialized).await
    }

    /// See [`JsonStore::release`].
    ///
    /// # Errors
    ///
    /// [`CoreError::TaskFailed`] if the blocking task did not complete.
    pub async fn release(&self) -> CoreResult<()> {
        self.run(|store| {
            store.release();
            Ok(())
        })
        .await
    }

    /// See [`JsonStore::save_changes`].
    ///
    /// # Errors
    ///
    /// As [`JsonStore::save_changes`], plus [`CoreError::TaskFailed`].
    pub async fn save_changes(&self, change_set: ChangeSet<E>) -> CoreResult<usize> {
        self.run(move |store| store.save_changes(change_set)).await
    }

    /// See [`JsonStore::count`].
    ///
    /// # Errors
    ///
    /// As [`JsonStore::count`], plus [`CoreError::TaskFailed`].
    pub async fn count(&self) -> CoreResult<usize> {
        self.run(JsonStore::count).await
    }

    /// See [`JsonStore::find_by_id`].
    ///
    /// # Errors
    ///
    /// As [`JsonStore::find_by_id`], plus [`CoreError::TaskFailed`].
    pub async fn find_by_id(&self, key: EntityKey) -> CoreResult<Option<E>> {
        self.run(move |store| store.find_by_id(&key)).await
    }

    /// See [`JsonStore::get`].
    ///
    /// # Errors
    ///
    /// As [`JsonStore::get`], plus [`CoreError::TaskFailed`].
    pub async fn get(&self, key: EntityKey) -> CoreResult<Option<EntityRecord<E>>> {
        self.run(move |store| store.get(&key)).await
    }

    /// See [`JsonStore::values`].
    ///
    /// # Errors
    ///
    /// As [`JsonStore::values`], plus [`CoreError::TaskFailed`].
    pub async fn values(&self) -> CoreResult<Vec<E>> {
        self.run(JsonStore::values).await
    }

    /// See [`JsonStore::as_queryable`].
    ///
    /// # Errors
    ///
    /// As [`JsonStore::as_queryable`], plus [`CoreError::TaskFailed`].
    pub async fn as_queryable<T>(&self) -> CoreResult<QueryView<T>>
    where
        T: Narrow<E> + Send + 'static,
    {
        self.run(JsonStore::as_queryable::<T>).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::StoreConfig;
    use mobiledb_storage::InMemoryFileSystem;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        value: i64,
    }

    impl Entity for Reading {
        const TYPE_NAME: &'static str = "Reading";

        fn key(&self) -> EntityKey {
            EntityKey::from(&self.sensor)
        }
    }

    fn reading(sensor: &str, value: i64) -> Reading {
        Reading {
            sensor: sensor.into(),
            value,
        }
    }

    fn store() -> AsyncJsonStore<Reading> {
        let inner = JsonStore::new(
            Arc::new(InMemoryFileSystem::new()),
            Arc::new(SystemClock),
            StoreConfig::default(),
        )
        .unwrap();
        AsyncJsonStore::new(Arc::new(inner))
    }

    #[tokio::test]
    async fn save_and_read_back() {
        let store = store();
        store
            .save_changes(ChangeSet::new().add(reading("t1", 20)).add(reading("t2", 21)))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(
            store.find_by_id(EntityKey::from("t2")).await.unwrap(),
            Some(reading("t2", 21))
        );
        assert_eq!(store.as_queryable::<Reading>().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let store = store();
        let err = store
            .save_changes(ChangeSet::new().update(reading("nope", 0)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UpdateTargetAbsent { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_tasks_share_one_store() {
        let store = store();
        store.ensure_initialized().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .save_changes(ChangeSet::new().add(reading(&format!("s{i}"), i)))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.values().await.unwrap().len(), 8);
        store.release().await.unwrap();
        assert!(!store.inner().is_initialized());
        assert_eq!(store.count().await.unwrap(), 8);
    }
}
