//! The per-entity-type JSON store.

use crate::change::{apply_change_set, ChangeSet};
use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::entity::{Entity, EntityKey, EntityRecord, Narrow};
use crate::error::CoreResult;
use crate::store::persist::{decode_table, encode_table};
use crate::store::query::QueryView;
use crate::store::state::{LoadState, TableState};
use crate::store::StatefulStore;
use crate::table::RecordTable;
use mobiledb_storage::{FileSystem, StoragePath};
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Document store for one entity type, backed by one line-delimited JSON
/// file.
///
/// The table is loaded lazily on first use and kept in memory until
/// [`release`](Self::release).
///
/// ## Concurrency
///
/// Two locks cooperate:
///
/// - `state` (`RwLock`) guards the live table and its [`LoadState`].
///   Readers share it; it is only ever held for in-memory work, never
///   across storage I/O.
/// - `writer` (`Mutex`) admits one loader, saver or releaser at a time and
///   is held across storage I/O.
///
/// A save applies its change set to a staged copy of the table, writes the
/// staged copy to storage, and only then swaps it in under a brief
/// exclusive `state` lock. Readers therefore see either the table before a
/// change set or after it, never part of one, and a failed save leaves the
/// table untouched.
///
/// ## Example
///
/// ```rust,ignore
/// let store: JsonStore<User> = JsonStore::new(fs, clock, StoreConfig::default())?;
///
/// store.save_changes(ChangeSet::new().add(ann))?;
/// assert_eq!(store.count()?, 1);
/// let found = store.find_by_id(&EntityKey::from("u1"))?;
/// ```
pub struct JsonStore<E: Entity> {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    path: StoragePath,
    state: RwLock<TableState<E>>,
    writer: Mutex<()>,
    loads: AtomicUsize,
}

impl<E: Entity> JsonStore<E> {
    /// Creates a store for `E`. Nothing is read until first use.
    ///
    /// # Errors
    ///
    /// Fails if the configured root and file name do not form a valid path.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> CoreResult<Self> {
        let path = config.store_path(E::TYPE_NAME)?;
        Ok(Self {
            fs,
            clock,
            config,
            path,
            state: RwLock::new(TableState::uninitialized()),
            writer: Mutex::new(()),
            loads: AtomicUsize::new(0),
        })
    }

    /// Creates a store and, if `config.eager_load` is set, loads it.
    ///
    /// # Errors
    ///
    /// Fails like [`JsonStore::new`], or like
    /// [`JsonStore::ensure_initialized`] when loading eagerly.
    pub fn open(
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> CoreResult<Self> {
        let eager = config.eager_load;
        let store = Self::new(fs, clock, config)?;
        if eager {
            store.ensure_initialized()?;
        }
        Ok(store)
    }

    /// The logical path of the backing file.
    #[must_use]
    pub fn path(&self) -> &StoragePath {
        &self.path
    }

    /// The store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        self.state.read().load_state
    }

    /// Returns `true` once the table has been loaded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().is_ready()
    }

    /// How many times the backing file has been read.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Loads the table from storage unless it is already loaded.
    ///
    /// A missing file yields an empty table. Calling this again without an
    /// intervening [`release`](Self::release) does not touch storage.
    ///
    /// # Errors
    ///
    /// Propagates file-access errors and reports malformed content as
    /// corruption. On error the store stays uninitialized.
    pub fn ensure_initialized(&self) -> CoreResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        let writer = self.writer.lock();
        self.initialize_locked(&writer)
    }

    /// Discards the in-memory table and returns to the uninitialized state.
    ///
    /// Waits for any in-flight load or save to finish. The next operation
    /// reloads from storage.
    pub fn release(&self) {
        let _writer = self.writer.lock();
        self.state.write().reset();
        tracing::debug!(entity_type = E::TYPE_NAME, "released store");
    }

    /// Applies `change_set` and persists the resulting table.
    ///
    /// Changes are applied in order to a staged copy of the table; the copy
    /// is written to storage and then becomes the live table. If any change
    /// is rejected, or the write fails, the live table is unchanged.
    ///
    /// Returns the number of changes applied, counting deletes of absent
    /// keys.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::DuplicateKey`] if an `Added` key is live
    /// - [`crate::CoreError::UpdateTargetAbsent`] if an `Updated` key is absent
    /// - storage and codec errors from loading or writing
    pub fn save_changes(&self, change_set: ChangeSet<E>) -> CoreResult<usize> {
        let writer = self.writer.lock();
        self.initialize_locked(&writer)?;

        let submitted = change_set.len();
        let mut staged = self.state.read().table.clone();
        let applied = apply_change_set(&mut staged, change_set, self.clock.now()).map_err(|e| {
            tracing::warn!(
                entity_type = E::TYPE_NAME,
                submitted,
                error = %e,
                "rejected change set"
            );
            e
        })?;

        let bytes = encode_table(&staged)?;
        self.fs.write_all(&self.path, &bytes)?;

        let records = staged.len();
        self.state.write().install(staged);

        tracing::debug!(
            entity_type = E::TYPE_NAME,
            applied,
            records,
            bytes = bytes.len(),
            "saved change set"
        );
        Ok(applied)
    }

    /// Number of live records.
    ///
    /// # Errors
    ///
    /// Fails if the table has to be loaded and loading fails.
    pub fn count(&self) -> CoreResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns the payload stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails if the table has to be loaded and loading fails.
    pub fn find_by_id(&self, key: &EntityKey) -> CoreResult<Option<E>> {
        Ok(self.read()?.get(key).map(|record| record.entity().clone()))
    }

    /// Returns the record (payload and metadata) stored under `key`.
    ///
    /// # Errors
    ///
    /// Fails if the table has to be loaded and loading fails.
    pub fn get(&self, key: &EntityKey) -> CoreResult<Option<EntityRecord<E>>> {
        Ok(self.read()?.get(key).cloned())
    }

    /// Returns a copy of every payload, in key order.
    ///
    /// # Errors
    ///
    /// Fails if the table has to be loaded and loading fails.
    pub fn values(&self) -> CoreResult<Vec<E>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Returns a detached view of the entities that narrow to `T`.
    ///
    /// Entities that do not narrow are skipped. The view is built under the
    /// read lock and may be used after it is released.
    ///
    /// # Errors
    ///
    /// Fails if the table has to be loaded and loading fails.
    pub fn as_queryable<T: Narrow<E>>(&self) -> CoreResult<QueryView<T>> {
        Ok(self.read()?.values().filter_map(T::narrow).collect())
    }

    /// Returns copies of the records whose metadata type tag is `tag`.
    ///
    /// # Errors
    ///
    /// Fails if the table has to be loaded and loading fails.
    pub fn records_tagged(&self, tag: &str) -> CoreResult<Vec<EntityRecord<E>>> {
        Ok(self
            .read()?
            .records()
            .filter(|record| record.metadata().entity_type() == tag)
            .cloned()
            .collect())
    }

    /// Acquires shared access to a loaded table.
    fn read(&self) -> CoreResult<TableReadGuard<'_, E>> {
        loop {
            self.ensure_initialized()?;
            let state = self.state.read();
            if state.is_ready() {
                return Ok(TableReadGuard { state });
            }
            // Released between initialization and acquiring the guard.
        }
    }

    /// Loads the table if needed. The caller holds the writer lock.
    fn initialize_locked(&self, _writer: &MutexGuard<'_, ()>) -> CoreResult<()> {
        if self.state.read().is_ready() {
            return Ok(());
        }

        self.state.write().load_state = LoadState::Loading;
        match self.load_from_storage() {
            Ok(table) => {
                let records = table.len();
                self.state.write().install(table);
                tracing::debug!(
                    entity_type = E::TYPE_NAME,
                    path = %self.path,
                    records,
                    "loaded store"
                );
                Ok(())
            }
            Err(e) => {
                self.state.write().reset();
                Err(e)
            }
        }
    }

    fn load_from_storage(&self) -> CoreResult<RecordTable<E>> {
        if !self.fs.exists(&self.path)? {
            return Ok(RecordTable::new());
        }
        let bytes = self.fs.read_all(&self.path)?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        decode_table(&bytes, self.config.verify_identity_on_load)
    }
}

#[cfg(test)]
impl<E: Entity> JsonStore<E> {
    /// Takes the shared table lock the way an in-flight read does.
    pub(super) fn hold_shared(&self) -> RwLockReadGuard<'_, TableState<E>> {
        self.state.read()
    }
}

/// Read guard that derefs to the loaded table.
struct TableReadGuard<'a, E> {
    state: RwLockReadGuard<'a, TableState<E>>,
}

impl<E> std::ops::Deref for TableReadGuard<'_, E> {
    type Target = RecordTable<E>;

    fn deref(&self) -> &Self::Target {
        &self.state.table
    }
}

impl<E: Entity> StatefulStore for JsonStore<E> {
    fn entity_type_name(&self) -> &'static str {
        E::TYPE_NAME
    }

    fn path(&self) -> &StoragePath {
        &self.path
    }

    fn is_initialized(&self) -> bool {
        JsonStore::is_initialized(self)
    }

    fn ensure_initialized(&self) -> CoreResult<()> {
        JsonStore::ensure_initialized(self)
    }

    fn count(&self) -> CoreResult<usize> {
        JsonStore::count(self)
    }

    fn release(&self) {
        JsonStore::release(self);
    }
}

impl<E: Entity> fmt::Debug for JsonStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStore")
            .field("entity_type", &E::TYPE_NAME)
            .field("path", &self.path)
            .field("load_state", &self.load_state())
            .finish_non_exhaustive()
    }
}
