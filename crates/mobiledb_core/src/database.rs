//! Registry of per-entity-type stores.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use crate::store::{JsonStore, StatefulStore};
use mobiledb_storage::{DiskFileSystem, FileSystem, InMemoryFileSystem};
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

struct StoreEntry {
    typed: Arc<dyn Any + Send + Sync>,
    stateful: Arc<dyn StatefulStore>,
}

/// Owns the collaborators shared by all stores and hands out exactly one
/// [`JsonStore`] per entity type.
///
/// Every store lives under the configured root and is named after its
/// entity type, so `StoreConfig::file_name` is ignored here.
///
/// ```rust,ignore
/// use mobiledb_core::Database;
///
/// let db = Database::open_dir("app_data", StoreConfig::default());
/// let users = db.store::<User>()?;
/// users.save_changes(ChangeSet::new().add(ann))?;
///
/// // Drop every in-memory table, e.g. when the app is backgrounded.
/// db.release_all();
/// ```
pub struct Database {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    stores: Mutex<HashMap<TypeId, StoreEntry>>,
}

impl Database {
    /// Creates a database over the given collaborators.
    pub fn new(fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>, config: StoreConfig) -> Self {
        Self {
            fs,
            clock,
            config: StoreConfig {
                file_name: None,
                ..config
            },
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a database whose files live in a directory on disk.
    pub fn open_dir(dir: impl AsRef<Path>, config: StoreConfig) -> Self {
        let fs = DiskFileSystem::new(dir.as_ref()).sync_on_finish(true);
        Self::new(Arc::new(fs), Arc::new(SystemClock), config)
    }

    /// Creates a database backed by memory. Useful for tests.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryFileSystem::new()),
            Arc::new(SystemClock),
            StoreConfig::default(),
        )
    }

    /// The configuration template applied to every store.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the store for `E`, creating it on first request.
    ///
    /// With `eager_load` configured, the store is loaded before it is
    /// returned. Loading happens outside the registry lock, so a slow load
    /// of one type never holds up requests for another.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidOperation`] if another entity type already uses
    ///   the same file
    /// - load failures when loading eagerly; the store is unregistered and
    ///   the next call retries
    pub fn store<E: Entity>(&self) -> CoreResult<Arc<JsonStore<E>>> {
        let store = self.register::<E>()?;
        if self.config.eager_load {
            if let Err(e) = store.ensure_initialized() {
                self.unregister(&store);
                return Err(e);
            }
        }
        Ok(store)
    }

    fn register<E: Entity>(&self) -> CoreResult<Arc<JsonStore<E>>> {
        let mut stores = self.stores.lock();

        if let Some(entry) = stores.get(&TypeId::of::<E>()) {
            return Arc::clone(&entry.typed)
                .downcast::<JsonStore<E>>()
                .map_err(|_| {
                    CoreError::invalid_operation(format!(
                        "store registered for {} has a different type",
                        E::TYPE_NAME
                    ))
                });
        }

        let path = self.config.store_path(E::TYPE_NAME)?;
        if let Some(other) = stores.values().find(|entry| entry.stateful.path() == &path) {
            return Err(CoreError::invalid_operation(format!(
                "{} would share {path} with {}",
                E::TYPE_NAME,
                other.stateful.entity_type_name()
            )));
        }

        let store = Arc::new(JsonStore::<E>::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.clock),
            self.config.clone(),
        )?);
        stores.insert(
            TypeId::of::<E>(),
            StoreEntry {
                typed: Arc::clone(&store) as Arc<dyn Any + Send + Sync>,
                stateful: Arc::clone(&store) as Arc<dyn StatefulStore>,
            },
        );
        tracing::debug!(entity_type = E::TYPE_NAME, path = %path, "registered store");

        Ok(store)
    }

    /// Drops the entry for `E` if it still refers to `store`.
    fn unregister<E: Entity>(&self, store: &Arc<JsonStore<E>>) {
        let mut stores = self.stores.lock();
        let current = stores.get(&TypeId::of::<E>()).is_some_and(|entry| {
            Arc::clone(&entry.typed)
                .downcast::<JsonStore<E>>()
                .is_ok_and(|registered| Arc::ptr_eq(&registered, store))
        });
        if current {
            stores.remove(&TypeId::of::<E>());
            tracing::debug!(entity_type = E::TYPE_NAME, "unregistered store after failed load");
        }
    }

    /// Every store created so far.
    #[must_use]
    pub fn stores(&self) -> Vec<Arc<dyn StatefulStore>> {
        self.stores
            .lock()
            .values()
            .map(|entry| Arc::clone(&entry.stateful))
            .collect()
    }

    /// Releases the in-memory table of every store.
    ///
    /// Stores stay registered and reload on next use.
    pub fn release_all(&self) {
        for store in self.stores() {
            store.release();
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("root", &self.config.root)
            .field("stores", &self.stores.lock().len())
            .finish_non_exhaustive()
    }
}
