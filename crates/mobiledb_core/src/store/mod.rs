//! Per-entity-type stores.

mod json;
mod persist;
mod query;
mod state;


pub use json::JsonStore;
pub use query::QueryView;
pub use state::LoadState;

use crate::error::CoreResult;
use mobiledb_storage::StoragePath;

/// Type-erased view of a store's lifecycle.
///
/// Lets a [`crate::Database`] manage stores of different entity types
/// together.
pub trait StatefulStore: Send + Sync {
    /// The entity type name the store was created for.
    fn entity_type_name(&self) -> &'static str;

    /// The logical path of the backing file.
    fn path(&self) -> &StoragePath;

    /// Returns `true` once the table has been loaded.
    fn is_initialized(&self) -> bool;

    /// Loads the table unless already loaded.
    ///
    /// # Errors
    ///
    /// Propagates load failures.
    fn ensure_initialized(&self) -> CoreResult<()>;

    /// Number of live records.
    ///
    /// # Errors
    ///
    /// Propagates load failures.
    fn count(&self) -> CoreResult<usize>;

    /// Discards the in-memory table.
    fn release(&self);
}
