//! Table lifecycle state.

use crate::table::RecordTable;
use std::fmt;

/// Lifecycle of a store's in-memory table.
///
/// `Uninitialized -> Loading -> Ready`, and back to `Uninitialized` on
/// release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing loaded; the table is empty and must not be read.
    Uninitialized,
    /// A load from storage is in progress.
    Loading,
    /// The table reflects storage and may be read.
    Ready,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// The live table together with its lifecycle state.
#[derive(Debug)]
pub(crate) struct TableState<E> {
    pub(crate) load_state: LoadState,
    pub(crate) table: RecordTable<E>,
}

impl<E> TableState<E> {
    pub(crate) fn uninitialized() -> Self {
        Self {
            load_state: LoadState::Uninitialized,
            table: RecordTable::new(),
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    /// Installs a loaded (or freshly committed) table and marks it ready.
    pub(crate) fn install(&mut self, table: RecordTable<E>) {
        self.table = table;
        self.load_state = LoadState::Ready;
    }

    /// Drops all records and returns to `Uninitialized`.
    pub(crate) fn reset(&mut self) {
        self.table.clear();
        self.load_state = LoadState::Uninitialized;
    }
}
