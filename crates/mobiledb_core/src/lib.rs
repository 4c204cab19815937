//! # MobileDB Core
//!
//! Embedded document store for mobile and desktop apps.
//!
//! Each entity type gets its own [`JsonStore`], backed by one
//! line-delimited JSON file. This crate provides:
//! - The entity model ([`Entity`], [`EntityKey`], [`Metadata`])
//! - Change sets and the change applier
//! - Lazy loading with explicit release
//! - Reader/writer concurrency with all-or-nothing saves
//! - Detached, narrowed query views
//! - A [`Database`] registry that owns one store per entity type
//!
//! ```rust,ignore
//! use mobiledb_core::{ChangeSet, Database, Entity, EntityKey};
//!
//! let db = Database::open_dir("app_data", Default::default());
//! let users = db.store::<User>()?;
//! users.save_changes(ChangeSet::new().add(User::new("u1", "Ann")))?;
//! assert_eq!(users.count()?, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod change;
mod clock;
mod config;
mod database;
mod entity;
mod error;
mod store;
mod table;

#[cfg(feature = "tokio")]
mod async_store;

pub use change::{apply_change_set, ChangeKind, ChangeOperation, ChangeSet};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StoreConfig, STORE_FILE_EXTENSION};
pub use database::Database;
pub use entity::{Entity, EntityKey, EntityRecord, Envelope, Metadata, Narrow};
pub use error::{CoreError, CoreResult};
pub use store::{JsonStore, LoadState, QueryView, StatefulStore};
pub use table::RecordTable;

#[cfg(feature = "tokio")]
pub use async_store::AsyncJsonStore;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
