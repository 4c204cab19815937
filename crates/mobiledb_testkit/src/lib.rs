//! # MobileDB Testkit
//!
//! Test utilities for MobileDB.
//!
//! This crate provides:
//! - Sample entities (`User`, and `Shape` with `Circle`/`Square` variants)
//! - Store fixtures over in-memory or temporary on-disk storage
//! - Property-based test generators using proptest
//! - Concurrency stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mobiledb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_store() {
//!     with_user_store(|store| {
//!         store.save_changes(ChangeSet::new().add(User::new("u1", "Ann"))).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use mobiledb_core::{ChangeOperation, ChangeSet, Entity, EntityKey, Narrow};
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
