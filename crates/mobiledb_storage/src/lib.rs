//! # MobileDB Storage
//!
//! File-access abstraction for MobileDB.
//!
//! Stores never touch the OS file APIs directly. Everything goes through a
//! [`FileSystem`], which exposes three operations over logical paths:
//! existence check, open for reading, and create (truncate) for writing.
//! File systems are **opaque byte stores** - they do not interpret the
//! line-delimited JSON that the store engine writes.
//!
//! ## Available File Systems
//!
//! - [`InMemoryFileSystem`] - For testing and ephemeral stores
//! - [`DiskFileSystem`] - Maps logical paths under a directory on disk
//!
//! ## Example
//!
//! ```rust
//! use mobiledb_storage::{FileSystem, InMemoryFileSystem, StoragePath};
//!
//! let fs = InMemoryFileSystem::new();
//! let path = StoragePath::root().append_file("User.json").unwrap();
//!
//! assert!(!fs.exists(&path).unwrap());
//! fs.write_all(&path, b"{}\n").unwrap();
//! assert_eq!(fs.read_all(&path).unwrap(), b"{}\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod disk;
mod error;
mod filesystem;
mod memory;
mod path;

pub use disk::DiskFileSystem;
pub use error::{StorageError, StorageResult};
pub use filesystem::{FileSystem, WritableFile};
pub use memory::InMemoryFileSystem;
pub use path::StoragePath;
