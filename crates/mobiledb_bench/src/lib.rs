//! Shared helpers for MobileDB benchmarks.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use mobiledb_core::{ChangeSet, JsonStore, ManualClock, StoreConfig};
use mobiledb_storage::{FileSystem, InMemoryFileSystem};
use mobiledb_testkit::{fixed_time, User};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

/// Generates a random alphanumeric string of `len` characters.
pub fn random_text(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates `count` users with random uuid ids and `name_len`-character names.
pub fn generate_users(count: usize, name_len: usize) -> Vec<User> {
    (0..count)
        .map(|_| User::new(uuid::Uuid::new_v4().to_string(), random_text(name_len)))
        .collect()
}

/// Builds a change set adding every user.
pub fn add_all(users: &[User]) -> ChangeSet<User> {
    users.iter().cloned().fold(ChangeSet::new(), ChangeSet::add)
}

/// Creates an empty user store over `fs`.
pub fn user_store(fs: Arc<dyn FileSystem>) -> JsonStore<User> {
    JsonStore::new(
        fs,
        Arc::new(ManualClock::new(fixed_time())),
        StoreConfig::default(),
    )
    .expect("Failed to create store")
}

/// Creates an in-memory user store holding `users`.
pub fn populated_store(users: &[User]) -> (Arc<InMemoryFileSystem>, JsonStore<User>) {
    let fs = Arc::new(InMemoryFileSystem::new());
    let store = user_store(fs.clone());
    store
        .save_changes(add_all(users))
        .expect("Failed to populate store");
    (fs, store)
}
