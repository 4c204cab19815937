//! Sample entities and store fixtures.
//!
//! Provides ready-made entity types and stores wired to an in-memory or
//! temporary on-disk file system with a controllable clock.

use chrono::{DateTime, TimeZone, Utc};
use mobiledb_core::{Entity, EntityKey, JsonStore, ManualClock, Narrow, StoreConfig};
use mobiledb_storage::{DiskFileSystem, FileSystem, InMemoryFileSystem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tempfile::TempDir;

/// A plain entity keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    /// Creates a user without an email address.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn key(&self) -> EntityKey {
        EntityKey::from(&self.id)
    }
}

/// An entity with several shapes stored in one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// A circle.
    Circle(Circle),
    /// A square.
    Square(Square),
}

impl Shape {
    /// Creates a circle shape.
    pub fn circle(id: impl Into<String>, radius: f64) -> Self {
        Self::Circle(Circle {
            id: id.into(),
            radius,
        })
    }

    /// Creates a square shape.
    pub fn square(id: impl Into<String>, side: f64) -> Self {
        Self::Square(Square {
            id: id.into(),
            side,
        })
    }
}

impl Entity for Shape {
    const TYPE_NAME: &'static str = "Shape";

    fn key(&self) -> EntityKey {
        match self {
            Shape::Circle(c) => EntityKey::from(&c.id),
            Shape::Square(s) => EntityKey::from(&s.id),
        }
    }

    fn type_tag(&self) -> &str {
        match self {
            Shape::Circle(_) => "Circle",
            Shape::Square(_) => "Square",
        }
    }
}

/// The circle variant of [`Shape`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Identity.
    pub id: String,
    /// Radius.
    pub radius: f64,
}

impl Narrow<Shape> for Circle {
    fn narrow(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::Circle(c) => Some(c.clone()),
            Shape::Square(_) => None,
        }
    }
}

/// The square variant of [`Shape`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Square {
    /// Identity.
    pub id: String,
    /// Side length.
    pub side: f64,
}

impl Narrow<Shape> for Square {
    fn narrow(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::Square(s) => Some(s.clone()),
            Shape::Circle(_) => None,
        }
    }
}

/// The instant every fixture clock starts at.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0)
        .single()
        .expect("valid fixture time")
}

/// A store with its collaborators and automatic cleanup.
pub struct TestStore<E: Entity> {
    /// The store instance.
    pub store: Arc<JsonStore<E>>,
    /// The clock the store stamps records with.
    pub clock: Arc<ManualClock>,
    fs: Arc<dyn FileSystem>,
    memory: Option<Arc<InMemoryFileSystem>>,
    config: StoreConfig,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl<E: Entity> TestStore<E> {
    /// Creates a store over an in-memory file system.
    pub fn memory() -> Self {
        Self::memory_with(StoreConfig::default())
    }

    /// Creates a store over an in-memory file system with a custom config.
    pub fn memory_with(config: StoreConfig) -> Self {
        let memory = Arc::new(InMemoryFileSystem::new());
        let fs: Arc<dyn FileSystem> = memory.clone();
        Self::build(fs, Some(memory), config, None)
    }

    /// Creates a store over a temporary directory.
    pub fn disk() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fs: Arc<dyn FileSystem> = Arc::new(DiskFileSystem::new(temp_dir.path()));
        Self::build(fs, None, StoreConfig::default(), Some(temp_dir))
    }

    fn build(
        fs: Arc<dyn FileSystem>,
        memory: Option<Arc<InMemoryFileSystem>>,
        config: StoreConfig,
        temp_dir: Option<TempDir>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(fixed_time()));
        let store = JsonStore::new(Arc::clone(&fs), clock.clone(), config.clone())
            .expect("Failed to create store");
        Self {
            store: Arc::new(store),
            clock,
            fs,
            memory,
            config,
            _temp_dir: temp_dir,
        }
    }

    /// Opens a second, independent store over the same file.
    pub fn reopen(&self) -> JsonStore<E> {
        JsonStore::new(Arc::clone(&self.fs), self.clock.clone(), self.config.clone())
            .expect("Failed to reopen store")
    }

    /// The in-memory file system, if this fixture uses one.
    pub fn memory_fs(&self) -> Option<&Arc<InMemoryFileSystem>> {
        self.memory.as_ref()
    }

    /// Returns the store file's lines as JSON values.
    pub fn file_lines(&self) -> Vec<serde_json::Value> {
        let path = self.store.path();
        if !self.fs.exists(path).expect("Failed to check store file") {
            return Vec::new();
        }
        let bytes = self.fs.read_all(path).expect("Failed to read store file");
        String::from_utf8(bytes)
            .expect("Store file is not UTF-8")
            .lines()
            .map(|line| serde_json::from_str(line).expect("Store line is not JSON"))
            .collect()
    }
}

impl<E: Entity> std::ops::Deref for TestStore<E> {
    type Target = JsonStore<E>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test against a fresh in-memory store.
///
/// # Example
///
/// ```rust,ignore
/// use mobiledb_testkit::prelude::*;
///
/// with_user_store(|store| {
///     store.save_changes(ChangeSet::new().add(User::new("u1", "Ann"))).unwrap();
///     assert_eq!(store.count().unwrap(), 1);
/// });
/// ```
pub fn with_user_store<F, R>(f: F) -> R
where
    F: FnOnce(&TestStore<User>) -> R,
{
    let store = TestStore::memory();
    f(&store)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use mobiledb_core::ChangeSet;

    /// Creates a user store holding `count` users with ids `user-0000`...
    pub fn populated_user_store(count: usize) -> TestStore<User> {
        let store = TestStore::memory();
        let changes = (0..count).fold(ChangeSet::new(), |set, i| {
            set.add(User::new(format!("user-{i:04}"), format!("User {i}")))
        });
        store
            .save_changes(changes)
            .expect("Failed to populate store");
        store
    }

    /// Creates a shape store holding `circles` circles and `squares` squares.
    pub fn mixed_shape_store(circles: usize, squares: usize) -> TestStore<Shape> {
        let store = TestStore::memory();
        let mut changes = ChangeSet::new();
        for i in 0..circles {
            changes = changes.add(Shape::circle(format!("c{i}"), i as f64 + 0.5));
        }
        for i in 0..squares {
            changes = changes.add(Shape::square(format!("s{i}"), i as f64 + 1.0));
        }
        store
            .save_changes(changes)
            .expect("Failed to populate store");
        store
    }
}
