//! Change operations and ordered change sets.

use crate::entity::{Entity, EntityKey};
use std::fmt;

/// What a change does to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Insert a new record.
    Added,
    /// Replace the payload of an existing record.
    Updated,
    /// Remove the record, if any.
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// A single change: key, payload and kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeOperation<E> {
    key: EntityKey,
    entity: E,
    kind: ChangeKind,
}

impl<E> ChangeOperation<E> {
    /// Creates a change with an explicit key.
    pub fn new(key: EntityKey, entity: E, kind: ChangeKind) -> Self {
        Self { key, entity, kind }
    }

    /// The target key.
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    /// The payload.
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// The change kind.
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Consumes the change.
    pub fn into_parts(self) -> (EntityKey, E, ChangeKind) {
        (self.key, self.entity, self.kind)
    }
}

impl<E: Entity> ChangeOperation<E> {
    /// An `Added` change keyed by [`Entity::key`].
    pub fn added(entity: E) -> Self {
        Self::new(entity.key(), entity, ChangeKind::Added)
    }

    /// An `Updated` change keyed by [`Entity::key`].
    pub fn updated(entity: E) -> Self {
        Self::new(entity.key(), entity, ChangeKind::Updated)
    }

    /// A `Deleted` change keyed by [`Entity::key`].
    pub fn deleted(entity: E) -> Self {
        Self::new(entity.key(), entity, ChangeKind::Deleted)
    }
}

/// An ordered batch of changes submitted for one application.
///
/// Changes are applied strictly in the order they were added; nothing is
/// reordered or coalesced.
///
/// ```rust,ignore
/// let changes = ChangeSet::new()
///     .add(user.clone())
///     .update(renamed)
///     .delete(stale);
/// let applied = store.save_changes(changes)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet<E> {
    operations: Vec<ChangeOperation<E>>,
}

impl<E> Default for ChangeSet<E> {
    fn default() -> Self {
        Self {
            operations: Vec::new(),
        }
    }
}

impl<E> ChangeSet<E> {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change.
    pub fn push(&mut self, operation: ChangeOperation<E>) {
        self.operations.push(operation);
    }

    /// Number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if there are no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterates changes in submission order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeOperation<E>> {
        self.operations.iter()
    }
}

impl<E: Entity> ChangeSet<E> {
    /// Appends an `Added` change.
    #[must_use]
    pub fn add(mut self, entity: E) -> Self {
        self.push(ChangeOperation::added(entity));
        self
    }

    /// Appends an `Updated` change.
    #[must_use]
    pub fn update(mut self, entity: E) -> Self {
        self.push(ChangeOperation::updated(entity));
        self
    }

    /// Appends a `Deleted` change.
    #[must_use]
    pub fn delete(mut self, entity: E) -> Self {
        self.push(ChangeOperation::deleted(entity));
        self
    }
}

impl<E> FromIterator<ChangeOperation<E>> for ChangeSet<E> {
    fn from_iter<I: IntoIterator<Item = ChangeOperation<E>>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl<E> Extend<ChangeOperation<E>> for ChangeSet<E> {
    fn extend<I: IntoIterator<Item = ChangeOperation<E>>>(&mut self, iter: I) {
        self.operations.extend(iter);
    }
}

impl<E> IntoIterator for ChangeSet<E> {
    type Item = ChangeOperation<E>;
    type IntoIter = std::vec::IntoIter<ChangeOperation<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ChangeSet<E> {
    type Item = &'a ChangeOperation<E>;
    type IntoIter = std::slice::Iter<'a, ChangeOperation<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
