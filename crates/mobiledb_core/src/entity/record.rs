//! Records, metadata and the persisted envelope.

use crate::entity::EntityKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping carried alongside every stored entity.
///
/// - `created_at` is set once when the record is added and never changes
/// - `last_modified_at` is refreshed by every successful update
/// - the metadata is removed together with its record on delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    identity: EntityKey,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
    entity_type: String,
}

impl Metadata {
    /// Metadata for a record added at `now`.
    #[must_use]
    pub fn created(identity: EntityKey, entity_type: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            created_at: now,
            last_modified_at: now,
            entity_type: entity_type.into(),
        }
    }

    /// Metadata for the same record updated at `now`.
    ///
    /// Keeps the identity and creation stamp.
    #[must_use]
    pub fn touched(&self, entity_type: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identity: self.identity.clone(),
            created_at: self.created_at,
            last_modified_at: now,
            entity_type: entity_type.into(),
        }
    }

    /// The record's identity.
    #[must_use]
    pub fn identity(&self) -> &EntityKey {
        &self.identity
    }

    /// When the record was added.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the record was last added or updated.
    #[must_use]
    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    /// The entity type tag.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }
}

/// An entity payload paired with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord<E> {
    entity: E,
    metadata: Metadata,
}

impl<E> EntityRecord<E> {
    /// Pairs an entity with its metadata.
    pub fn new(entity: E, metadata: Metadata) -> Self {
        Self { entity, metadata }
    }

    /// The entity payload.
    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// The record metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The record's identity.
    pub fn key(&self) -> &EntityKey {
        &self.metadata.identity
    }

    /// Consumes the record, returning the payload.
    pub fn into_entity(self) -> E {
        self.entity
    }

    /// Consumes the record, returning payload and metadata.
    pub fn into_parts(self) -> (E, Metadata) {
        (self.entity, self.metadata)
    }
}

/// One persisted line: metadata fields with the payload embedded.
///
/// `E` is the entity type for typed loads, or `serde_json::Value` for
/// tools that inspect store files without knowing the entity type.
///
/// ```text
/// {"identity":"u1","created_at":"...","last_modified_at":"...","entity_type":"User","entity":{...}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<E> {
    /// Record identity.
    pub identity: EntityKey,
    /// Creation stamp.
    pub created_at: DateTime<Utc>,
    /// Last modification stamp.
    pub last_modified_at: DateTime<Utc>,
    /// Entity type tag.
    pub entity_type: String,
    /// Entity payload.
    pub entity: E,
}

impl<E> Envelope<E> {
    /// Splits the envelope into a record.
    pub fn into_record(self) -> EntityRecord<E> {
        EntityRecord {
            entity: self.entity,
            metadata: Metadata {
                identity: self.identity,
                created_at: self.created_at,
                last_modified_at: self.last_modified_at,
                entity_type: self.entity_type,
            },
        }
    }
}

/// Borrowing counterpart of [`Envelope`] used when writing.
#[derive(Serialize)]
pub(crate) struct EnvelopeRef<'a, E> {
    identity: &'a EntityKey,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
    entity_type: &'a str,
    entity: &'a E,
}

impl<'a, E> From<&'a EntityRecord<E>> for EnvelopeRef<'a, E> {
    fn from(record: &'a EntityRecord<E>) -> Self {
        Self {
            identity: &record.metadata.identity,
            created_at: record.metadata.created_at,
            last_modified_at: record.metadata.last_modified_at,
            entity_type: &record.metadata.entity_type,
            entity: &record.entity,
        }
    }
}
