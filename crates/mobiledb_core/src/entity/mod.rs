//! Entity types, identity and records.

mod key;
mod record;

pub use key::EntityKey;
pub use record::{EntityRecord, Envelope, Metadata};
pub(crate) use record::EnvelopeRef;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A type that can be stored in a [`crate::JsonStore`].
///
/// Each entity type gets its own store and its own file, named after
/// [`Entity::TYPE_NAME`]. The payload is persisted as JSON through serde.
///
/// # Example
///
/// ```rust
/// use mobiledb_core::{Entity, EntityKey};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// impl Entity for User {
///     const TYPE_NAME: &'static str = "User";
///
///     fn key(&self) -> EntityKey {
///         EntityKey::from(&self.id)
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Stable type name; the store file is `<TYPE_NAME>.json`.
    const TYPE_NAME: &'static str;

    /// Returns the identity derived from the entity's key field(s).
    fn key(&self) -> EntityKey;

    /// Returns the type tag recorded in the entity's metadata.
    ///
    /// Defaults to [`Entity::TYPE_NAME`]. Entities that are enums over
    /// several shapes return a per-variant tag so that records can be
    /// narrowed by tag without decoding the payload.
    fn type_tag(&self) -> &str {
        Self::TYPE_NAME
    }
}

/// Typed adapter that narrows a stored entity to a more specific type.
///
/// Used by [`crate::JsonStore::as_queryable`]. Every entity type narrows to
/// itself; implement this for the variant types of an enum entity to query
/// just that variant.
///
/// ```rust
/// use mobiledb_core::Narrow;
///
/// #[derive(Clone)]
/// enum Shape { Circle(f64), Square(f64) }
///
/// struct Circle(f64);
///
/// impl Narrow<Shape> for Circle {
///     fn narrow(shape: &Shape) -> Option<Self> {
///         match shape {
///             Shape::Circle(r) => Some(Circle(*r)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Narrow<E>: Sized {
    /// Returns the narrowed value, or `None` if `entity` is not a `Self`.
    fn narrow(entity: &E) -> Option<Self>;
}

impl<E: Clone> Narrow<E> for E {
    fn narrow(entity: &E) -> Option<Self> {
        Some(entity.clone())
    }
}
