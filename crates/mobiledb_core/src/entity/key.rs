//! Entity identity keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Separator between the parts of a composite key (ASCII unit separator).
const PART_SEPARATOR: char = '\u{1f}';

/// Identity of an entity within one store.
///
/// Keys are opaque, comparable values derived from an entity's declared key
/// field(s). Internally a key is a canonical string, so keys order
/// lexicographically: integer keys compare as their decimal text.
///
/// A store holds at most one live record per key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Creates a key from its canonical string form.
    ///
    /// The canonical form of a composite key joins its parts with U+001F,
    /// so a string containing that character is read as a composite key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Creates a key from several key fields.
    ///
    /// Parts are joined with U+001F (ASCII unit separator), so `("a", "bc")`
    /// and `("ab", "c")` produce different keys. Parts must not themselves
    /// contain U+001F.
    pub fn composite<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: fmt::Display,
    {
        let joined = parts
            .into_iter()
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
            .join(&PART_SEPARATOR.to_string());
        Self(joined)
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates the parts of a composite key. A simple key has one part.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(PART_SEPARATOR)
    }

    /// Returns `true` if the key has more than one part.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.0.contains(PART_SEPARATOR)
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({self})")
    }
}

/// Parts are separated by `/`. A `/` or `\` inside a part is escaped with a
/// leading `\`, so distinct keys never display alike.
impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for c in part.chars() {
                if matches!(c, '/' | '\\') {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for EntityKey {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<Uuid> for EntityKey {
    fn from(value: Uuid) -> Self {
        Self(value.hyphenated().to_string())
    }
}

macro_rules! key_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for EntityKey {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

key_from_integer!(i32, i64, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_compare_by_text() {
        assert!(EntityKey::from("a") < EntityKey::from("b"));
        assert_eq!(EntityKey::from(42u64), EntityKey::from("42"));
    }

    #[test]
    fn composite_keys_do_not_collide() {
        let k1 = EntityKey::composite(["a", "bc"]);
        let k2 = EntityKey::composite(["ab", "c"]);
        assert_ne!(k1, k2);
        assert_eq!(k1.parts().collect::<Vec<_>>(), ["a", "bc"]);
        assert_eq!(k1.to_string(), "a/bc");
    }

    #[test]
    fn display_distinguishes_slash_from_composite() {
        let plain = EntityKey::from("a/b");
        let composite = EntityKey::composite(["a", "b"]);
        assert_eq!(plain.to_string(), "a\\/b");
        assert_eq!(composite.to_string(), "a/b");
        assert_eq!(EntityKey::from("a\\").to_string(), "a\\\\");
        assert!(!plain.is_composite());
        assert!(composite.is_composite());
    }

    #[test]
    fn canonical_form_with_separator_is_composite() {
        let key = EntityKey::new("a\u{1f}b");
        assert_eq!(key, EntityKey::composite(["a", "b"]));
        assert!(key.is_composite());
    }

    #[test]
    fn composite_of_mixed_fields() {
        let key = EntityKey::composite([7, 12]);
        assert_eq!(key.parts().collect::<Vec<_>>(), ["7", "12"]);
    }

    #[test]
    fn uuid_keys_are_hyphenated() {
        let id = Uuid::nil();
        assert_eq!(
            EntityKey::from(id).as_str(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&EntityKey::from("u1")).unwrap();
        assert_eq!(json, "\"u1\"");
        let back: EntityKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EntityKey::from("u1"));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", EntityKey::from("u1")), "EntityKey(u1)");
    }

    proptest::proptest! {
        #[test]
        fn composite_parts_round_trip(parts in proptest::collection::vec("[^\u{1f}]{0,8}", 1..5)) {
            let key = EntityKey::composite(&parts);
            let back: Vec<&str> = key.parts().collect();
            proptest::prop_assert_eq!(back, parts.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn ordering_follows_canonical_text(a in "\\PC{0,6}", b in "\\PC{0,6}") {
            let (ka, kb) = (EntityKey::from(a.as_str()), EntityKey::from(b.as_str()));
            proptest::prop_assert_eq!(ka.cmp(&kb), a.cmp(&b));
        }
    }
}
