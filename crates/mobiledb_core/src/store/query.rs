//! Detached query results.

use std::ops::Deref;

/// A detached, owned snapshot of narrowed entities.
///
/// Built under the store's read lock and independent of it afterwards:
/// later changes to the store are not reflected, and enumerating the view
/// never blocks writers.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView<T> {
    items: Vec<T>,
}

impl<T> QueryView<T> {
    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the view.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for QueryView<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Deref for QueryView<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> FromIterator<T> for QueryView<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for QueryView<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a QueryView<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_a_slice() {
        let view: QueryView<u32> = (1..=3).collect();
        assert_eq!(view.len(), 3);
        assert_eq!(view.first(), Some(&1));
        assert_eq!(view.iter().sum::<u32>(), 6);
        assert_eq!(view.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn default_is_empty() {
        let view: QueryView<String> = QueryView::default();
        assert!(view.is_empty());
    }
}
