//! Ordered item storage with positional insertion.

use std::ops::Index;

/// Element types that can be looked up by name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Ordered container of items.
///
/// Insertion takes an optional position: non-negative positions count from the front,
/// negative positions count from the end, and both are clamped into the valid range.
/// Duplicates are allowed; [`Collection::remove`] drops every occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Collection<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    #[inline]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Alias of [`Collection::count`].
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve an insertion position into an index in `[0, count]`.
    fn insertion_index(&self, position: Option<isize>) -> usize {
        let size = self.items.len();
        match position {
            None => size,
            Some(p) if p >= 0 => (p as usize).min(size),
            Some(p) => size.saturating_sub(p.unsigned_abs()),
        }
    }

    /// Add an item, appending when `position` is `None`. Returns the index used.
    pub fn add(&mut self, item: T, position: Option<isize>) -> usize {
        let index = self.insertion_index(position);
        self.items.insert(index, item);
        index
    }

    /// Append an item.
    #[inline]
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Get an item by index.
    #[inline]
    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Get an item by index, mutably.
    #[inline]
    pub fn get_by_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// First item matching a predicate.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.items.iter().find(|item| predicate(item))
    }

    /// First item matching a predicate, mutably.
    pub fn find_mut(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.items.iter_mut().find(|item| predicate(item))
    }

    /// Remove and return the item at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Take all items out, leaving the collection empty.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Backing slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> Collection<T> {
    /// Remove every occurrence of `item`. Returns how many were removed.
    pub fn remove(&mut self, item: &T) -> usize {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        before - self.items.len()
    }

    /// Index of the first occurrence.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    /// Check membership.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T: Named> Collection<T> {
    /// First item with the given name.
    pub fn get_by_name(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|i| i.name() == name)
    }

    /// First item with the given name, mutably.
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|i| i.name() == name)
    }
}

impl<T> Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Collection<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag(&'static str);

    impl Named for Tag {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_add_positions() {
        let mut c: Collection<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(c.add(9, Some(-1)), 2);
        assert_eq!(c.as_slice(), &[1, 2, 9, 3]);

        assert_eq!(c.add(7, Some(100)), 4);
        assert_eq!(c.add(0, Some(0)), 0);
        assert_eq!(c.add(5, Some(-100)), 0);
        assert_eq!(c.as_slice(), &[5, 0, 1, 2, 9, 3, 7]);
        assert_eq!(c.count(), 7);
    }

    #[test]
    fn test_remove_all_occurrences() {
        let mut c = Collection::new();
        c.push(1);
        c.push(2);
        c.push(1);
        assert_eq!(c.remove(&1), 2);
        assert_eq!(c.as_slice(), &[2]);
        assert_eq!(c.remove(&42), 0);
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_add_remove_restores_count() {
        let mut c = Collection::new();
        c.push(Tag("a"));
        let before = c.count();
        c.add(Tag("b"), None);
        assert!(c.get_by_name("b").is_some());
        c.remove(&Tag("b"));
        assert_eq!(c.count(), before);
        assert!(c.get_by_name("b").is_none());
        assert!(c.get_by_index(5).is_none());
    }
}
