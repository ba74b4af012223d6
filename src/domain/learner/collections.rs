//! Bounded collections backing the capped fields of a learner context.
//!
//! Both types evict oldest-first once full, and both re-apply their bound
//! when deserialized so a hand-edited document can never exceed it.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// FIFO queue holding at most `CAP` items; pushing onto a full queue drops
/// the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct BoundedQueue<T, const CAP: usize> {
    items: VecDeque<T>,
}

impl<T, const CAP: usize> BoundedQueue<T, CAP> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(CAP),
        }
    }

    /// Appends an item, returning the evicted oldest item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= CAP {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        CAP
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.items.iter()
    }

    /// Most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }
}

impl<T, const CAP: usize> Default for BoundedQueue<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAP: usize> From<Vec<T>> for BoundedQueue<T, CAP> {
    fn from(items: Vec<T>) -> Self {
        let mut queue = Self::new();
        for item in items {
            queue.push(item);
        }
        queue
    }
}

impl<T: Clone, const CAP: usize> From<BoundedQueue<T, CAP>> for Vec<T> {
    fn from(queue: BoundedQueue<T, CAP>) -> Self {
        queue.items.into_iter().collect()
    }
}

/// Insertion-ordered set holding at most `CAP` distinct items.
///
/// Re-inserting an existing item keeps its original position. Inserting a
/// new item into a full set evicts the oldest one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(
    serialize = "T: Clone + Serialize",
    deserialize = "T: PartialEq + Deserialize<'de>"
))]
pub struct CappedSet<T, const CAP: usize> {
    items: Vec<T>,
}

impl<T: PartialEq, const CAP: usize> CappedSet<T, CAP> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts an item if absent. Returns `true` when the set changed.
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        if self.items.len() >= CAP {
            self.items.remove(0);
        }
        self.items.push(item);
        true
    }

    /// Inserts every item in order, with the same eviction rule as `insert`.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.insert(item);
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        CAP
    }

    /// Oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq, const CAP: usize> Default for CappedSet<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq, const CAP: usize> From<Vec<T>> for CappedSet<T, CAP> {
    fn from(items: Vec<T>) -> Self {
        let mut set = Self::new();
        set.extend(items);
        set
    }
}

impl<T: Clone, const CAP: usize> From<CappedSet<T, CAP>> for Vec<T> {
    fn from(set: CappedSet<T, CAP>) -> Self {
        set.items
    }
}

impl<T: PartialEq, const CAP: usize> FromIterator<T> for CappedSet<T, CAP> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bounded_queue_evicts_oldest() {
        let mut queue: BoundedQueue<u32, 3> = BoundedQueue::new();
        assert_eq!(queue.push(1), None);
        assert_eq!(queue.push(2), None);
        assert_eq!(queue.push(3), None);
        assert_eq!(queue.push(4), Some(1));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(queue.latest(), Some(&4));
    }

    #[test]
    fn bounded_queue_deserialization_reapplies_bound() {
        let queue: BoundedQueue<u32, 2> = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn capped_set_ignores_duplicates_and_keeps_position() {
        let mut set: CappedSet<&str, 3> = CappedSet::new();
        assert!(set.insert("a"));
        assert!(set.insert("b"));
        assert!(!set.insert("a"));
        assert_eq!(set.as_slice(), &["a", "b"]);
    }

    #[test]
    fn capped_set_evicts_oldest_when_full() {
        let mut set: CappedSet<&str, 2> = CappedSet::new();
        set.extend(["a", "b", "c"]);
        assert_eq!(set.as_slice(), &["b", "c"]);
        assert!(!set.contains(&"a"));
    }

    #[test]
    fn capped_set_serializes_as_plain_list() {
        let set: CappedSet<String, 5> = vec!["x".to_string(), "x".to_string()].into();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[\"x\"]");
    }

    proptest! {
        #[test]
        fn bounded_queue_keeps_most_recent_in_order(items in proptest::collection::vec(any::<u16>(), 0..40)) {
            let mut queue: BoundedQueue<u16, 10> = BoundedQueue::new();
            for item in &items {
                queue.push(*item);
            }
            let expected: Vec<u16> = items.iter().rev().take(10).rev().copied().collect();
            prop_assert_eq!(queue.len(), items.len().min(10));
            prop_assert_eq!(queue.iter().copied().collect::<Vec<_>>(), expected);
        }

        #[test]
        fn capped_set_never_exceeds_cap_or_repeats(items in proptest::collection::vec(0u8..30, 0..80)) {
            let set: CappedSet<u8, 20> = items.iter().copied().collect();
            prop_assert!(set.len() <= 20);
            let mut seen = std::collections::HashSet::new();
            for item in set.iter() {
                prop_assert!(seen.insert(*item));
            }
            if let Some(last) = items.last() {
                prop_assert!(set.contains(last));
            }
        }
    }
}
