//! Membership tracking for tuples already seen.
//!
//! [`Tracker`] makes repeated insertions idempotent: the model graph builder
//! records `(source, target, property)` tuples here before adding an edge
//! and skips the edge when the tuple was already present.

use std::hash::Hash;

use indexmap::IndexSet;

/// A set of tuples, remembered in first-insertion order.
#[derive(Debug, Clone)]
pub struct Tracker<T> {
    seen: IndexSet<T>,
}

impl<T: Hash + Eq> Tracker<T> {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Tracker {
            seen: IndexSet::new(),
        }
    }

    /// Records `tuple`. Returns `true` if it had not been seen before.
    pub fn add(&mut self, tuple: T) -> bool {
        self.seen.insert(tuple)
    }

    /// Returns `true` if `tuple` has been recorded.
    pub fn has(&self, tuple: &T) -> bool {
        self.seen.contains(tuple)
    }

    /// Number of distinct tuples recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Recorded tuples in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.seen.iter()
    }
}

impl<T: Hash + Eq> Default for Tracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use proptest::prelude::*;

    #[test]
    fn second_insert_is_rejected() {
        let mut tracker = Tracker::new();
        assert!(tracker.add((NodeId(0), NodeId(1), "p".to_string())));
        assert!(!tracker.add((NodeId(0), NodeId(1), "p".to_string())));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn tuples_differing_in_any_position_are_distinct() {
        let mut tracker = Tracker::new();
        assert!(tracker.add(vec!["a".to_string(), "b".to_string()]));
        assert!(tracker.add(vec!["b".to_string(), "a".to_string()]));
        assert!(tracker.add(vec!["a".to_string()]));
        assert!(tracker.has(&vec!["a".to_string()]));
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut tracker = Tracker::new();
        tracker.add((3u32, 1u32));
        tracker.add((1, 2));
        tracker.add((3, 1));
        let seen: Vec<_> = tracker.iter().copied().collect();
        assert_eq!(seen, vec![(3, 1), (1, 2)]);
    }

    #[test]
    fn empty_by_default() {
        let tracker: Tracker<(u32, u32)> = Tracker::default();
        assert!(tracker.is_empty());
    }

    proptest! {
        #[test]
        fn add_reports_first_sighting(values in proptest::collection::vec(0u32..8, 0..32)) {
            let mut tracker = Tracker::new();
            let mut seen = std::collections::HashSet::new();
            for v in values {
                prop_assert_eq!(tracker.add(v), seen.insert(v));
            }
            prop_assert_eq!(tracker.len(), seen.len());
        }
    }
}
