// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Combined tracker: graph + dirty set with eager propagation.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::drain::DrainSorted;
use crate::graph::{CycleError, CycleHandling, DependencyGraph};
use crate::set::DirtySet;

/// Dependency graph and dirty set bundled together.
///
/// Marking a key eagerly marks everything that reads it, directly or
/// transitively, so [`is_dirty`](Self::is_dirty) answers "is my last result
/// stale?" without a traversal at query time.
///
/// # Example
///
/// ```
/// use understory_reactive::ReactiveTracker;
///
/// let mut tracker = ReactiveTracker::<u32>::new();
/// tracker.add_dependency(2, 1).unwrap();
/// tracker.add_dependency(3, 1).unwrap();
///
/// tracker.mark(1);
/// let order: Vec<_> = tracker.drain_sorted().collect();
/// assert_eq!(order, vec![1, 2, 3]);
///
/// // Marking a leaf does not touch its siblings.
/// tracker.mark(2);
/// assert!(!tracker.is_dirty(3));
/// ```
#[derive(Debug, Clone)]
pub struct ReactiveTracker<K>
where
    K: Copy + Eq + Hash,
{
    graph: DependencyGraph<K>,
    dirty: DirtySet<K>,
    cycle_handling: CycleHandling,
}

impl<K> Default for ReactiveTracker<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ReactiveTracker<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty tracker with default cycle handling.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cycle_handling(CycleHandling::default())
    }

    /// Creates a new empty tracker with the specified cycle handling.
    #[must_use]
    pub fn with_cycle_handling(cycle_handling: CycleHandling) -> Self {
        Self {
            graph: DependencyGraph::new(),
            dirty: DirtySet::new(),
            cycle_handling,
        }
    }

    /// Returns the underlying dependency graph.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph<K> {
        &self.graph
    }

    /// Returns the underlying dirty set.
    #[must_use]
    pub fn dirty(&self) -> &DirtySet<K> {
        &self.dirty
    }

    /// Returns the generation of the dirty set.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.dirty.generation()
    }

    /// Records that `from` reads `to`.
    pub fn add_dependency(&mut self, from: K, to: K) -> Result<bool, CycleError<K>> {
        self.graph.add_dependency(from, to, self.cycle_handling)
    }

    /// Removes the edge `from` reads `to`.
    pub fn remove_dependency(&mut self, from: K, to: K) -> bool {
        self.graph.remove_dependency(from, to)
    }

    /// Forgets `key` entirely: its edges and any pending dirty mark.
    pub fn remove_key(&mut self, key: K) {
        self.graph.remove_key(key);
        self.dirty.remove_key(key);
    }

    /// Marks `key` and every transitive reader of it dirty.
    ///
    /// Returns the number of keys that were newly marked.
    pub fn mark(&mut self, key: K) -> usize {
        let mut newly = usize::from(self.dirty.mark(key));
        for dependent in self.graph.transitive_dependents(key) {
            newly += usize::from(self.dirty.mark(dependent));
        }
        newly
    }

    /// Marks only `key`, without propagating.
    pub fn mark_one(&mut self, key: K) -> bool {
        self.dirty.mark(key)
    }

    /// Returns `true` if `key` is waiting for recomputation.
    #[must_use]
    pub fn is_dirty(&self, key: K) -> bool {
        self.dirty.is_dirty(key)
    }

    /// Returns `true` if any key is waiting for recomputation.
    #[must_use]
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

impl<K> ReactiveTracker<K>
where
    K: Copy + Eq + Hash + Ord,
{
    /// Drains every dirty key in dependency order.
    ///
    /// The dirty set is emptied immediately.
    pub fn drain_sorted(&mut self) -> DrainSorted<'_, K> {
        let keys: Vec<K> = self.dirty.take();
        DrainSorted::new(keys, &self.graph)
    }
}
