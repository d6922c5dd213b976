// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topologically sorted drain iterator.

use alloc::collections::BinaryHeap;
use alloc::vec::Vec;
use core::cmp::Reverse;
use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::graph::DependencyGraph;
use crate::set::DirtySet;

/// Iterator that yields dirty keys in dependency order.
///
/// Uses Kahn's algorithm restricted to the dirty subset: a key is yielded only
/// after every dirty key it reads. When several keys are ready at once, the
/// smallest (by `Ord`) is yielded first, so the order is reproducible.
///
/// Keys caught in a cycle are never yielded; [`is_stalled`](Self::is_stalled)
/// reports that after exhaustion. Graphs built with
/// [`CycleHandling::Error`](crate::CycleHandling::Error) cannot stall.
///
/// # Example
///
/// ```
/// use understory_reactive::{drain_sorted, CycleHandling, DependencyGraph, DirtySet};
///
/// let mut graph = DependencyGraph::<u32>::new();
/// graph.add_dependency(2, 1, CycleHandling::Error).unwrap();
/// graph.add_dependency(3, 2, CycleHandling::Error).unwrap();
///
/// let mut dirty = DirtySet::new();
/// dirty.mark(3);
/// dirty.mark(1);
/// dirty.mark(2);
///
/// let sorted: Vec<_> = drain_sorted(&mut dirty, &graph).collect();
/// assert_eq!(sorted, vec![1, 2, 3]);
/// assert!(dirty.is_empty());
/// ```
#[derive(Debug)]
pub struct DrainSorted<'a, K>
where
    K: Copy + Eq + Hash + Ord,
{
    graph: &'a DependencyGraph<K>,
    /// Keys with zero remaining in-degree (min-heap via `Reverse`).
    ready: BinaryHeap<Reverse<K>>,
    /// Remaining in-degree for each dirty key not yet yielded.
    in_degree: HashMap<K, usize>,
    stalled: bool,
}

impl<'a, K> DrainSorted<'a, K>
where
    K: Copy + Eq + Hash + Ord,
{
    pub(crate) fn new(keys: Vec<K>, graph: &'a DependencyGraph<K>) -> Self {
        let mut in_degree: HashMap<K, usize> = HashMap::with_capacity(keys.len());
        let mut unique = Vec::with_capacity(keys.len());
        for key in keys {
            if let Entry::Vacant(e) = in_degree.entry(key) {
                e.insert(0);
                unique.push(key);
            }
        }

        for &key in &unique {
            let dirty_reads = graph
                .dependencies(key)
                .filter(|dep| in_degree.contains_key(dep))
                .count();
            if let Some(degree) = in_degree.get_mut(&key) {
                *degree = dirty_reads;
            }
        }

        let ready = unique
            .into_iter()
            .filter(|k| in_degree.get(k) == Some(&0))
            .map(Reverse)
            .collect();

        Self {
            graph,
            ready,
            in_degree,
            stalled: false,
        }
    }

    /// Returns the number of keys not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.in_degree.len()
    }

    /// Returns `true` if the drain ran out of ready keys while some remained.
    ///
    /// Only meaningful after the iterator has been exhausted.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }
}

impl<K> Iterator for DrainSorted<'_, K>
where
    K: Copy + Eq + Hash + Ord,
{
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let Some(Reverse(key)) = self.ready.pop() else {
            self.stalled = !self.in_degree.is_empty();
            return None;
        };
        self.in_degree.remove(&key);

        for dependent in self.graph.dependents(key) {
            if let Some(degree) = self.in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    self.ready.push(Reverse(dependent));
                }
            }
        }

        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.ready.len(), Some(self.in_degree.len()))
    }
}

/// Drains `dirty` in dependency order given `graph`.
///
/// The dirty set is emptied immediately; the returned iterator only borrows
/// the graph.
pub fn drain_sorted<'a, K>(
    dirty: &mut DirtySet<K>,
    graph: &'a DependencyGraph<K>,
) -> DrainSorted<'a, K>
where
    K: Copy + Eq + Hash + Ord,
{
    DrainSorted::new(dirty.take(), graph)
}
