// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty set: keys awaiting recomputation.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

/// Accumulated dirty keys with generation tracking.
///
/// The generation counter increments on every mutation, so a reader can
/// cheaply detect whether anything was invalidated since it last looked.
///
/// # Example
///
/// ```
/// use understory_reactive::DirtySet;
///
/// let mut dirty = DirtySet::<u32>::new();
/// assert!(dirty.mark(1));
/// assert!(!dirty.mark(1));
/// assert!(dirty.is_dirty(1));
///
/// let before = dirty.generation();
/// let taken = dirty.take();
/// assert_eq!(taken, vec![1]);
/// assert!(dirty.is_empty());
/// assert!(dirty.generation() > before);
/// ```
#[derive(Debug, Clone)]
pub struct DirtySet<K>
where
    K: Copy + Eq + Hash,
{
    keys: HashSet<K>,
    generation: u64,
}

impl<K> Default for DirtySet<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DirtySet<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty dirty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
            generation: 0,
        }
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks a key as dirty.
    ///
    /// Returns `true` if the key was newly inserted.
    pub fn mark(&mut self, key: K) -> bool {
        self.generation = self.generation.wrapping_add(1);
        self.keys.insert(key)
    }

    /// Returns `true` if the key is dirty.
    #[must_use]
    pub fn is_dirty(&self, key: K) -> bool {
        self.keys.contains(&key)
    }

    /// Returns `true` if no key is dirty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the number of dirty keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns an iterator over the dirty keys without clearing them.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.keys.iter().copied()
    }

    /// Removes and returns every dirty key, in unspecified order.
    pub fn take(&mut self) -> Vec<K> {
        self.generation = self.generation.wrapping_add(1);
        self.keys.drain().collect()
    }

    /// Clears all dirty keys.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.keys.clear();
    }

    /// Forgets a key that no longer exists.
    pub fn remove_key(&mut self, key: K) {
        if self.keys.remove(&key) {
            self.generation = self.generation.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_query() {
        let mut dirty = DirtySet::<u32>::new();
        assert!(dirty.is_empty());
        dirty.mark(1);
        dirty.mark(2);
        assert!(dirty.is_dirty(1));
        assert!(!dirty.is_dirty(3));
        assert_eq!(dirty.len(), 2);
    }

    #[test]
    fn generation_tracks_mutations() {
        let mut dirty = DirtySet::<u32>::new();
        assert_eq!(dirty.generation(), 0);
        dirty.mark(1);
        assert_eq!(dirty.generation(), 1);
        dirty.remove_key(5);
        assert_eq!(dirty.generation(), 1, "removing an absent key is a no-op");
        dirty.remove_key(1);
        assert_eq!(dirty.generation(), 2);
        dirty.clear();
        assert_eq!(dirty.generation(), 3);
    }

    #[test]
    fn take_empties() {
        let mut dirty = DirtySet::<u32>::new();
        dirty.mark(7);
        dirty.mark(8);
        let mut taken = dirty.take();
        taken.sort_unstable();
        assert_eq!(taken, alloc::vec![7, 8]);
        assert!(dirty.is_empty());
        assert_eq!(dirty.iter().count(), 0);
    }
}
