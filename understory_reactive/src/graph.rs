// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency graph between reactive producers and consumers.

use alloc::vec::Vec;
use core::fmt;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

/// Error returned when a cycle would be created by adding a dependency.
#[derive(Clone, PartialEq, Eq)]
pub struct CycleError<K> {
    /// The key that would read another.
    pub from: K,
    /// The key that would be read.
    pub to: K,
}

impl<K: fmt::Debug> fmt::Debug for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CycleError {{ from: {:?}, to: {:?} }}",
            self.from, self.to
        )
    }
}

impl<K: fmt::Debug> fmt::Display for CycleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "adding dependency {:?} -> {:?} would create a cycle",
            self.from, self.to
        )
    }
}

impl<K: fmt::Debug> core::error::Error for CycleError<K> {}

/// How to handle cycle detection when adding dependencies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CycleHandling {
    /// Panic in debug builds, silently ignore in release builds.
    #[default]
    DebugAssert,
    /// Return an error if a cycle would be created.
    Error,
    /// Silently ignore the dependency if it would create a cycle.
    Ignore,
}

/// Dependency graph: "A reads B" edges.
///
/// Edges are stored in both directions so that "what does A read?" and
/// "who reads A?" are both cheap. Recomputing a key is only valid after every
/// key it reads has been recomputed; [`DrainSorted`](crate::DrainSorted)
/// relies on the forward edges to honor that.
///
/// # Example
///
/// ```
/// use understory_reactive::{CycleHandling, DependencyGraph};
///
/// let mut graph = DependencyGraph::<u32>::new();
/// graph.add_dependency(2, 1, CycleHandling::Error).unwrap();
/// graph.add_dependency(3, 2, CycleHandling::Error).unwrap();
///
/// assert!(graph.dependencies(2).any(|k| k == 1));
/// assert!(graph.dependents(1).any(|k| k == 2));
///
/// let downstream = graph.transitive_dependents(1);
/// assert!(downstream.contains(&2));
/// assert!(downstream.contains(&3));
///
/// // Closing the loop is rejected.
/// assert!(graph.add_dependency(1, 3, CycleHandling::Error).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph<K>
where
    K: Copy + Eq + Hash,
{
    /// `forward[a]` -> keys that `a` reads.
    forward: HashMap<K, Vec<K>>,
    /// `reverse[b]` -> keys that read `b`.
    reverse: HashMap<K, Vec<K>>,
}

impl<K> Default for DependencyGraph<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DependencyGraph<K>
where
    K: Copy + Eq + Hash,
{
    /// Creates a new empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Returns `true` if the graph has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.values().all(Vec::is_empty)
    }

    /// Adds a dependency: `from` reads `to`.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the dependency was newly added.
    /// - `Ok(false)` if it already existed, or a cycle was ignored.
    /// - `Err(CycleError)` if a cycle would be created and `handling` is
    ///   [`CycleHandling::Error`].
    pub fn add_dependency(
        &mut self,
        from: K,
        to: K,
        handling: CycleHandling,
    ) -> Result<bool, CycleError<K>> {
        if from == to || self.reaches(to, from) {
            return match handling {
                CycleHandling::DebugAssert => {
                    debug_assert!(false, "adding dependency would create a cycle");
                    Ok(false)
                }
                CycleHandling::Error => Err(CycleError { from, to }),
                CycleHandling::Ignore => Ok(false),
            };
        }

        let fwd = self.forward.entry(from).or_default();
        if fwd.contains(&to) {
            return Ok(false);
        }
        fwd.push(to);
        self.reverse.entry(to).or_default().push(from);
        Ok(true)
    }

    /// Returns `true` if `target` is reachable from `start` along forward edges.
    fn reaches(&self, start: K, target: K) -> bool {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        stack.push(start);

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(next) = self.forward.get(&current) {
                stack.extend(next.iter().copied());
            }
        }

        false
    }

    /// Removes a dependency: `from` no longer reads `to`.
    ///
    /// Returns `true` if the dependency existed and was removed.
    pub fn remove_dependency(&mut self, from: K, to: K) -> bool {
        let Some(fwd) = self.forward.get_mut(&from) else {
            return false;
        };
        let Some(pos) = fwd.iter().position(|&k| k == to) else {
            return false;
        };
        fwd.swap_remove(pos);
        if fwd.is_empty() {
            self.forward.remove(&from);
        }

        if let Some(rev) = self.reverse.get_mut(&to) {
            if let Some(pos) = rev.iter().position(|&k| k == from) {
                rev.swap_remove(pos);
            }
            if rev.is_empty() {
                self.reverse.remove(&to);
            }
        }
        true
    }

    /// Removes every edge touching `key`, in both directions.
    ///
    /// Used when a producer or consumer is torn down.
    pub fn remove_key(&mut self, key: K) {
        if let Some(reads) = self.forward.remove(&key) {
            for to in reads {
                if let Some(rev) = self.reverse.get_mut(&to) {
                    rev.retain(|&k| k != key);
                    if rev.is_empty() {
                        self.reverse.remove(&to);
                    }
                }
            }
        }
        if let Some(readers) = self.reverse.remove(&key) {
            for from in readers {
                if let Some(fwd) = self.forward.get_mut(&from) {
                    fwd.retain(|&k| k != key);
                    if fwd.is_empty() {
                        self.forward.remove(&from);
                    }
                }
            }
        }
    }

    /// Returns the keys that `key` reads directly.
    pub fn dependencies(&self, key: K) -> impl Iterator<Item = K> + '_ {
        self.forward.get(&key).into_iter().flatten().copied()
    }

    /// Returns the keys that read `key` directly.
    pub fn dependents(&self, key: K) -> impl Iterator<Item = K> + '_ {
        self.reverse.get(&key).into_iter().flatten().copied()
    }

    /// Returns every key that reads `key`, directly or transitively.
    ///
    /// `key` itself is not included. Each key appears once.
    #[must_use]
    pub fn transitive_dependents(&self, key: K) -> Vec<K> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<K> = self.dependents(key).collect();

        while let Some(current) = stack.pop() {
            if current == key || !visited.insert(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.dependents(current));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn add_and_query_edges() {
        let mut g = DependencyGraph::<u32>::new();
        assert!(g.is_empty());
        assert_eq!(g.add_dependency(2, 1, CycleHandling::Error), Ok(true));
        assert_eq!(g.add_dependency(2, 1, CycleHandling::Error), Ok(false));

        assert_eq!(g.dependencies(2).collect::<Vec<_>>(), vec![1]);
        assert_eq!(g.dependents(1).collect::<Vec<_>>(), vec![2]);
        assert!(!g.is_empty());
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut g = DependencyGraph::<u32>::new();
        assert_eq!(
            g.add_dependency(1, 1, CycleHandling::Error),
            Err(CycleError { from: 1, to: 1 })
        );
        assert_eq!(g.add_dependency(1, 1, CycleHandling::Ignore), Ok(false));
        assert!(g.is_empty());
    }

    #[test]
    fn transitive_cycle_is_rejected() {
        let mut g = DependencyGraph::<u32>::new();
        g.add_dependency(2, 1, CycleHandling::Error).unwrap();
        g.add_dependency(3, 2, CycleHandling::Error).unwrap();
        assert!(g.add_dependency(1, 3, CycleHandling::Error).is_err());
    }

    #[test]
    fn transitive_dependents_of_diamond() {
        // 1 <- 2 <- 4, 1 <- 3 <- 4
        let mut g = DependencyGraph::<u32>::new();
        g.add_dependency(2, 1, CycleHandling::Error).unwrap();
        g.add_dependency(3, 1, CycleHandling::Error).unwrap();
        g.add_dependency(4, 2, CycleHandling::Error).unwrap();
        g.add_dependency(4, 3, CycleHandling::Error).unwrap();

        let mut down = g.transitive_dependents(1);
        down.sort_unstable();
        assert_eq!(down, vec![2, 3, 4]);
        assert!(g.transitive_dependents(4).is_empty());
    }

    #[test]
    fn remove_dependency_and_key() {
        let mut g = DependencyGraph::<u32>::new();
        g.add_dependency(2, 1, CycleHandling::Error).unwrap();
        g.add_dependency(3, 2, CycleHandling::Error).unwrap();

        assert!(g.remove_dependency(3, 2));
        assert!(!g.remove_dependency(3, 2));
        assert_eq!(g.dependents(2).count(), 0);

        g.add_dependency(3, 2, CycleHandling::Error).unwrap();
        g.remove_key(2);
        assert_eq!(g.dependencies(3).count(), 0);
        assert_eq!(g.dependents(1).count(), 0);
        assert!(g.is_empty());
    }

    #[test]
    fn cycle_error_display() {
        let err = CycleError {
            from: 1_u32,
            to: 2_u32,
        };
        let text = alloc::format!("{err}");
        assert!(text.contains("would create a cycle"));
    }
}
