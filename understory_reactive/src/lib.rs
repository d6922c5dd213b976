// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Reactive: dependency tracking and ordered recomputation.
//!
//! This crate is the subscribe/notify substrate used by `understory_cascade`.
//! Consumers declare what they read, producers mark themselves dirty, and a
//! flush drains every affected consumer in dependency order:
//!
//! - **Dependency graph** ([`DependencyGraph`]): "A reads B" edges, with cycle
//!   detection and bidirectional traversal.
//! - **Dirty set** ([`DirtySet`]): accumulated dirty keys with a generation
//!   counter for stale-read detection.
//! - **Topological drain** ([`DrainSorted`]): Kahn's algorithm yielding dirty
//!   keys dependencies-first, smallest key first among ready keys.
//! - **Tracker** ([`ReactiveTracker`]): graph + set with eager propagation.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_reactive::ReactiveTracker;
//!
//! let mut tracker = ReactiveTracker::<u32>::new();
//!
//! // 3 reads 2, 2 reads 1
//! tracker.add_dependency(2, 1).unwrap();
//! tracker.add_dependency(3, 2).unwrap();
//!
//! // Marking 1 also marks everything downstream of it.
//! tracker.mark(1);
//! assert!(tracker.is_dirty(3));
//!
//! let order: Vec<_> = tracker.drain_sorted().collect();
//! assert_eq!(order, vec![1, 2, 3]);
//! assert!(!tracker.has_dirty());
//! ```
//!
//! ## Scheduling Model
//!
//! Everything here is synchronous and single-threaded. Marking never
//! recomputes anything; the embedder decides when to drain. Readers that
//! have not drained keep observing their previous results.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod drain;
mod graph;
mod set;
mod tracker;

pub use drain::{DrainSorted, drain_sorted};
pub use graph::{CycleError, CycleHandling, DependencyGraph};
pub use set::DirtySet;
pub use tracker::ReactiveTracker;
