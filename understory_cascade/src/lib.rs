// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Cascade: hierarchical, reactive overrides for component props.
//!
//! Any scope of a component tree can override the defaults of whole families
//! of components. Nearer scopes refine farther ones, and values passed
//! explicitly to an instance always win.
//!
//! ## Core Concepts
//!
//! - **Config nodes** ([`ConfigNode`]): immutable override snapshots with a
//!   default bucket and per-component named buckets.
//! - **Scopes** ([`ScopeTree`]): each scope sees its parent's node merged with
//!   its own declarations, nearest key winning.
//! - **Resolution** ([`ResolveCx`]): the chain static, instance, named bucket,
//!   default bucket, local default.
//! - **Validation** ([`ValidatorRunner`]): raw values are checked once per
//!   change; failures become [`Diagnostic`]s and never block resolution.
//! - **Driver** ([`Cascade`]): scopes and instances tracked with
//!   `understory_reactive`, recomputed in dependency order on
//!   [`flush`](Cascade::flush).
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_cascade::{Cascade, ConfigNode, MemorySink, Resolution, ScopeId};
//! use understory_props::{InstanceValues, PropDefinitionBuilder, PropValue};
//!
//! let sink = MemorySink::new();
//! let mut cascade = Cascade::builder().diagnostics(sink.clone()).build();
//!
//! cascade.define(
//!     "Select",
//!     [(
//!         "size",
//!         PropDefinitionBuilder::new()
//!             .default_value("default")
//!             .validator(|v| matches!(v.as_str(), Some("small" | "default" | "large"))),
//!     )],
//! );
//! cascade.publish_root(ConfigNode::builder().default("size", "small").build());
//! cascade.flush();
//!
//! let plain = cascade.mount("Select", ScopeId::ROOT, InstanceValues::new()).unwrap();
//! assert_eq!(cascade.get(plain, "size"), Some(&PropValue::from("small")));
//! assert_eq!(cascade.explain(plain, "size"), Some(Resolution::DefaultBucket));
//!
//! let huge: InstanceValues = [("size", "huge")].into_iter().collect();
//! let huge = cascade.mount("Select", ScopeId::ROOT, huge).unwrap();
//! assert_eq!(cascade.get(huge, "size"), Some(&PropValue::from("huge")));
//! assert_eq!(sink.len(), 1);
//! ```
//!
//! ## Scheduling Model
//!
//! Everything is synchronous and single-threaded. Edits only mark what they
//! affect; [`Cascade::flush`] recomputes. Published nodes are never mutated,
//! so anything read before a flush stays consistent.
//!
//! ## Logging
//!
//! Diagnostics go to a [`DiagnosticSink`]; the default [`TracingSink`] logs
//! them as `tracing` warnings. The driver also emits `debug` events for
//! publishes and flushes and `trace` events per recomputation.
//!
//! ## Features
//!
//! - `serde`: implements `Deserialize` for [`ConfigNode`] from the shape
//!   `{ "default": { .. }, "<Component>": { .. } }`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod diagnostics;
mod error;
mod node;
mod resolve;
mod runtime;
mod scope;
mod validate;

pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use error::CascadeError;
pub use node::{Bucket, ConfigNode, ConfigNodeBuilder};
pub use resolve::{Resolution, ResolveCx, ResolvedProps, ResolvedValue};
pub use runtime::{Cascade, CascadeBuilder, FlushReport, InstanceId};
pub use scope::{ScopeId, ScopeTree};
pub use validate::ValidatorRunner;
