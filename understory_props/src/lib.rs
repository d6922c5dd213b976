// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Props: component prop definitions and values.
//!
//! This crate describes *what* a component accepts. Resolving the value a
//! prop should currently have, through ancestor-declared overrides, is the
//! job of `understory_cascade`.
//!
//! ## Core Concepts
//!
//! ### Values
//!
//! [`PropValue`] is a dynamically typed value: scalars, strings, lists,
//! records, and [`Callback`]s. `Null` always means "not provided".
//!
//! A callback used as a default or override is a zero-argument factory and
//! is invoked to produce the value, unless the prop is function-typed
//! (`is_func`), in which case the callback *is* the value.
//!
//! ### Definitions
//!
//! [`PropSpec`] enumerates the shorthand forms an author may use; each
//! normalizes to one canonical [`PropDefinition`]:
//!
//! | Shorthand | Normalized |
//! |-----------|------------|
//! | `PropSpec::Null` | `Null` default |
//! | `PropSpec::Value(v)` | literal default `v` |
//! | `PropSpec::Factory(f)` | factory default `f` |
//! | `PropSpec::Explicit(builder)` | as built |
//!
//! `is_func` defaults to [`is_event_handler_key`] of the prop key.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_props::{
//!     ComponentRegistry, InstanceValues, PropDefinitionBuilder, PropSpec, PropValue,
//! };
//!
//! let mut registry = ComponentRegistry::new();
//! let select = registry.register(
//!     "Select",
//!     [
//!         (
//!             "size",
//!             PropDefinitionBuilder::new()
//!                 .default_value("default")
//!                 .validator(|v| matches!(v.as_str(), Some("small" | "default" | "large")))
//!                 .into(),
//!         ),
//!         ("options", PropSpec::factory(|| PropValue::from(Vec::<PropValue>::new()))),
//!         ("onUpdate", PropSpec::Null),
//!     ],
//! );
//!
//! assert!(select.get("onUpdate").unwrap().is_func());
//!
//! let mut values = InstanceValues::new();
//! values.set("size", "huge");
//! let size = select.get("size").unwrap();
//! assert!(!size.validate(values.get_provided("size").unwrap()));
//! ```
//!
//! ## Features
//!
//! - `serde`: implements `Deserialize` for [`PropValue`].
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod component;
mod definition;
mod name;
mod registry;
mod store;
mod value;

pub use component::ComponentDefinition;
pub use definition::{PropDefinition, PropDefinitionBuilder, PropSpec, ValidatorFn};
pub use name::{ComponentName, PropKey, is_event_handler_key};
pub use registry::ComponentRegistry;
pub use store::InstanceValues;
pub use value::{Callback, CallbackFn, PropValue};
