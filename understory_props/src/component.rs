// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component definitions: a name plus normalized prop definitions.

use smallvec::SmallVec;

use crate::definition::{PropDefinition, PropSpec};
use crate::name::{ComponentName, PropKey};

/// Default inline capacity for declared props.
const INLINE_CAPACITY: usize = 8;

/// A component family and the props it declares.
///
/// Every declaration is normalized exactly once, here. Declaring the same key
/// twice keeps the later declaration.
///
/// # Example
///
/// ```rust
/// use understory_props::{ComponentDefinition, PropDefinitionBuilder, PropSpec, PropValue};
///
/// let button = ComponentDefinition::new(
///     "Button",
///     [
///         ("size", PropSpec::from("medium")),
///         ("type", PropDefinitionBuilder::new().default_value("default").into()),
///         ("onClick", PropSpec::Null),
///     ],
/// );
///
/// assert_eq!(button.name(), "Button");
/// assert_eq!(button.len(), 3);
/// assert!(button.get("onClick").unwrap().is_func());
/// assert_eq!(
///     button.get("size").unwrap().default_value(),
///     &PropValue::from("medium")
/// );
/// ```
#[derive(Clone, Debug)]
pub struct ComponentDefinition {
    name: ComponentName,
    /// Sorted by key for binary search lookup.
    props: SmallVec<[(PropKey, PropDefinition); INLINE_CAPACITY]>,
}

impl ComponentDefinition {
    /// Normalizes `props` into a definition for the component `name`.
    pub fn new<N, K, S, I>(name: N, props: I) -> Self
    where
        N: Into<ComponentName>,
        K: Into<PropKey>,
        S: Into<PropSpec>,
        I: IntoIterator<Item = (K, S)>,
    {
        let mut sorted: SmallVec<[(PropKey, PropDefinition); INLINE_CAPACITY]> = SmallVec::new();
        for (key, spec) in props {
            let key = key.into();
            let definition = spec.into().normalize(key.as_str());
            match sorted.binary_search_by(|(k, _)| k.cmp(&key)) {
                Ok(idx) => sorted[idx].1 = definition,
                Err(idx) => sorted.insert(idx, (key, definition)),
            }
        }
        Self {
            name: name.into(),
            props: sorted,
        }
    }

    /// Returns the component name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Returns the definition of `key`, if declared.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropDefinition> {
        self.props
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.props[idx].1)
    }

    /// Returns `true` if `key` is declared.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of declared props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Returns `true` if no props are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Iterates over declared props in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &PropDefinition)> + '_ {
        self.props.iter().map(|(k, d)| (k, d))
    }

    /// Iterates over the props that declare a validator.
    pub fn validated(&self) -> impl Iterator<Item = (&PropKey, &PropDefinition)> + '_ {
        self.iter().filter(|(_, d)| d.has_validator())
    }
}
