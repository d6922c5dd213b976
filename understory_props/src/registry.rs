// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component registry.
//!
//! This module provides [`ComponentRegistry`] for registering component
//! definitions once and sharing them with every instance.

use alloc::sync::Arc;
use hashbrown::HashMap;

use crate::component::ComponentDefinition;
use crate::definition::PropSpec;
use crate::name::{ComponentName, PropKey};

/// A registry of component definitions, keyed by component name.
///
/// Registration normalizes the prop declarations once and hands out a shared
/// [`Arc`]. Registering a name again replaces the definition for future
/// lookups; holders of the old `Arc` are unaffected.
///
/// # Example
///
/// ```rust
/// use understory_props::{ComponentRegistry, PropSpec};
///
/// let mut registry = ComponentRegistry::new();
/// let select = registry.register("Select", [("size", PropSpec::from("default"))]);
///
/// assert!(registry.get("Select").is_some());
/// assert_eq!(select.name(), "Select");
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: HashMap<ComponentName, Arc<ComponentDefinition>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and registers a component, returning the shared definition.
    pub fn register<N, K, S, I>(&mut self, name: N, props: I) -> Arc<ComponentDefinition>
    where
        N: Into<ComponentName>,
        K: Into<PropKey>,
        S: Into<PropSpec>,
        I: IntoIterator<Item = (K, S)>,
    {
        self.insert(ComponentDefinition::new(name, props))
    }

    /// Registers an already built definition.
    pub fn insert(&mut self, definition: ComponentDefinition) -> Arc<ComponentDefinition> {
        let definition = Arc::new(definition);
        self.components
            .insert(definition.name().clone(), definition.clone());
        definition
    }

    /// Looks up a component by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentDefinition>> {
        self.components.get(name)
    }

    /// Returns the number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no components are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterates over registered component names, in unspecified order.
    pub fn names(&self) -> impl Iterator<Item = &ComponentName> + '_ {
        self.components.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropValue;

    #[test]
    fn reregistering_replaces_for_new_lookups() {
        let mut registry = ComponentRegistry::new();
        let old = registry.register("Button", [("size", PropSpec::from("small"))]);
        let new = registry.register("Button", [("size", PropSpec::from("large"))]);

        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(registry.get("Button").unwrap(), &new));
        assert_eq!(
            old.get("size").unwrap().default_value(),
            &PropValue::from("small")
        );
    }

    #[test]
    fn unknown_lookup() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("Missing").is_none());
        assert_eq!(registry.names().count(), 0);
    }
}
