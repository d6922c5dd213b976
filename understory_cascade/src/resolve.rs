// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop resolution against a visible [`ConfigNode`].
//!
//! For each declared prop the first applicable step wins:
//!
//! 1. **Static**: the prop ignores the cascade; the instance value if
//!    provided, else the local default.
//! 2. **Instance**: a provided instance value is used verbatim.
//! 3. **Named bucket**: the override for this component.
//! 4. **Default bucket**: the override for any component.
//! 5. **Local default**: the definition's own default.
//!
//! `Null` never counts as provided in steps 2 to 4, so the chain always ends
//! at a real value or the local default. Factories are invoked unless the
//! prop is function-typed.

use alloc::vec::Vec;

use understory_props::{ComponentDefinition, InstanceValues, PropDefinition, PropKey, PropValue};

use crate::node::ConfigNode;

/// Which step of the resolution chain produced a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A static prop: instance value or local default, no cascade.
    Static,
    /// The value explicitly passed to the instance.
    Instance,
    /// The override in the component's named bucket.
    NamedBucket,
    /// The override in the default bucket.
    DefaultBucket,
    /// The definition's own default.
    LocalDefault,
}

/// A resolved value and where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedValue {
    /// The effective value.
    pub value: PropValue,
    /// The step that produced it.
    pub resolution: Resolution,
}

impl ResolvedValue {
    fn new(value: PropValue, resolution: Resolution) -> Self {
        Self { value, resolution }
    }
}

/// Resolution context: the node visible where an instance lives.
///
/// Resolution is a pure function of the node, the definition, and the raw
/// value; it never writes to any of them.
///
/// # Example
///
/// ```rust
/// use understory_cascade::{ConfigNode, Resolution, ResolveCx};
/// use understory_props::{ComponentDefinition, InstanceValues, PropSpec, PropValue};
///
/// let button = ComponentDefinition::new(
///     "Button",
///     [("color", PropSpec::from("grey")), ("size", PropSpec::from("medium"))],
/// );
/// let node = ConfigNode::builder()
///     .default("color", "blue")
///     .set("Button", "color", "red")
///     .build();
///
/// let props = ResolveCx::new(&node).resolve_all(&button, &InstanceValues::new());
/// assert_eq!(props.get("color"), Some(&PropValue::from("red")));
/// assert_eq!(props.resolution("color"), Some(Resolution::NamedBucket));
/// assert_eq!(props.resolution("size"), Some(Resolution::LocalDefault));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ResolveCx<'a> {
    node: &'a ConfigNode,
}

impl<'a> ResolveCx<'a> {
    /// Creates a context reading `node`.
    #[must_use]
    pub fn new(node: &'a ConfigNode) -> Self {
        Self { node }
    }

    /// Returns the visible node.
    #[must_use]
    pub fn node(&self) -> &'a ConfigNode {
        self.node
    }

    /// Resolves one prop of `component`.
    ///
    /// `raw` is the instance value, if any; `Null` counts as absent.
    #[must_use]
    pub fn resolve(
        &self,
        component: &str,
        key: &str,
        definition: &PropDefinition,
        raw: Option<&PropValue>,
    ) -> ResolvedValue {
        let raw = raw.filter(|v| v.is_provided());

        if definition.is_static() {
            let value = match raw {
                Some(value) => value.clone(),
                None => definition.evaluate_default(),
            };
            return ResolvedValue::new(value, Resolution::Static);
        }

        if let Some(value) = raw {
            return ResolvedValue::new(value.clone(), Resolution::Instance);
        }

        let is_func = definition.is_func();
        let overrides = [
            (self.node.named(component, key), Resolution::NamedBucket),
            (self.node.default_value(key), Resolution::DefaultBucket),
        ];
        for (candidate, resolution) in overrides {
            if let Some(value) = candidate
                .map(|v| v.evaluate(is_func))
                .filter(PropValue::is_provided)
            {
                return ResolvedValue::new(value, resolution);
            }
        }

        ResolvedValue::new(definition.evaluate_default(), Resolution::LocalDefault)
    }

    /// Resolves every prop `definition` declares.
    ///
    /// Each declared key is present exactly once in the result, and each
    /// factory involved is invoked once.
    #[must_use]
    pub fn resolve_all(
        &self,
        definition: &ComponentDefinition,
        values: &InstanceValues,
    ) -> ResolvedProps {
        let component = definition.name().as_str();
        let entries = definition
            .iter()
            .map(|(key, prop)| {
                let key_str = key.as_str();
                let raw = values.get_provided(key_str);
                (key.clone(), self.resolve(component, key_str, prop, raw))
            })
            .collect();
        ResolvedProps { entries }
    }
}

/// The resolved props of one instance.
///
/// Reading never invokes factories; values were produced when the props were
/// resolved.
#[derive(Clone, Debug, Default)]
pub struct ResolvedProps {
    /// Sorted by key, in definition order.
    entries: Vec<(PropKey, ResolvedValue)>,
}

impl ResolvedProps {
    /// Returns the resolved entry for `key`.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&ResolvedValue> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Returns the effective value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entry(key).map(|r| &r.value)
    }

    /// Returns which resolution step produced `key`.
    #[must_use]
    pub fn resolution(&self, key: &str) -> Option<Resolution> {
        self.entry(key).map(|r| r.resolution)
    }

    /// Returns the number of resolved props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the component declares no props.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over effective values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &PropValue)> + '_ {
        self.entries.iter().map(|(k, r)| (k, &r.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use understory_props::{PropDefinitionBuilder, PropSpec};

    fn button() -> ComponentDefinition {
        ComponentDefinition::new(
            "Button",
            [
                ("color", PropSpec::from("grey")),
                (
                    "tabIndex",
                    PropDefinitionBuilder::new()
                        .default_value(0)
                        .is_static(true)
                        .into(),
                ),
                ("onClick", PropSpec::Null),
            ],
        )
    }

    fn overrides() -> ConfigNode {
        ConfigNode::builder()
            .default("color", "blue")
            .default("tabIndex", 7)
            .set("Button", "color", "red")
            .set("Button", "tabIndex", 9)
            .build()
    }

    #[test]
    fn static_props_ignore_the_cascade() {
        let node = overrides();
        let cx = ResolveCx::new(&node);
        let props = cx.resolve_all(&button(), &InstanceValues::new());
        assert_eq!(props.get("tabIndex"), Some(&PropValue::from(0)));
        assert_eq!(props.resolution("tabIndex"), Some(Resolution::Static));

        let values: InstanceValues = [("tabIndex", 3)].into_iter().collect();
        let props = cx.resolve_all(&button(), &values);
        assert_eq!(props.get("tabIndex"), Some(&PropValue::from(3)));
        assert_eq!(props.resolution("tabIndex"), Some(Resolution::Static));
    }

    #[test]
    fn instance_value_beats_overrides() {
        let node = overrides();
        let values: InstanceValues = [("color", "green")].into_iter().collect();
        let props = ResolveCx::new(&node).resolve_all(&button(), &values);
        assert_eq!(props.get("color"), Some(&PropValue::from("green")));
        assert_eq!(props.resolution("color"), Some(Resolution::Instance));
    }

    #[test]
    fn default_bucket_when_no_named_entry() {
        let node = ConfigNode::builder().default("color", "blue").build();
        let props = ResolveCx::new(&node).resolve_all(&button(), &InstanceValues::new());
        assert_eq!(props.get("color"), Some(&PropValue::from("blue")));
        assert_eq!(props.resolution("color"), Some(Resolution::DefaultBucket));
    }

    #[test]
    fn null_raw_value_is_not_provided() {
        let node = overrides();
        let def = button();
        let cx = ResolveCx::new(&node);
        let color = def.get("color").unwrap();
        let resolved = cx.resolve("Button", "color", color, Some(&PropValue::Null));
        assert_eq!(resolved.resolution, Resolution::NamedBucket);
    }

    #[test]
    fn null_producing_override_factory_falls_through() {
        let node = ConfigNode::builder()
            .set("Button", "color", PropValue::factory(|| PropValue::Null))
            .default("color", "blue")
            .build();
        let props = ResolveCx::new(&node).resolve_all(&button(), &InstanceValues::new());
        assert_eq!(props.get("color"), Some(&PropValue::from("blue")));
    }

    #[test]
    fn function_props_are_passed_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = PropValue::func(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            PropValue::Null
        });
        let node = ConfigNode::builder()
            .set("Button", "onClick", handler.clone())
            .build();

        let props = ResolveCx::new(&node).resolve_all(&button(), &InstanceValues::new());
        assert_eq!(props.get("onClick"), Some(&handler));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn every_declared_key_is_present() {
        let node = ConfigNode::empty();
        let values: InstanceValues = [("undeclared", 1)].into_iter().collect();
        let props = ResolveCx::new(&node).resolve_all(&button(), &values);
        assert_eq!(props.len(), 3);
        assert!(props.get("undeclared").is_none());
        assert_eq!(props.get("onClick"), Some(&PropValue::Null));
        assert_eq!(props.iter().count(), 3);
    }
}
