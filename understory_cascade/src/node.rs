// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Override snapshots.
//!
//! This module provides [`ConfigNode`], the immutable set of overrides visible
//! at one point of the tree, and the shallow merge that combines an
//! ancestor's node with a nearer scope's declarations.

use alloc::sync::Arc;
use alloc::vec::Vec;

use understory_props::{ComponentName, PropKey, PropValue};

/// One bucket of overrides: prop key to override value or factory.
///
/// `Null` is never stored; see [`ConfigNodeBuilder`].
#[derive(Clone, Debug, Default)]
pub struct Bucket {
    /// Sorted by key for binary search lookup.
    entries: Vec<(PropKey, PropValue)>,
}

impl Bucket {
    /// Returns the override for `key`, if declared.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Returns `true` if `key` is declared.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the number of declared keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the declared overrides in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &PropValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    fn set(&mut self, key: PropKey, value: PropValue) {
        match self.entries.binary_search_by(|(k, _)| k.cmp(&key)) {
            Ok(idx) => self.entries[idx].1 = value,
            Err(idx) => self.entries.insert(idx, (key, value)),
        }
    }

    /// Per-key overlay: entries of `nearer` replace entries of `self`.
    fn overlay(&self, nearer: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in &nearer.entries {
            merged.set(key.clone(), value.clone());
        }
        merged
    }
}

/// An immutable snapshot of the overrides visible at one point of the tree.
///
/// A node has a default bucket, consulted for any component, and named
/// buckets keyed by component name. Cloning a node is cheap and shares the
/// snapshot; nothing ever mutates a node after it is built, so holders of an
/// older node keep seeing its contents.
///
/// # Example
///
/// ```rust
/// use understory_cascade::ConfigNode;
/// use understory_props::PropValue;
///
/// let app = ConfigNode::builder()
///     .default("size", "small")
///     .set("Button", "color", "red")
///     .build();
///
/// let local = ConfigNode::builder().set("Button", "color", "green").build();
/// let visible = ConfigNode::merged(&app, &local);
///
/// assert_eq!(visible.named("Button", "color"), Some(&PropValue::from("green")));
/// assert_eq!(visible.default_value("size"), Some(&PropValue::from("small")));
///
/// // The ancestor node is untouched.
/// assert_eq!(app.named("Button", "color"), Some(&PropValue::from("red")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConfigNode {
    inner: Arc<NodeData>,
}

#[derive(Debug, Default)]
struct NodeData {
    default: Bucket,
    /// Sorted by component name for binary search lookup.
    named: Vec<(ComponentName, Bucket)>,
}

impl ConfigNode {
    /// Returns an empty node.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a builder for a node.
    #[must_use]
    pub fn builder() -> ConfigNodeBuilder {
        ConfigNodeBuilder::new()
    }

    /// Returns the default bucket.
    #[must_use]
    #[inline]
    pub fn default_bucket(&self) -> &Bucket {
        &self.inner.default
    }

    /// Returns the bucket named after `component`, if any.
    #[must_use]
    pub fn bucket(&self, component: &str) -> Option<&Bucket> {
        self.inner
            .named
            .binary_search_by(|(name, _)| name.as_str().cmp(component))
            .ok()
            .map(|idx| &self.inner.named[idx].1)
    }

    /// Looks up `key` in the named bucket of `component`.
    #[must_use]
    pub fn named(&self, component: &str, key: &str) -> Option<&PropValue> {
        self.bucket(component).and_then(|bucket| bucket.get(key))
    }

    /// Looks up `key` in the default bucket.
    #[must_use]
    pub fn default_value(&self, key: &str) -> Option<&PropValue> {
        self.inner.default.get(key)
    }

    /// Iterates over named buckets in component name order.
    pub fn buckets(&self) -> impl Iterator<Item = (&ComponentName, &Bucket)> + '_ {
        self.inner.named.iter().map(|(name, bucket)| (name, bucket))
    }

    /// Returns `true` if the node declares no overrides at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.default.is_empty() && self.inner.named.iter().all(|(_, b)| b.is_empty())
    }

    /// Returns `true` if both handles share the same snapshot.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Merges a nearer scope's declarations over an ancestor's visible node.
    ///
    /// The merge is shallow and per key, over the default bucket and every
    /// named bucket: a key declared in `nearer` replaces the ancestor's value
    /// for that key, and every other key keeps the ancestor's value. Lists and
    /// maps are replaced wholesale, never merged recursively.
    ///
    /// Always returns a new node.
    #[must_use]
    pub fn merged(ancestor: &Self, nearer: &Self) -> Self {
        let default = ancestor.inner.default.overlay(&nearer.inner.default);

        let mut named = ancestor.inner.named.clone();
        for (component, bucket) in &nearer.inner.named {
            match named.binary_search_by(|(name, _)| name.cmp(component)) {
                Ok(idx) => named[idx].1 = named[idx].1.overlay(bucket),
                Err(idx) => named.insert(idx, (component.clone(), bucket.clone())),
            }
        }

        Self {
            inner: Arc::new(NodeData { default, named }),
        }
    }
}

/// Builder for constructing [`ConfigNode`] instances.
///
/// `Null` overrides are dropped: a `Null` override means "not declared" and
/// never hides an ancestor's value or a component's own default.
///
/// # Example
///
/// ```rust
/// use understory_cascade::ConfigNode;
/// use understory_props::PropValue;
///
/// let node = ConfigNode::builder()
///     .default("size", "small")
///     .default("color", PropValue::Null)
///     .component("Select", [("clearable", true)])
///     .build();
///
/// assert!(node.default_bucket().contains("size"));
/// assert!(!node.default_bucket().contains("color"));
/// assert_eq!(node.named("Select", "clearable"), Some(&PropValue::Bool(true)));
/// ```
#[derive(Debug, Default)]
pub struct ConfigNodeBuilder {
    data: NodeData,
}

impl ConfigNodeBuilder {
    /// Creates a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: NodeData::default(),
        }
    }

    /// Declares a default-bucket override.
    #[must_use]
    pub fn default(mut self, key: impl Into<PropKey>, value: impl Into<PropValue>) -> Self {
        let value = value.into();
        if value.is_provided() {
            self.data.default.set(key.into(), value);
        }
        self
    }

    /// Declares an override in the named bucket of `component`.
    #[must_use]
    pub fn set(
        mut self,
        component: impl Into<ComponentName>,
        key: impl Into<PropKey>,
        value: impl Into<PropValue>,
    ) -> Self {
        let value = value.into();
        if value.is_provided() {
            self.bucket_mut(component.into()).set(key.into(), value);
        }
        self
    }

    /// Declares several overrides in the named bucket of `component`.
    #[must_use]
    pub fn component<K, V, I>(mut self, component: impl Into<ComponentName>, entries: I) -> Self
    where
        K: Into<PropKey>,
        V: Into<PropValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let bucket = self.bucket_mut(component.into());
        for (key, value) in entries {
            let value = value.into();
            if value.is_provided() {
                bucket.set(key.into(), value);
            }
        }
        self
    }

    fn bucket_mut(&mut self, component: ComponentName) -> &mut Bucket {
        let named = &mut self.data.named;
        let idx = match named.binary_search_by(|(name, _)| name.cmp(&component)) {
            Ok(idx) => idx,
            Err(idx) => {
                named.insert(idx, (component, Bucket::default()));
                idx
            }
        };
        &mut named[idx].1
    }

    /// Builds the node.
    #[must_use]
    pub fn build(self) -> ConfigNode {
        ConfigNode {
            inner: Arc::new(self.data),
        }
    }
}

#[cfg(feature = "serde")]
mod de {
    use super::{ConfigNode, ConfigNodeBuilder};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use serde::{Deserialize, Deserializer};
    use understory_props::PropValue;

    /// Key of the default bucket in the serialized shape.
    const DEFAULT_BUCKET: &str = "default";

    impl<'de> Deserialize<'de> for ConfigNode {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let raw = BTreeMap::<String, BTreeMap<String, PropValue>>::deserialize(deserializer)?;
            let mut builder = ConfigNodeBuilder::new();
            for (bucket, entries) in raw {
                if bucket == DEFAULT_BUCKET {
                    for (key, value) in entries {
                        builder = builder.default(key, value);
                    }
                } else {
                    builder = builder.component(bucket, entries);
                }
            }
            Ok(builder.build())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn nearer_wins_per_key_and_rest_is_kept() {
        let ancestor = ConfigNode::builder()
            .default("size", "small")
            .default("round", true)
            .set("Button", "color", "red")
            .set("Button", "plain", false)
            .build();
        let nearer = ConfigNode::builder()
            .default("size", "large")
            .set("Button", "color", "green")
            .set("Input", "clearable", true)
            .build();

        let merged = ConfigNode::merged(&ancestor, &nearer);
        assert_eq!(
            merged.default_value("size"),
            Some(&PropValue::from("large"))
        );
        assert_eq!(merged.default_value("round"), Some(&PropValue::Bool(true)));
        assert_eq!(
            merged.named("Button", "color"),
            Some(&PropValue::from("green"))
        );
        assert_eq!(
            merged.named("Button", "plain"),
            Some(&PropValue::Bool(false))
        );
        assert_eq!(
            merged.named("Input", "clearable"),
            Some(&PropValue::Bool(true))
        );
        assert_eq!(merged.buckets().count(), 2);
    }

    #[test]
    fn lists_are_replaced_not_merged() {
        let ancestor = ConfigNode::builder()
            .default("options", vec![PropValue::from("a"), PropValue::from("b")])
            .build();
        let nearer = ConfigNode::builder()
            .default("options", vec![PropValue::from("c")])
            .build();

        let merged = ConfigNode::merged(&ancestor, &nearer);
        let options = merged.default_value("options").unwrap().as_list().unwrap();
        assert_eq!(options, &[PropValue::from("c")]);
    }

    #[test]
    fn merge_never_touches_inputs() {
        let ancestor = ConfigNode::builder().default("size", "small").build();
        let nearer = ConfigNode::builder().default("size", "large").build();
        let snapshot = ancestor.clone();

        let merged = ConfigNode::merged(&ancestor, &nearer);
        assert!(!merged.ptr_eq(&ancestor));
        assert!(snapshot.ptr_eq(&ancestor));
        assert_eq!(
            ancestor.default_value("size"),
            Some(&PropValue::from("small"))
        );
        assert_eq!(
            nearer.default_value("size"),
            Some(&PropValue::from("large"))
        );
    }

    #[test]
    fn null_declarations_are_dropped() {
        let node = ConfigNode::builder()
            .default("size", PropValue::Null)
            .set("Tag", "type", PropValue::Null)
            .build();
        assert!(node.is_empty());
        assert!(node.named("Tag", "type").is_none());
    }

    #[test]
    fn later_builder_call_wins() {
        let node = ConfigNode::builder()
            .set("Tag", "type", "info")
            .component("Tag", [("type", "danger"), ("size", "small")])
            .build();
        assert_eq!(node.named("Tag", "type"), Some(&PropValue::from("danger")));
        assert_eq!(node.bucket("Tag").map(Bucket::len), Some(2));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_bootstrap_shape() {
        let node: ConfigNode = serde_json::from_str(
            r#"{ "default": { "size": "small", "color": null }, "Select": { "clearable": true } }"#,
        )
        .unwrap();
        assert_eq!(node.default_value("size"), Some(&PropValue::from("small")));
        assert!(node.default_value("color").is_none());
        assert_eq!(
            node.named("Select", "clearable"),
            Some(&PropValue::Bool(true))
        );
    }
}
