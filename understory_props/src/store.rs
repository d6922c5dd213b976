// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw instance-supplied prop values.
//!
//! [`InstanceValues`] is a sorted `SmallVec` searched with binary search; it
//! does not allocate until an instance sets more than the inline capacity.

use smallvec::SmallVec;

use crate::name::PropKey;
use crate::value::PropValue;

/// Default inline capacity for raw prop entries.
const INLINE_CAPACITY: usize = 8;

/// The props explicitly passed to one component instance.
///
/// Keys that the component never declared may be stored; they are inert.
/// Storing `Null` is the same as removing the key.
///
/// # Example
///
/// ```rust
/// use understory_props::{InstanceValues, PropValue};
///
/// let mut values = InstanceValues::new();
/// values.set("size", "large");
/// assert_eq!(values.get_provided("size"), Some(&PropValue::from("large")));
///
/// values.set("size", PropValue::Null);
/// assert_eq!(values.get_provided("size"), None);
/// assert!(values.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InstanceValues {
    entries: SmallVec<[(PropKey, PropValue); INLINE_CAPACITY]>,
}

impl InstanceValues {
    /// Creates an empty set of values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn find(&self, key: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.as_str().cmp(key))
    }

    /// Returns the value for `key` if one was provided (present and not `Null`).
    #[must_use]
    pub fn get_provided(&self, key: &str) -> Option<&PropValue> {
        self.find(key)
            .ok()
            .map(|idx| &self.entries[idx].1)
            .filter(|v| v.is_provided())
    }

    /// Sets `key` to `value`, returning the previous value.
    ///
    /// Setting `Null` removes the key.
    pub fn set(
        &mut self,
        key: impl Into<PropKey>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        let key = key.into();
        let value = value.into();
        if value.is_null() {
            return self.remove(key.as_str());
        }
        match self.find(key.as_str()) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                None
            }
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.find(key).ok().map(|idx| self.entries.remove(idx).1)
    }

    /// Returns the number of provided values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over provided values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&PropKey, &PropValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K, V> FromIterator<(K, V)> for InstanceValues
where
    K: Into<PropKey>,
    V: Into<PropValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.set(k, v);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn set_replaces_and_keeps_order() {
        let mut values = InstanceValues::new();
        assert_eq!(values.set("b", 1), None);
        assert_eq!(values.set("a", 2), None);
        assert_eq!(values.set("b", 3), Some(PropValue::from(1)));

        let keys: Vec<_> = values.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn null_means_absent() {
        let mut values: InstanceValues = [("a", PropValue::Null)].into_iter().collect();
        assert!(values.is_empty());
        values.set("a", false);
        assert_eq!(values.get_provided("a"), Some(&PropValue::Bool(false)));
        assert_eq!(values.remove("a"), Some(PropValue::Bool(false)));
        assert_eq!(values.remove("a"), None);
    }
}
