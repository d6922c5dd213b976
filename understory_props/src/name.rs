// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop keys and component names.
//!
//! Both are shared string handles: cloning bumps a reference count, and both
//! borrow as `str` so map lookups accept plain string slices.

use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

macro_rules! shared_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Creates a new name from a string.
            #[must_use]
            pub fn new(name: &str) -> Self {
                Self(Arc::from(name))
            }

            /// Returns the name as a string slice.
            #[must_use]
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(Arc::from(name))
            }
        }

        impl From<&$name> for $name {
            fn from(name: &$name) -> Self {
                name.clone()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                &*self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                &*self.0 == *other
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&&*self.0).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

shared_name! {
    /// The name of a declared prop, e.g. `size` or `onClick`.
    ///
    /// ```rust
    /// use understory_props::PropKey;
    ///
    /// let key = PropKey::from("size");
    /// assert_eq!(key, "size");
    /// assert_eq!(key.as_str(), "size");
    /// ```
    PropKey
}

shared_name! {
    /// The identifier of a component family, e.g. `Button` or `Select`.
    ///
    /// Named override buckets are keyed by this identifier.
    ComponentName
}

/// Returns `true` if `key` follows the event-handler naming convention.
///
/// The convention is `on` followed by an ASCII uppercase letter. Props named
/// this way default to `is_func`, so callbacks are passed through untouched.
///
/// ```rust
/// use understory_props::is_event_handler_key;
///
/// assert!(is_event_handler_key("onClick"));
/// assert!(is_event_handler_key("onUpdate:value"));
/// assert!(!is_event_handler_key("online"));
/// assert!(!is_event_handler_key("on"));
/// assert!(!is_event_handler_key("size"));
/// ```
#[must_use]
pub fn is_event_handler_key(key: &str) -> bool {
    key.strip_prefix("on")
        .and_then(|rest| rest.bytes().next())
        .is_some_and(|b| b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use hashbrown::HashMap;

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = HashMap::new();
        map.insert(ComponentName::from("Button"), 1);
        assert_eq!(map.get("Button"), Some(&1));
        assert_eq!(map.get("Select"), None);
    }

    #[test]
    fn clones_share_storage() {
        let a = PropKey::from("color");
        let b = a.clone();
        assert!(core::ptr::eq(a.as_str(), b.as_str()));
    }

    #[test]
    fn formatting() {
        let key = PropKey::from("size");
        assert_eq!(format!("{key}"), "size");
        assert_eq!(format!("{key:?}"), "PropKey(\"size\")");
    }

    #[test]
    fn event_handler_keys() {
        assert!(is_event_handler_key("onX"));
        assert!(!is_event_handler_key("onx"));
        assert!(!is_event_handler_key("once"));
        assert!(!is_event_handler_key("On"));
        assert!(!is_event_handler_key(""));
    }
}
