// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic prop values.
//!
//! Props are keyed by name and may hold data of any shape, including
//! callbacks. [`PropValue`] is the tagged variant covering all of them.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// The function type behind a [`Callback`].
pub type CallbackFn = dyn Fn(&[PropValue]) -> PropValue + Send + Sync;

/// A shared callable prop value.
///
/// Callbacks serve two roles: event-handler props hold them as data, and
/// defaults or overrides use zero-argument callbacks as factories. Equality is
/// pointer identity.
///
/// # Example
///
/// ```rust
/// use understory_props::{Callback, PropValue};
///
/// let make_items = Callback::new(|_| PropValue::from(vec![PropValue::from(1)]));
/// let items = make_items.call(&[]);
/// assert_eq!(items.as_list().map(<[PropValue]>::len), Some(1));
/// assert_eq!(make_items, make_items.clone());
/// ```
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wraps a function as a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[PropValue]) -> PropValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wraps a zero-argument factory.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> PropValue + Send + Sync + 'static,
    {
        Self::new(move |_| f())
    }

    /// Invokes the callback.
    pub fn call(&self, args: &[PropValue]) -> PropValue {
        (self.0)(args)
    }

    /// Returns `true` if both handles point at the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Arc::as_ptr(&self.0).cast::<()>())
    }
}

/// A dynamically typed prop value.
///
/// `Null` stands for "not provided" wherever a value is looked up through the
/// cascade; see [`PropValue::is_provided`].
///
/// Lists and maps are reference counted so cloning a value never deep-copies.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PropValue {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(Arc<str>),
    /// An ordered list.
    List(Arc<[Self]>),
    /// A string-keyed record.
    Map(Arc<BTreeMap<String, Self>>),
    /// A callback or factory.
    Func(Callback),
}

impl PropValue {
    /// Creates a [`PropValue::Func`] from a function.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&[Self]) -> Self + Send + Sync + 'static,
    {
        Self::Func(Callback::new(f))
    }

    /// Creates a [`PropValue::Func`] from a zero-argument factory.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> Self + Send + Sync + 'static,
    {
        Self::Func(Callback::factory(f))
    }

    /// Returns `true` for [`PropValue::Null`].
    #[must_use]
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` unless the value is [`PropValue::Null`].
    #[must_use]
    #[inline]
    pub fn is_provided(&self) -> bool {
        !self.is_null()
    }

    /// Returns the value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a list, if it is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the value as a record, if it is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the callback, if this is a [`PropValue::Func`].
    #[must_use]
    pub fn as_func(&self) -> Option<&Callback> {
        match self {
            Self::Func(f) => Some(f),
            _ => None,
        }
    }

    /// Produces the effective value of a default or override.
    ///
    /// A `Func` is a zero-argument factory and is invoked, unless `is_func`
    /// says the prop holds callbacks as data, in which case it is returned
    /// as is. Every other value is returned as is.
    ///
    /// ```rust
    /// use understory_props::PropValue;
    ///
    /// let factory = PropValue::factory(|| PropValue::from("fresh"));
    /// assert_eq!(factory.evaluate(false), PropValue::from("fresh"));
    /// assert_eq!(factory.evaluate(true), factory);
    /// assert_eq!(PropValue::from(3).evaluate(false), PropValue::from(3));
    /// ```
    #[must_use]
    pub fn evaluate(&self, is_func: bool) -> Self {
        match self {
            Self::Func(f) if !is_func => f.call(&[]),
            other => other.clone(),
        }
    }

    /// Identity-style comparison used for change detection.
    ///
    /// Unlike `==`, floats compare by bit pattern (so `NaN` is the same as
    /// `NaN`), and shared lists and maps short-circuit on pointer identity.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::List(a), Self::List(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same(y)))
            }
            (Self::Map(a), Self::Map(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.len() == b.len()
                        && a.iter()
                            .zip(b.iter())
                            .all(|((ka, va), (kb, vb))| ka == kb && va.same(vb)))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
            Self::Func(_) => f.write_str("<function>"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<Vec<Self>> for PropValue {
    fn from(items: Vec<Self>) -> Self {
        Self::List(Arc::from(items))
    }
}

impl From<BTreeMap<String, Self>> for PropValue {
    fn from(map: BTreeMap<String, Self>) -> Self {
        Self::Map(Arc::new(map))
    }
}

impl From<Callback> for PropValue {
    fn from(callback: Callback) -> Self {
        Self::Func(callback)
    }
}

impl<T: Into<Self>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(feature = "serde")]
mod de {
    use super::PropValue;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::fmt;
    use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

    struct PropValueVisitor;

    impl<'de> Visitor<'de> for PropValueVisitor {
        type Value = PropValue;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a prop value")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<PropValue, E> {
            Ok(PropValue::Bool(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<PropValue, E> {
            Ok(PropValue::Int(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<PropValue, E> {
            Ok(i64::try_from(v).map_or(PropValue::Float(v as f64), PropValue::Int))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<PropValue, E> {
            Ok(PropValue::Float(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<PropValue, E> {
            Ok(PropValue::from(v))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<PropValue, E> {
            Ok(PropValue::from(v))
        }

        fn visit_unit<E: de::Error>(self) -> Result<PropValue, E> {
            Ok(PropValue::Null)
        }

        fn visit_none<E: de::Error>(self) -> Result<PropValue, E> {
            Ok(PropValue::Null)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<PropValue, D::Error> {
            PropValue::deserialize(d)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<PropValue, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(item) = seq.next_element()? {
                items.push(item);
            }
            Ok(PropValue::from(items))
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PropValue, A::Error> {
            let mut map = BTreeMap::new();
            while let Some((k, v)) = access.next_entry::<String, PropValue>()? {
                map.insert(k, v);
            }
            Ok(PropValue::from(map))
        }
    }

    impl<'de> Deserialize<'de> for PropValue {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(PropValueVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn null_is_not_provided() {
        assert!(!PropValue::Null.is_provided());
        assert!(PropValue::from(false).is_provided());
        assert!(PropValue::from(0).is_provided());
        assert!(PropValue::from("").is_provided());
        assert_eq!(PropValue::from(None::<i64>), PropValue::Null);
    }

    #[test]
    fn evaluate_invokes_factory_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let factory = PropValue::factory(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            PropValue::from("made")
        });

        assert_eq!(factory.evaluate(false), PropValue::from("made"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Function-typed props never invoke.
        let passed = factory.evaluate(true);
        assert_eq!(passed, factory);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callbacks_compare_by_identity() {
        let a = Callback::new(|_| PropValue::Null);
        let b = Callback::new(|_| PropValue::Null);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn same_treats_nan_as_unchanged() {
        let nan = PropValue::Float(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert!(nan.same(&nan.clone()));
        assert!(!PropValue::Float(0.0).same(&PropValue::Float(-0.0)));
    }

    #[test]
    fn same_compares_containers_structurally() {
        let a = PropValue::from(vec![PropValue::from(1), PropValue::from("x")]);
        let b = PropValue::from(vec![PropValue::from(1), PropValue::from("x")]);
        let c = PropValue::from(vec![PropValue::from(2)]);
        assert!(a.same(&b));
        assert!(!a.same(&c));
        assert!(!a.same(&PropValue::Null));
    }

    #[test]
    fn accessors() {
        assert_eq!(PropValue::from(true).as_bool(), Some(true));
        assert_eq!(PropValue::from(7).as_i64(), Some(7));
        assert_eq!(PropValue::from(7).as_f64(), Some(7.0));
        assert_eq!(PropValue::from("a").as_str(), Some("a"));
        assert!(PropValue::func(|_| PropValue::Null).as_func().is_some());
        assert!(PropValue::from(1).as_str().is_none());
    }

    #[test]
    fn display() {
        let mut map = BTreeMap::new();
        map.insert(
            String::from("k"),
            PropValue::from(vec![PropValue::from(1), PropValue::Null]),
        );
        assert_eq!(format!("{}", PropValue::from(map)), "{\"k\": [1, null]}");
        assert_eq!(format!("{}", PropValue::from("huge")), "\"huge\"");
        assert_eq!(
            format!("{}", PropValue::func(|_| PropValue::Null)),
            "<function>"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_from_json() {
        let value: PropValue =
            serde_json::from_str(r#"{"size": "small", "rows": [1, 2.5, null, true]}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["size"], PropValue::from("small"));
        let rows = map["rows"].as_list().unwrap();
        assert_eq!(rows[0], PropValue::Int(1));
        assert_eq!(rows[1], PropValue::Float(2.5));
        assert_eq!(rows[2], PropValue::Null);
        assert_eq!(rows[3], PropValue::Bool(true));
    }
}
