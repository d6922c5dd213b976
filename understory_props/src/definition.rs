// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Prop definitions and shorthand normalization.
//!
//! Authors may declare a prop as a bare literal, a bare factory, `null`, or an
//! explicit definition. [`PropSpec`] enumerates those forms and
//! [`PropSpec::normalize`] turns any of them into the canonical
//! [`PropDefinition`].

use alloc::sync::Arc;
use core::fmt;

use crate::name::is_event_handler_key;
use crate::value::{Callback, PropValue};

/// Predicate over a raw instance value; `false` signals misuse.
pub type ValidatorFn = Arc<dyn Fn(&PropValue) -> bool + Send + Sync>;

/// The canonical, normalized definition of one prop.
///
/// Definitions are immutable once built and shared by every instance of the
/// component that declares them.
///
/// # Example
///
/// ```rust
/// use understory_props::{PropDefinitionBuilder, PropValue};
///
/// let def = PropDefinitionBuilder::new()
///     .default_value("default")
///     .validator(|v| matches!(v.as_str(), Some("small" | "default" | "large")))
///     .normalize("size");
///
/// assert_eq!(def.default_value(), &PropValue::from("default"));
/// assert!(def.validate(&PropValue::from("large")));
/// assert!(!def.validate(&PropValue::from("huge")));
/// assert!(!def.is_static());
/// assert!(!def.is_func());
/// ```
#[derive(Clone)]
pub struct PropDefinition {
    default: PropValue,
    validator: Option<ValidatorFn>,
    is_static: bool,
    is_func: bool,
}

impl PropDefinition {
    /// Returns the raw default: a literal, a factory, or `Null`.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &PropValue {
        &self.default
    }

    /// Produces the local default, invoking a factory unless the prop is
    /// function-typed.
    #[must_use]
    pub fn evaluate_default(&self) -> PropValue {
        self.default.evaluate(self.is_func)
    }

    /// Returns `true` if the override cascade is bypassed for this prop.
    #[must_use]
    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns `true` if values of this prop are callbacks passed through as is.
    #[must_use]
    #[inline]
    pub fn is_func(&self) -> bool {
        self.is_func
    }

    /// Returns `true` if a validator is declared.
    #[must_use]
    #[inline]
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Runs the validator, if any. Props without one accept everything.
    #[must_use]
    pub fn validate(&self, value: &PropValue) -> bool {
        self.validator.as_ref().is_none_or(|v| v(value))
    }
}

// Manual Debug impl since validators aren't Debug
impl fmt::Debug for PropDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropDefinition")
            .field("default", &self.default)
            .field("has_validator", &self.validator.is_some())
            .field("is_static", &self.is_static)
            .field("is_func", &self.is_func)
            .finish()
    }
}

/// Builder for an explicit [`PropDefinition`].
///
/// `is_func` is left undecided unless set; normalization then derives it from
/// the prop key (see [`is_event_handler_key`]).
#[derive(Clone, Default)]
pub struct PropDefinitionBuilder {
    default: PropValue,
    validator: Option<ValidatorFn>,
    is_static: bool,
    is_func: Option<bool>,
}

impl fmt::Debug for PropDefinitionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropDefinitionBuilder")
            .field("default", &self.default)
            .field("has_validator", &self.validator.is_some())
            .field("is_static", &self.is_static)
            .field("is_func", &self.is_func)
            .finish()
    }
}

impl PropDefinitionBuilder {
    /// Creates a builder with a `Null` default and no validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<PropValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Sets a zero-argument factory default, evaluated on every resolution
    /// that falls through to the local default.
    #[must_use]
    pub fn default_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> PropValue + Send + Sync + 'static,
    {
        self.default = PropValue::factory(factory);
        self
    }

    /// Sets a validator over raw instance values.
    #[must_use]
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&PropValue) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Exempts the prop from the override cascade.
    #[must_use]
    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Overrides whether the prop holds callbacks as data.
    #[must_use]
    pub fn is_func(mut self, is_func: bool) -> Self {
        self.is_func = Some(is_func);
        self
    }

    /// Builds the definition for the prop named `key`.
    #[must_use]
    pub fn normalize(self, key: &str) -> PropDefinition {
        PropDefinition {
            default: self.default,
            validator: self.validator,
            is_static: self.is_static,
            is_func: self.is_func.unwrap_or_else(|| is_event_handler_key(key)),
        }
    }
}

/// Every form in which an author may declare a prop.
///
/// ```rust
/// use understory_props::{PropSpec, PropValue};
///
/// // Bare literal
/// let size = PropSpec::from("default").normalize("size");
/// assert_eq!(size.evaluate_default(), PropValue::from("default"));
///
/// // Bare factory: invoked for plain props
/// let items = PropSpec::factory(|| PropValue::from(Vec::<PropValue>::new()))
///     .normalize("items");
/// assert!(items.evaluate_default().as_list().is_some());
///
/// // Bare factory on an event handler key: passed through
/// let on_click = PropSpec::factory(|| PropValue::Null).normalize("onClick");
/// assert!(on_click.is_func());
/// assert!(on_click.evaluate_default().as_func().is_some());
///
/// // Null
/// assert!(PropSpec::Null.normalize("value").default_value().is_null());
/// ```
#[derive(Clone, Debug)]
pub enum PropSpec {
    /// No default.
    Null,
    /// A literal default.
    Value(PropValue),
    /// A zero-argument factory default.
    Factory(Callback),
    /// A fully explicit definition.
    Explicit(PropDefinitionBuilder),
}

impl PropSpec {
    /// Shorthand for [`PropSpec::Factory`].
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> PropValue + Send + Sync + 'static,
    {
        Self::Factory(Callback::factory(f))
    }

    /// Normalizes the declaration of the prop named `key`.
    ///
    /// This is pure and intended to run once per component definition.
    #[must_use]
    pub fn normalize(self, key: &str) -> PropDefinition {
        let builder = match self {
            Self::Null => PropDefinitionBuilder::new(),
            Self::Value(value) => PropDefinitionBuilder::new().default_value(value),
            Self::Factory(f) => PropDefinitionBuilder::new().default_value(f),
            Self::Explicit(builder) => builder,
        };
        builder.normalize(key)
    }
}

impl From<PropValue> for PropSpec {
    fn from(value: PropValue) -> Self {
        match value {
            PropValue::Null => Self::Null,
            PropValue::Func(f) => Self::Factory(f),
            other => Self::Value(other),
        }
    }
}

macro_rules! spec_from_literal {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PropSpec {
                fn from(value: $ty) -> Self {
                    PropValue::from(value).into()
                }
            }
        )*
    };
}

spec_from_literal!(bool, i32, i64, f64, &str, alloc::string::String, alloc::vec::Vec<PropValue>);

impl From<Callback> for PropSpec {
    fn from(callback: Callback) -> Self {
        Self::Factory(callback)
    }
}

impl From<PropDefinitionBuilder> for PropSpec {
    fn from(builder: PropDefinitionBuilder) -> Self {
        Self::Explicit(builder)
    }
}
