// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Non-fatal diagnostics and where they go.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_props::{ComponentName, PropKey, PropValue};

/// A prop misuse report: a validator rejected a raw instance value.
///
/// Diagnostics never affect resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// The component the instance belongs to.
    pub component: ComponentName,
    /// The prop whose validator failed.
    pub key: PropKey,
    /// The raw value that failed.
    pub value: PropValue,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid prop \"{}\" on component \"{}\": custom validator check failed for value {}",
            self.key, self.component, self.value
        )
    }
}

/// Receives diagnostics as they are emitted.
///
/// Closures taking `&Diagnostic` implement this trait.
pub trait DiagnosticSink {
    /// Handles one diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&Diagnostic),
{
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic);
    }
}

/// Logs every diagnostic as a `tracing` warning.
///
/// This is the default sink of a [`Cascade`](crate::Cascade).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        tracing::warn!(
            component = %diagnostic.component,
            prop = %diagnostic.key,
            "{diagnostic}"
        );
    }
}

/// Collects diagnostics in memory; clones share the same buffer.
///
/// # Example
///
/// ```rust
/// use understory_cascade::{Diagnostic, DiagnosticSink, MemorySink};
/// use understory_props::PropValue;
///
/// let sink = MemorySink::new();
/// let mut handle = sink.clone();
/// handle.emit(&Diagnostic {
///     component: "Select".into(),
///     key: "size".into(),
///     value: PropValue::from("huge"),
/// });
///
/// assert_eq!(sink.len(), 1);
/// assert_eq!(sink.take()[0].key, "size");
/// assert!(sink.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffer: Rc<RefCell<Vec<Diagnostic>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of collected diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// Returns `true` if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }

    /// Removes and returns everything collected so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        core::mem::take(&mut *self.buffer.borrow_mut())
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.buffer.borrow_mut().push(diagnostic.clone());
    }
}
