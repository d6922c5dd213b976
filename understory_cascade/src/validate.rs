// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validator runner: reports invalid raw values, once per change.

use smallvec::SmallVec;
use understory_props::{ComponentDefinition, InstanceValues, PropKey, PropValue};

use crate::diagnostics::Diagnostic;

/// Default inline capacity for observed raw values.
const INLINE_CAPACITY: usize = 4;

/// Runs prop validators over one instance's raw values.
///
/// The runner remembers the last raw value it saw for each validated prop and
/// only runs a validator when that value changes, so a failing value is
/// reported once no matter how often unrelated props recompute. Absent values
/// are never validated, and neither are values that came from the cascade.
///
/// # Example
///
/// ```rust
/// use understory_cascade::ValidatorRunner;
/// use understory_props::{ComponentDefinition, InstanceValues, PropDefinitionBuilder};
///
/// let select = ComponentDefinition::new(
///     "Select",
///     [(
///         "size",
///         PropDefinitionBuilder::new()
///             .default_value("default")
///             .validator(|v| matches!(v.as_str(), Some("small" | "default" | "large"))),
///     )],
/// );
///
/// let mut runner = ValidatorRunner::new();
/// let mut values = InstanceValues::new();
/// values.set("size", "huge");
///
/// let mut reported = Vec::new();
/// runner.check(&select, &values, |d| reported.push(d));
/// runner.check(&select, &values, |d| reported.push(d));
/// assert_eq!(reported.len(), 1);
/// assert_eq!(reported[0].key, "size");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ValidatorRunner {
    /// Sorted by key; only provided values are kept.
    observed: SmallVec<[(PropKey, PropValue); INLINE_CAPACITY]>,
}

impl ValidatorRunner {
    /// Creates a runner that has observed nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every raw value that changed since the previous check.
    ///
    /// Each failure is passed to `report`. Returns the number of failures.
    pub fn check<F>(
        &mut self,
        definition: &ComponentDefinition,
        values: &InstanceValues,
        mut report: F,
    ) -> usize
    where
        F: FnMut(Diagnostic),
    {
        let mut failures = 0;
        for (key, prop) in definition.validated() {
            let current = values.get_provided(key.as_str());
            let slot = self
                .observed
                .binary_search_by(|(k, _)| k.as_str().cmp(key.as_str()));

            match (slot, current) {
                (Ok(idx), Some(value)) if self.observed[idx].1.same(value) => {}
                (Ok(idx), None) => {
                    self.observed.remove(idx);
                }
                (Err(_), None) => {}
                (slot, Some(value)) => {
                    match slot {
                        Ok(idx) => self.observed[idx].1 = value.clone(),
                        Err(idx) => self.observed.insert(idx, (key.clone(), value.clone())),
                    }
                    if !prop.validate(value) {
                        failures += 1;
                        report(Diagnostic {
                            component: definition.name().clone(),
                            key: key.clone(),
                            value: value.clone(),
                        });
                    }
                }
            }
        }
        failures
    }

    /// Forgets everything observed, so the next check validates afresh.
    pub fn reset(&mut self) {
        self.observed.clear();
    }
}
