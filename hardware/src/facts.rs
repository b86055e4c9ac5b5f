// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Hardware facts observed on a guest.

use crate::value::ConstraintValue;
use std::collections::BTreeMap;

/// Observed values, keyed by the printable constraint name they answer (`cpu.processors`,
/// `disk[0].size`, `cpu.flag`).
///
/// Set-like properties such as `cpu.flag` are reported as a [`ConstraintValue::List`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuestFacts {
    facts: BTreeMap<String, ConstraintValue>,
}

impl GuestFacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style [`GuestFacts::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ConstraintValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Record a fact, replacing any previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ConstraintValue>,
    ) -> Option<ConstraintValue> {
        self.facts.insert(name.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConstraintValue> {
        self.facts.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl<K: Into<String>, V: Into<ConstraintValue>> FromIterator<(K, V)> for GuestFacts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut facts = GuestFacts::new();
        for (name, value) in iter {
            facts.insert(name, value);
        }
        facts
    }
}
