// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Values carried by leaf constraints and reported by guests.

use crate::units::{Quantity, fmt_magnitude};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A typed constraint value.
///
/// Every leaf constraint fixes the variant it carries when it is parsed.  [`ConstraintValue::List`]
/// only ever appears on the guest side, as the haystack of the set-membership operators (e.g. the
/// flags a CPU reports).
#[derive(Clone, Debug, PartialEq, strum::EnumIs)]
pub enum ConstraintValue {
    Integer(i64),
    Quantity(Quantity),
    Text(String),
    Flag(bool),
    Float(f64),
    List(Vec<ConstraintValue>),
}

impl ConstraintValue {
    /// Order two values the way the comparison operators see them.
    ///
    /// Integers and floats compare numerically, quantities compare by converting to base units
    /// (an integer on either side is taken to be in base units), text compares lexically and
    /// flags compare as booleans.  Anything else is incomparable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &ConstraintValue) -> Option<Ordering> {
        use ConstraintValue::{Flag, Float, Integer, Quantity as Q, Text};
        match (self, other) {
            (Integer(a), Integer(b)) => Some(a.cmp(b)),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Q(a), Q(b)) => a.partial_cmp(b),
            (Q(a), Integer(b)) => a.to_base().partial_cmp(&(*b as f64)),
            (Integer(a), Q(b)) => (*a as f64).partial_cmp(&b.to_base()),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Flag(a), Flag(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Semantic equality, as used by `==`.
    #[must_use]
    pub fn matches(&self, other: &ConstraintValue) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConstraintValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for ConstraintValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintValue::Integer(v) => write!(f, "{v}"),
            ConstraintValue::Quantity(v) => write!(f, "{v}"),
            ConstraintValue::Text(v) => write!(f, "{v}"),
            ConstraintValue::Flag(v) => write!(f, "{v}"),
            ConstraintValue::Float(v) => write!(f, "{}", fmt_magnitude(*v)),
            ConstraintValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for ConstraintValue {
    fn from(value: i64) -> Self {
        ConstraintValue::Integer(value)
    }
}

impl From<bool> for ConstraintValue {
    fn from(value: bool) -> Self {
        ConstraintValue::Flag(value)
    }
}

impl From<f64> for ConstraintValue {
    fn from(value: f64) -> Self {
        ConstraintValue::Float(value)
    }
}

impl From<Quantity> for ConstraintValue {
    fn from(value: Quantity) -> Self {
        ConstraintValue::Quantity(value)
    }
}

impl From<&str> for ConstraintValue {
    fn from(value: &str) -> Self {
        ConstraintValue::Text(value.to_owned())
    }
}

impl From<String> for ConstraintValue {
    fn from(value: String) -> Self {
        ConstraintValue::Text(value)
    }
}

impl<T: Into<ConstraintValue>> FromIterator<T> for ConstraintValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ConstraintValue::List(iter.into_iter().map(Into::into).collect())
    }
}
