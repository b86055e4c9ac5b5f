// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors raised while parsing and querying hardware requirements.

use crate::operator::Operator;
use crate::units::QuantityError;

/// Result type used throughout the crate.
pub type HardwareResult<T> = Result<T, HardwareError>;

/// A textual token (constraint value or name) did not match its grammar.
///
/// Always carries the dimension name and the raw string that failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Could not parse '{raw_value}' for hardware requirement '{constraint_name}'{}", reason_suffix(.reason.as_deref()))]
pub struct ParseError {
    pub constraint_name: String,
    pub raw_value: String,
    pub reason: Option<String>,
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(": {r}")).unwrap_or_default()
}

impl ParseError {
    #[must_use]
    pub fn new(constraint_name: &str, raw_value: &str) -> Self {
        Self {
            constraint_name: constraint_name.to_owned(),
            raw_value: raw_value.to_owned(),
            reason: None,
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl ToString) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    /// Wrap a unit-registry failure for the given constraint.
    #[must_use]
    pub fn from_quantity(constraint_name: &str, raw_value: &str, error: &QuantityError) -> Self {
        Self::new(constraint_name, raw_value).with_reason(error)
    }
}

/// A structurally or semantically invalid hardware specification.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpecificationError {
    #[error("Operator '{operator}' is not allowed for '{name}'")]
    UnsupportedOperator { name: String, operator: Operator },
    #[error("Unknown hardware requirement '{0}'")]
    UnknownDimension(String),
    #[error("Unknown property '{property}' of hardware requirement '{name}'")]
    UnknownProperty { name: String, property: String },
    #[error("Hardware requirement '{name}' must be {expected}")]
    InvalidShape { name: String, expected: &'static str },
    #[error("Hardware requirement '{0}' lacks entity index")]
    MissingIndex(String),
    #[error("Hardware requirement '{0}' does not accept an entity index")]
    UnexpectedIndex(String),
    #[error("Hardware requirement '{name}' uses invalid entity index {index}")]
    InvalidIndex { name: String, index: i64 },
    #[error("Hardware requirement '{name}' skips entity index {index}, indices must be contiguous")]
    IndexGap { name: String, index: usize },
    #[error("Hardware requirement '{0}' lacks child property")]
    MissingChildName(String),
    #[error("Hardware requirement '{0}' does not accept a child property")]
    UnexpectedChildName(String),
    #[error("Invalid regular expression '{pattern}' for '{name}': {reason}")]
    InvalidPattern {
        name: String,
        pattern: String,
        reason: String,
    },
    #[error("Value '{raw_value}' of '{name}' is not {expected}")]
    UnitMismatch {
        name: String,
        raw_value: String,
        expected: &'static str,
    },
    #[error("A '{0}' block must be the only key of its mapping")]
    MixedBlock(&'static str),
}

/// Any error the engine can report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Specification(#[from] SpecificationError),
    /// Engine-internal invariant violation, e.g. asking an empty tree for a variant.
    #[error("{0}")]
    General(String),
}
