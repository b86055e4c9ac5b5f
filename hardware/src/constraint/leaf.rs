// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Leaf constraints: a single `name operator value` requirement.

use crate::error::{HardwareResult, ParseError, SpecificationError};
use crate::operator::{Operator, OperatorHandler};
use crate::parse::Spec;
use crate::pattern::{ConstraintNameComponents, parse_value};
use crate::units::{Dimension, Unit, parse_quantity};
use crate::value::ConstraintValue;
use regex::Regex;
use serde_yaml_ng::Mapping;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use tracing::trace;

/// Constraints whose equality really means membership in a guest-side set.
pub const MEMBERSHIP_CONSTRAINTS: &[&str] = &["cpu.flag", "compatible.distro", "boot.method"];

/// Constraints written as a list of values in specifications.
pub const LIST_VALUED_CONSTRAINTS: &[&str] = &["cpu.flag", "compatible.distro"];

/// How the textual value of a constraint is interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// A dimensioned quantity; bare numbers take the given unit.
    Quantity(Unit),
    /// A signed integer, decimal or `0x` hexadecimal.
    Integer,
    /// A boolean.
    Flag,
    /// Free text, or a regular expression when used with `~` and `!~`.
    Text,
}

impl ValueKind {
    /// Sizes default to bytes.
    pub const SIZE: ValueKind = ValueKind::Quantity(Unit::Byte);
    /// Frequencies default to megahertz.
    pub const FREQUENCY: ValueKind = ValueKind::Quantity(Unit::Megahertz);
}

/// A single hardware requirement.
///
/// Names use underscores internally (`cpu.cores_per_socket`) and dashes when shown to users
/// (see [`Constraint::printable_name`]).
#[derive(Clone)]
pub struct Constraint {
    name: String,
    operator: Operator,
    operator_handler: OperatorHandler,
    value: ConstraintValue,
    raw_value: String,
    unit: Option<Unit>,
    original_constraint: Option<Arc<Constraint>>,
}

impl Constraint {
    /// Build a constraint from its textual form, e.g. `>= 8 GiB`.
    ///
    /// A missing operator means equality.
    ///
    /// # Errors
    ///
    /// * [`ParseError`] when the text does not hold a valid value of the given kind.
    /// * [`SpecificationError::UnsupportedOperator`] when the operator is not in `allowed`.
    /// * [`SpecificationError::UnitMismatch`] when a quantity has the wrong dimension.
    /// * [`SpecificationError::InvalidPattern`] when a regular expression does not compile.
    #[tracing::instrument(level = "trace", skip(allowed))]
    pub fn from_specification(
        name: &str,
        raw: &str,
        kind: ValueKind,
        allowed: &[Operator],
    ) -> HardwareResult<Constraint> {
        let (operator, raw_value) = parse_value(name, raw)?;
        let operator = operator.unwrap_or(Operator::Eq);
        if !allowed.contains(&operator) {
            return Err(SpecificationError::UnsupportedOperator {
                name: printable(name),
                operator,
            }
            .into());
        }
        let (value, unit) = match kind {
            ValueKind::Quantity(default_unit) => {
                let quantity = parse_quantity(raw_value, Some(default_unit))
                    .map_err(|e| ParseError::from_quantity(name, raw_value, &e))?;
                if quantity.dimension() != default_unit.dimension() {
                    return Err(SpecificationError::UnitMismatch {
                        name: printable(name),
                        raw_value: raw_value.to_owned(),
                        expected: match default_unit.dimension() {
                            Dimension::Information => "a size",
                            Dimension::Frequency => "a frequency",
                        },
                    }
                    .into());
                }
                (ConstraintValue::Quantity(quantity), Some(default_unit))
            }
            ValueKind::Integer => (ConstraintValue::Integer(parse_integer(name, raw_value)?), None),
            ValueKind::Flag => (ConstraintValue::Flag(parse_flag(name, raw_value)?), None),
            ValueKind::Text => {
                if matches!(operator, Operator::Match | Operator::NotMatch) {
                    Regex::new(raw_value).map_err(|e| SpecificationError::InvalidPattern {
                        name: printable(name),
                        pattern: raw_value.to_owned(),
                        reason: e.to_string(),
                    })?;
                }
                (ConstraintValue::Text(raw_value.to_owned()), None)
            }
        };
        let constraint = Constraint {
            name: name.to_owned(),
            operator,
            operator_handler: operator.handler(),
            value,
            raw_value: raw_value.to_owned(),
            unit,
            original_constraint: None,
        };
        trace!("built constraint {constraint}");
        Ok(constraint)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn operator_handler(&self) -> OperatorHandler {
        self.operator_handler
    }

    #[must_use]
    pub fn value(&self) -> &ConstraintValue {
        &self.value
    }

    /// The value as written, without the operator.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Unit assumed for bare numbers, for quantity constraints.
    #[must_use]
    pub fn unit(&self) -> Option<Unit> {
        self.unit
    }

    /// The constraint this one was rewritten from, if any.
    #[must_use]
    pub fn original_constraint(&self) -> Option<&Constraint> {
        self.original_constraint.as_deref()
    }

    /// The name as users write it, e.g. `cpu.cores-per-socket` or `disk[1].size`.
    #[must_use]
    pub fn printable_name(&self) -> String {
        printable(&self.name)
    }

    /// Split the name into dimension, peer index and child name.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the constraint was built with a malformed name.
    pub fn expand_name(&self) -> Result<ConstraintNameComponents, ParseError> {
        self.name.parse()
    }

    pub(crate) fn change_operator(&mut self, operator: Operator) {
        self.operator = operator;
        self.operator_handler = operator.handler();
    }

    /// Turn equality into membership, remembering the constraint as originally parsed.
    #[must_use]
    pub(crate) fn into_membership(mut self) -> Constraint {
        let operator = match self.operator {
            Operator::Eq => Operator::Contains,
            Operator::Neq => Operator::NotContains,
            _ => return self,
        };
        self.original_constraint = Some(Arc::new(self.clone()));
        self.change_operator(operator);
        self
    }

    /// Apply the predicate to a value observed on a guest.
    #[must_use]
    pub fn evaluate(&self, actual: &ConstraintValue) -> bool {
        (self.operator_handler)(actual, &self.value)
    }

    /// Render the constraint as the specification fragment it could have been parsed from.
    #[must_use]
    pub fn to_spec(&self) -> Spec {
        let value = Spec::String(format!("{} {}", self.operator.input_sign(), self.raw_value));
        let Ok(components) = self.expand_name() else {
            return mapping(self.printable_name(), value);
        };
        let mut node = value;
        if let Some(child) = &components.child_name {
            let key = format!("{}.{}", components.name, child);
            if LIST_VALUED_CONSTRAINTS.contains(&key.as_str()) {
                node = Spec::Sequence(vec![node]);
            }
            node = mapping(printable(child), node);
        }
        if let Some(index) = components.peer_index.and_then(|i| usize::try_from(i).ok()) {
            let mut peers = vec![Spec::Mapping(Mapping::new()); index];
            peers.push(node);
            node = Spec::Sequence(peers);
        }
        mapping(printable(&components.name), node)
    }
}

fn printable(name: &str) -> String {
    name.replace('_', "-")
}

fn mapping(key: String, value: Spec) -> Spec {
    let mut mapping = Mapping::new();
    mapping.insert(Spec::String(key), value);
    Spec::Mapping(mapping)
}

fn parse_integer(name: &str, raw_value: &str) -> Result<i64, ParseError> {
    let invalid =
        |reason: &dyn ToString| ParseError::new(name, raw_value).with_reason(reason.to_string());
    let (negative, unsigned) = match raw_value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw_value.strip_prefix('+').unwrap_or(raw_value)),
    };
    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };
    // At most one sign, and only in front of the radix prefix.
    if digits.starts_with(['+', '-']) {
        return Err(invalid(&"unexpected sign"));
    }
    let magnitude = i128::from(u64::from_str_radix(digits, radix).map_err(|e| invalid(&e))?);
    i64::try_from(if negative { -magnitude } else { magnitude }).map_err(|e| invalid(&e))
}

fn parse_flag(name: &str, raw_value: &str) -> Result<bool, ParseError> {
    match raw_value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::new(name, raw_value).with_reason("expected a boolean")),
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.printable_name(), self.operator, self.value)
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("operator", &self.operator)
            .field("value", &self.value)
            .field("raw_value", &self.raw_value)
            .field("unit", &self.unit)
            .field("original_constraint", &self.original_constraint)
            .finish_non_exhaustive()
    }
}

// The handler is derived from the operator and takes no part in equality.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.operator == other.operator
            && self.value == other.value
            && self.raw_value == other.raw_value
            && self.unit == other.unit
            && self.original_constraint == other.original_constraint
    }
}
