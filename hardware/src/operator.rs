// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Comparison operators and the predicates they stand for.

use crate::value::ConstraintValue;
use regex::Regex;
use std::cmp::Ordering;

/// Binary predicate attached to an [`Operator`].
///
/// The first argument is the value observed on a guest, the second is the value a constraint
/// asks for.
pub type OperatorHandler = fn(&ConstraintValue, &ConstraintValue) -> bool;

/// Operators recognized in hardware requirements.
///
/// [`Operator::Contains`] and [`Operator::NotContains`] cannot be written by users.  They are
/// produced by the parser when equality on a set-like dimension (e.g. `cpu.flag`) really means
/// membership.
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, strum::Display, strum::EnumIter,
)]
#[cfg_attr(any(test, feature = "bolero"), derive(bolero::TypeGenerator))]
pub enum Operator {
    #[strum(to_string = "==")]
    Eq,
    #[strum(to_string = "!=")]
    Neq,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = ">=")]
    Gte,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = "<=")]
    Lte,
    #[strum(to_string = "~")]
    Match,
    #[strum(to_string = "!~")]
    NotMatch,
    #[strum(to_string = "contains")]
    Contains,
    #[strum(to_string = "not contains")]
    NotContains,
}

/// Every sign a user may write, legacy aliases included.
pub const INPUTABLE_SIGNS: &[&str] = &["==", "!=", ">=", ">", "<=", "<", "~", "!~", "=~", "="];

/// Operators meaningful for sizes, counts and versions.
pub const NUMERIC_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Neq,
    Operator::Lt,
    Operator::Lte,
    Operator::Gt,
    Operator::Gte,
];

/// Operators meaningful for free text.
pub const TEXT_OPERATORS: &[Operator] =
    &[Operator::Eq, Operator::Neq, Operator::Match, Operator::NotMatch];

/// Operators meaningful for flags and set membership.
pub const FLAG_OPERATORS: &[Operator] = &[Operator::Eq, Operator::Neq];

impl Operator {
    /// Map a user-written sign to its operator.
    ///
    /// `=` and `=~` are accepted as legacy spellings of `==` and `~`.
    #[must_use]
    pub fn from_sign(sign: &str) -> Option<Operator> {
        Some(match sign {
            "==" | "=" => Operator::Eq,
            "!=" => Operator::Neq,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "~" | "=~" => Operator::Match,
            "!~" => Operator::NotMatch,
            _ => return None,
        })
    }

    /// Whether the operator can appear in user input.
    #[must_use]
    pub fn is_inputable(self) -> bool {
        !matches!(self, Operator::Contains | Operator::NotContains)
    }

    /// The operator that holds exactly when this one does not.
    #[must_use]
    pub fn negated(self) -> Operator {
        match self {
            Operator::Eq => Operator::Neq,
            Operator::Neq => Operator::Eq,
            Operator::Gt => Operator::Lte,
            Operator::Gte => Operator::Lt,
            Operator::Lt => Operator::Gte,
            Operator::Lte => Operator::Gt,
            Operator::Match => Operator::NotMatch,
            Operator::NotMatch => Operator::Match,
            Operator::Contains => Operator::NotContains,
            Operator::NotContains => Operator::Contains,
        }
    }

    /// The sign written back into specifications.
    ///
    /// Membership operators are spelled as the equality they were rewritten from.
    #[must_use]
    pub fn input_sign(self) -> &'static str {
        match self {
            Operator::Eq | Operator::Contains => "==",
            Operator::Neq | Operator::NotContains => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Match => "~",
            Operator::NotMatch => "!~",
        }
    }

    #[must_use]
    pub fn handler(self) -> OperatorHandler {
        match self {
            Operator::Eq => eq,
            Operator::Neq => neq,
            Operator::Gt => gt,
            Operator::Gte => gte,
            Operator::Lt => lt,
            Operator::Lte => lte,
            Operator::Match => search,
            Operator::NotMatch => not_search,
            Operator::Contains => contains,
            Operator::NotContains => not_contains,
        }
    }
}

fn eq(actual: &ConstraintValue, expected: &ConstraintValue) -> bool {
    actual.matches(expected)
}

fn neq(actual: &ConstraintValue, expected: &ConstraintValue) -> bool {
    !eq(actual, expected)
}

fn gt(actual: &ConstraintValue, expected: &ConstraintValue) -> bool {
    actual.compare(expected) == Some(Ordering::Greater)
}

fn gte(actual: &ConstraintValue, expected: &ConstraintValue) -> bool {
    matches!(
        actual.compare(expected),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

fn lt(actual: &ConstraintValue, expected: &ConstraintValue) -> bool {
    actual.compare(expected) == Some(Ordering::Less)
}

fn lte(actual: &ConstraintValue, expected: &ConstraintValue) -> bool {
    matches!(
        actual.compare(expected),
        Some(Ordering::Less | Ordering::Equal)
    )
}

// Unanchored, a pattern may match anywhere in the text.
fn search(actual: &ConstraintValue, pattern: &ConstraintValue) -> bool {
    let (Some(text), Some(pattern)) = (actual.as_text(), pattern.as_text()) else {
        return false;
    };
    Regex::new(pattern).is_ok_and(|re| re.is_match(text))
}

fn not_search(actual: &ConstraintValue, pattern: &ConstraintValue) -> bool {
    !search(actual, pattern)
}

// A scalar haystack is a set of one.
fn contains(haystack: &ConstraintValue, needle: &ConstraintValue) -> bool {
    match haystack {
        ConstraintValue::List(items) => items.iter().any(|item| item.matches(needle)),
        scalar => scalar.matches(needle),
    }
}

fn not_contains(haystack: &ConstraintValue, needle: &ConstraintValue) -> bool {
    !contains(haystack, needle)
}
