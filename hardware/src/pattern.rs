// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Grammar of constraint values, constraint names and full constraint lines.
//!
//! * value: `[operator] value`, e.g. `>= 8 GiB`
//! * name: `name[index].child`, e.g. `disk[1].size`
//! * components: both of the above, e.g. `disk[1].size >= 8 GiB`

use crate::error::ParseError;
use crate::operator::{INPUTABLE_SIGNS, Operator};
use itertools::Itertools;
use regex::{Captures, Regex};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

const NAME_PATTERN: &str =
    r"(?P<name>[a-z_+]+)(?:\[(?P<peer_index>[+-]?\d+)\])?(?:\.(?P<child_name>[a-z0-9_\-]+))?";

/// Alternation of the inputable signs, longest first so that `>=` wins over `>`.
static OPERATOR_PATTERN: LazyLock<String> = LazyLock::new(|| {
    INPUTABLE_SIGNS
        .iter()
        .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
        .map(|sign| regex::escape(sign))
        .join("|")
});

pub(crate) static VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?:(?P<operator>{})\s*)?(?P<value>\S.*?)\s*$",
        *OPERATOR_PATTERN
    ))
    .unwrap_or_else(|_| unreachable!())
});

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{NAME_PATTERN}$")).unwrap_or_else(|_| unreachable!()));

static COMPONENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*{NAME_PATTERN}(?:\s*(?P<operator>{})\s*|\s+)(?P<value>\S.*?)\s*$",
        *OPERATOR_PATTERN
    ))
    .unwrap_or_else(|_| unreachable!())
});

/// Split `[operator] value` into its operator (if any) and trimmed value.
///
/// # Errors
///
/// Returns [`ParseError`] when the text holds no value at all.
pub fn parse_value<'a>(
    constraint_name: &str,
    raw_value: &'a str,
) -> Result<(Option<Operator>, &'a str), ParseError> {
    let captures = VALUE
        .captures(raw_value)
        .ok_or_else(|| ParseError::new(constraint_name, raw_value))?;
    let operator = operator_of(&captures);
    let value = captures.name("value").map_or("", |m| m.as_str());
    Ok((operator, value))
}

fn operator_of(captures: &Captures<'_>) -> Option<Operator> {
    captures
        .name("operator")
        .and_then(|m| Operator::from_sign(m.as_str()))
}

fn peer_index_of(raw: &str, captures: &Captures<'_>) -> Result<Option<i64>, ParseError> {
    captures
        .name("peer_index")
        .map(|m| {
            m.as_str()
                .parse::<i64>()
                .map_err(|e| ParseError::new(raw, raw).with_reason(e))
        })
        .transpose()
}

/// The three parts of a constraint name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ConstraintNameComponents {
    pub name: String,
    pub peer_index: Option<i64>,
    pub child_name: Option<String>,
}

impl FromStr for ConstraintNameComponents {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let captures = NAME
            .captures(raw)
            .ok_or_else(|| ParseError::new(raw, raw).with_reason("not a constraint name"))?;
        Ok(Self {
            name: captures
                .name("name")
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default(),
            peer_index: peer_index_of(raw, &captures)?,
            child_name: captures.name("child_name").map(|m| m.as_str().to_owned()),
        })
    }
}

impl Display for ConstraintNameComponents {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(index) = self.peer_index {
            write!(f, "[{index}]")?;
        }
        if let Some(child) = &self.child_name {
            write!(f, ".{child}")?;
        }
        Ok(())
    }
}

/// A full constraint line, `name[index].child operator value`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstraintComponents {
    pub name: String,
    pub peer_index: Option<i64>,
    pub child_name: Option<String>,
    /// Defaults to [`Operator::Eq`] when the line has none.
    pub operator: Operator,
    pub value: String,
}

impl ConstraintComponents {
    #[must_use]
    pub fn name_components(&self) -> ConstraintNameComponents {
        ConstraintNameComponents {
            name: self.name.clone(),
            peer_index: self.peer_index,
            child_name: self.child_name.clone(),
        }
    }
}

impl FromStr for ConstraintComponents {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let captures = COMPONENTS
            .captures(raw)
            .ok_or_else(|| ParseError::new(raw, raw).with_reason("not a hardware requirement"))?;
        Ok(Self {
            name: captures
                .name("name")
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default(),
            peer_index: peer_index_of(raw, &captures)?,
            child_name: captures.name("child_name").map(|m| m.as_str().to_owned()),
            operator: operator_of(&captures).unwrap_or(Operator::Eq),
            value: captures
                .name("value")
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default(),
        })
    }
}
