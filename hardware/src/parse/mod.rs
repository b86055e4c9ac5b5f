// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Turning hardware specifications into constraint trees.
//!
//! A specification is a nested mapping keyed by dimension:
//!
//! ```yaml
//! cpu:
//!   processors: ">= 8"
//! memory: "8 GiB"
//! disk:
//!   - size: "40 GiB"
//! ```
//!
//! Any mapping may instead be an `and` or `or` block holding a list of specifications.  Each
//! dimension is handled by a parser registered in a [`DimensionRegistry`].

mod cpu;
mod device;
mod platform;
mod storage;

use crate::constraint::{BaseConstraint, CompoundConstraint, CompoundKind, Constraint, ValueKind};
use crate::error::{HardwareError, HardwareResult, SpecificationError};
use crate::operator::{FLAG_OPERATORS, NUMERIC_OPERATORS, Operator, TEXT_OPERATORS};
use serde_yaml_ng::Mapping;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

/// A raw hardware specification, as loaded from YAML or JSON.
pub type Spec = serde_yaml_ng::Value;

/// Parses the value found under a dimension key.
pub type DimensionParser = fn(&Spec) -> HardwareResult<BaseConstraint>;

/// The dimensions known to the engine and how to parse each of them.
///
/// Dimensions are visited in alphabetical order, which makes the resulting trees deterministic.
#[derive(Clone, Debug, Default)]
pub struct DimensionRegistry {
    parsers: BTreeMap<String, DimensionParser>,
}

/// Registry of every dimension the engine supports out of the box.
pub static BUILTIN: LazyLock<DimensionRegistry> = LazyLock::new(DimensionRegistry::builtin);

impl DimensionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in dimensions.
    #[must_use]
    pub fn builtin() -> Self {
        let builtin: [(&str, DimensionParser); 17] = [
            ("arch", platform::parse_arch),
            ("beaker", platform::parse_beaker),
            ("boot", platform::parse_boot),
            ("compatible", platform::parse_compatible),
            ("cpu", cpu::parse_cpu),
            ("device", device::parse_device),
            ("disk", storage::parse_disk),
            ("gpu", device::parse_gpu),
            ("hostname", platform::parse_hostname),
            ("iommu", platform::parse_iommu),
            ("location", platform::parse_location),
            ("memory", platform::parse_memory),
            ("network", device::parse_network),
            ("system", device::parse_system),
            ("tpm", platform::parse_tpm),
            ("virtualization", platform::parse_virtualization),
            ("zcrypt", platform::parse_zcrypt),
        ];
        Self {
            parsers: builtin
                .into_iter()
                .map(|(key, parser)| (key.to_owned(), parser))
                .collect(),
        }
    }

    /// Add a dimension.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::General`] if the dimension is already registered.
    pub fn register(&mut self, key: impl Into<String>, parser: DimensionParser) -> HardwareResult<()> {
        let key = key.into();
        if self.parsers.contains_key(&key) {
            return Err(HardwareError::General(format!(
                "Dimension '{key}' is already registered"
            )));
        }
        self.parsers.insert(key, parser);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.parsers.contains_key(key)
    }

    /// Names of the registered dimensions, in visiting order.
    #[must_use]
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Parse a specification into a constraint tree.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError`] describing the first problem found.
    pub fn parse(&self, spec: &Spec) -> HardwareResult<BaseConstraint> {
        let mapping = as_mapping("hardware", spec)?;
        for (keyword, kind) in [("and", CompoundKind::And), ("or", CompoundKind::Or)] {
            let Some(blocks) = mapping.get(keyword) else {
                continue;
            };
            if mapping.len() != 1 {
                return Err(SpecificationError::MixedBlock(keyword).into());
            }
            let constraints = as_sequence(keyword, blocks)?
                .iter()
                .map(|block| self.parse(block))
                .collect::<HardwareResult<Vec<_>>>()?;
            trace!("parsed '{keyword}' block of {} members", constraints.len());
            return Ok(CompoundConstraint::new(kind, constraints).ungroupify());
        }
        for key in mapping.keys() {
            let key = key_of("hardware", key)?;
            if !self.contains(key) {
                return Err(SpecificationError::UnknownDimension(key.to_owned()).into());
            }
        }
        let mut constraints = Vec::new();
        for (key, parser) in &self.parsers {
            if let Some(value) = mapping.get(key.as_str()) {
                constraints.push(parser(value)?);
            }
        }
        Ok(group(constraints))
    }
}

/// Parse a specification with the built-in dimensions.
///
/// # Errors
///
/// Returns [`HardwareError`] describing the first problem found.
pub fn parse_hw_requirements(spec: &Spec) -> HardwareResult<BaseConstraint> {
    BUILTIN.parse(spec)
}

/// `and` the constraints, collapsing a single one.
pub(crate) fn group(constraints: Vec<BaseConstraint>) -> BaseConstraint {
    CompoundConstraint::and(constraints).ungroupify()
}

pub(crate) fn as_mapping<'a>(name: &str, spec: &'a Spec) -> HardwareResult<&'a Mapping> {
    spec.as_mapping().ok_or_else(|| {
        SpecificationError::InvalidShape {
            name: name.to_owned(),
            expected: "a mapping",
        }
        .into()
    })
}

pub(crate) fn as_sequence<'a>(name: &str, spec: &'a Spec) -> HardwareResult<&'a [Spec]> {
    spec.as_sequence().map(Vec::as_slice).ok_or_else(|| {
        SpecificationError::InvalidShape {
            name: name.to_owned(),
            expected: "a list",
        }
        .into()
    })
}

fn key_of<'a>(name: &str, key: &'a Spec) -> HardwareResult<&'a str> {
    key.as_str().ok_or_else(|| {
        SpecificationError::InvalidShape {
            name: name.to_owned(),
            expected: "keyed by strings",
        }
        .into()
    })
}

/// The textual form of a scalar value.
pub(crate) fn raw_value(name: &str, spec: &Spec) -> HardwareResult<String> {
    match spec {
        Spec::String(text) => Ok(text.clone()),
        Spec::Number(number) => Ok(number.to_string()),
        Spec::Bool(flag) => Ok(flag.to_string()),
        _ => Err(SpecificationError::InvalidShape {
            name: name.replace('_', "-"),
            expected: "a scalar value",
        }
        .into()),
    }
}

/// A property of a dimension and how to parse it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Field {
    pub key: &'static str,
    pub kind: ValueKind,
    pub operators: &'static [Operator],
    /// Equality means membership, and a list of values is accepted.
    pub membership: bool,
}

impl Field {
    const fn new(key: &'static str, kind: ValueKind, operators: &'static [Operator]) -> Field {
        Field {
            key,
            kind,
            operators,
            membership: false,
        }
    }

    pub const fn integer(key: &'static str) -> Field {
        Field::new(key, ValueKind::Integer, NUMERIC_OPERATORS)
    }

    pub const fn size(key: &'static str) -> Field {
        Field::new(key, ValueKind::SIZE, NUMERIC_OPERATORS)
    }

    pub const fn frequency(key: &'static str) -> Field {
        Field::new(key, ValueKind::FREQUENCY, NUMERIC_OPERATORS)
    }

    pub const fn text(key: &'static str) -> Field {
        Field::new(key, ValueKind::Text, TEXT_OPERATORS)
    }

    /// Text compared as a version, e.g. `tpm.version >= 2.0`.
    pub const fn version(key: &'static str) -> Field {
        Field::new(key, ValueKind::Text, NUMERIC_OPERATORS)
    }

    pub const fn flag(key: &'static str) -> Field {
        Field::new(key, ValueKind::Flag, FLAG_OPERATORS)
    }

    pub const fn set(key: &'static str) -> Field {
        Field {
            key,
            kind: ValueKind::Text,
            operators: FLAG_OPERATORS,
            membership: true,
        }
    }

    fn constraint(&self, name: &str, value: &Spec) -> HardwareResult<Constraint> {
        let constraint = Constraint::from_specification(
            name,
            &raw_value(name, value)?,
            self.kind,
            self.operators,
        )?;
        Ok(if self.membership {
            constraint.into_membership()
        } else {
            constraint
        })
    }

    /// Parse the value of this field into one or more constraints named `name`.
    pub fn parse(&self, name: &str, value: &Spec) -> HardwareResult<Vec<BaseConstraint>> {
        match value {
            Spec::Sequence(values) if self.membership => values
                .iter()
                .map(|value| self.constraint(name, value).map(BaseConstraint::from))
                .collect(),
            value => Ok(vec![self.constraint(name, value)?.into()]),
        }
    }
}

/// Parse a mapping of properties of `prefix` (`cpu`, `disk[0]`) against a field table.
///
/// Properties are visited in the order they were written.  Underscores and dashes are
/// interchangeable in property names.
pub(crate) fn parse_fields(
    prefix: &str,
    spec: &Spec,
    fields: &[Field],
) -> HardwareResult<BaseConstraint> {
    let mut constraints = Vec::new();
    for (key, value) in as_mapping(prefix, spec)? {
        let key = key_of(prefix, key)?;
        let property = key.replace('_', "-");
        let field = fields
            .iter()
            .find(|field| field.key == property)
            .ok_or_else(|| SpecificationError::UnknownProperty {
                name: prefix.to_owned(),
                property: key.to_owned(),
            })?;
        let name = format!("{prefix}.{}", field.key.replace('-', "_"));
        constraints.extend(field.parse(&name, value)?);
    }
    Ok(group(constraints))
}

/// Parse a dimension holding a single value, like `memory`.
pub(crate) fn parse_scalar(name: &str, spec: &Spec, field: Field) -> HardwareResult<BaseConstraint> {
    Ok(group(field.parse(name, spec)?))
}

/// Parse a list of peers (`disk`, `network`), each entry indexed by its position.
pub(crate) fn parse_peers(
    name: &str,
    spec: &Spec,
    fields: &[Field],
) -> HardwareResult<BaseConstraint> {
    let Some(peers) = spec.as_sequence() else {
        return Err(SpecificationError::InvalidShape {
            name: name.to_owned(),
            expected: "a list of mappings, one per entity, e.g. '- size: 40 GiB'",
        }
        .into());
    };
    let constraints = peers
        .iter()
        .enumerate()
        .map(|(index, peer)| parse_fields(&format!("{name}[{index}]"), peer, fields))
        .collect::<HardwareResult<Vec<_>>>()?;
    Ok(group(constraints))
}
