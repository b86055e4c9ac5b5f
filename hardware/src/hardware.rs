// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The [`Hardware`] container.

use crate::constraint::{BaseConstraint, CompoundConstraint, CompoundKind, Constraint};
use crate::error::{HardwareError, HardwareResult, SpecificationError};
use crate::facts::GuestFacts;
use crate::normalize::normalize_requirements;
use crate::parse::{BUILTIN, DimensionRegistry, Spec};
use tracing::{debug, warn};

/// Hardware requirements: a constraint tree and the specification it was parsed from.
///
/// Serializes as the specification it was parsed from and deserializes by parsing it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Spec", into = "Spec")]
pub struct Hardware {
    constraint: Option<BaseConstraint>,
    spec: Spec,
}

fn is_empty(spec: &Spec) -> bool {
    match spec {
        Spec::Null | Spec::Bool(false) => true,
        Spec::String(text) => text.is_empty(),
        Spec::Sequence(items) => items.is_empty(),
        Spec::Mapping(mapping) => mapping.is_empty(),
        _ => false,
    }
}

impl Hardware {
    /// Parse a specification with the built-in dimensions.
    ///
    /// Both the nested mapping form and the command line list form
    /// (`["memory >= 8 GiB", "disk[0].size >= 40 GiB"]`) are accepted.  An empty specification
    /// yields no constraint at all.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError`] if the specification is invalid.
    pub fn from_spec(spec: Spec) -> HardwareResult<Hardware> {
        Self::from_spec_with(spec, &BUILTIN)
    }

    /// Parse a specification with the dimensions of `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError`] if the specification is invalid.
    pub fn from_spec_with(spec: Spec, registry: &DimensionRegistry) -> HardwareResult<Hardware> {
        if is_empty(&spec) {
            return Ok(Hardware {
                constraint: None,
                spec,
            });
        }
        let constraint = match &spec {
            Spec::Sequence(requirements) => {
                let requirements = requirements
                    .iter()
                    .map(|requirement| {
                        requirement.as_str().ok_or_else(|| {
                            HardwareError::from(SpecificationError::InvalidShape {
                                name: "hardware".to_owned(),
                                expected: "a mapping or a list of requirements",
                            })
                        })
                    })
                    .collect::<HardwareResult<Vec<_>>>()?;
                registry.parse(&normalize_requirements(&requirements)?)?
            }
            spec => registry.parse(spec)?,
        };
        debug!("parsed hardware requirements: {constraint}");
        Ok(Hardware {
            constraint: Some(constraint),
            spec,
        })
    }

    /// The constraint tree, if there are any requirements.
    #[must_use]
    pub fn constraint(&self) -> Option<&BaseConstraint> {
        self.constraint.as_ref()
    }

    /// The specification the requirements were parsed from.
    #[must_use]
    pub fn to_spec(&self) -> Spec {
        self.spec.clone()
    }

    #[must_use]
    pub fn to_minimal_spec(&self) -> Spec {
        self.spec.clone()
    }

    /// Require `constraint` on top of the existing requirements.
    ///
    /// The specification is rebuilt from the resulting tree.
    pub fn and(&mut self, constraint: impl Into<BaseConstraint>) {
        let constraint = constraint.into();
        let combined = match self.constraint.take() {
            Some(BaseConstraint::Compound(mut root)) if root.kind() == CompoundKind::And => {
                root.push(constraint);
                BaseConstraint::Compound(root)
            }
            Some(root) => CompoundConstraint::and(vec![root, constraint]).into(),
            None => constraint,
        };
        self.spec = combined.to_spec();
        self.constraint = Some(combined);
    }

    /// Whether any requirement concerns `name`, see [`BaseConstraint::uses_constraint`].
    #[must_use]
    pub fn uses_constraint(&self, name: &str) -> bool {
        self.constraint
            .as_ref()
            .is_some_and(|constraint| constraint.uses_constraint(name))
    }

    /// Whether a guest with the given facts satisfies the requirements.
    #[must_use]
    pub fn matches(&self, facts: &GuestFacts) -> bool {
        self.constraint
            .as_ref()
            .is_none_or(|constraint| constraint.evaluate(facts))
    }

    /// Warn about every requirement a provisioning backend cannot honor.
    ///
    /// A requirement is supported when its dimension (`memory`) or its dimension and property
    /// (`cpu.processors`, `disk.size`) is listed in `names`, or when `check` accepts it.
    /// Returns `true` when every requirement is supported.
    #[must_use]
    pub fn report_support(&self, names: &[&str], check: impl Fn(&Constraint) -> bool) -> bool {
        let unsupported = self.unsupported(names, check);
        for constraint in &unsupported {
            warn!(
                "Hardware requirement '{}' is not supported",
                constraint.printable_name()
            );
        }
        unsupported.is_empty()
    }

    /// The requirements [`Hardware::report_support`] warns about, each listed once, in variant
    /// order.
    #[must_use]
    pub fn unsupported(
        &self,
        names: &[&str],
        check: impl Fn(&Constraint) -> bool,
    ) -> Vec<&Constraint> {
        let mut unsupported: Vec<&Constraint> = Vec::new();
        let Some(root) = &self.constraint else {
            return unsupported;
        };
        for constraint in root.variants().flatten() {
            if unsupported.iter().any(|seen| std::ptr::eq(*seen, constraint))
                || is_named(constraint, names)
                || check(constraint)
            {
                continue;
            }
            unsupported.push(constraint);
        }
        unsupported
    }

    /// One line per constraint of every variant, e.g. `variant #1: memory >= 8 GiB`.
    pub fn format_variants(&self) -> impl Iterator<Item = String> + '_ {
        self.constraint
            .iter()
            .flat_map(BaseConstraint::variants)
            .enumerate()
            .flat_map(|(index, variant)| {
                variant
                    .into_iter()
                    .map(move |constraint| format!("variant #{}: {constraint}", index + 1))
            })
    }
}

fn is_named(constraint: &Constraint, names: &[&str]) -> bool {
    let Ok(components) = constraint.expand_name() else {
        return false;
    };
    let dimension = components.name.replace('_', "-");
    let property = components
        .child_name
        .map(|child| format!("{dimension}.{}", child.replace('_', "-")));
    names
        .iter()
        .any(|name| *name == dimension || property.as_deref() == Some(*name))
}

impl TryFrom<Spec> for Hardware {
    type Error = HardwareError;

    fn try_from(spec: Spec) -> Result<Self, Self::Error> {
        Hardware::from_spec(spec)
    }
}

impl From<Hardware> for Spec {
    fn from(hardware: Hardware) -> Self {
        hardware.spec
    }
}
