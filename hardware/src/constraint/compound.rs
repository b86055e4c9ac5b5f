// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::constraint::BaseConstraint;
use crate::parse::Spec;
use serde_yaml_ng::Mapping;
use std::fmt::{Display, Formatter};

/// How a compound constraint combines its children.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CompoundKind {
    /// Every child must hold.
    And,
    /// At least one child must hold.
    Or,
}

/// An `and`/`or` group of constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundConstraint {
    kind: CompoundKind,
    constraints: Vec<BaseConstraint>,
}

impl CompoundConstraint {
    #[must_use]
    pub fn new(kind: CompoundKind, constraints: Vec<BaseConstraint>) -> Self {
        Self { kind, constraints }
    }

    #[must_use]
    pub fn and(constraints: Vec<BaseConstraint>) -> Self {
        Self::new(CompoundKind::And, constraints)
    }

    #[must_use]
    pub fn or(constraints: Vec<BaseConstraint>) -> Self {
        Self::new(CompoundKind::Or, constraints)
    }

    #[must_use]
    pub fn kind(&self) -> CompoundKind {
        self.kind
    }

    #[must_use]
    pub fn constraints(&self) -> &[BaseConstraint] {
        &self.constraints
    }

    pub fn push(&mut self, constraint: impl Into<BaseConstraint>) {
        self.constraints.push(constraint.into());
    }

    /// Collapse a group holding exactly one child into that child.
    #[must_use]
    pub fn ungroupify(self) -> BaseConstraint {
        if self.constraints.len() == 1 {
            self.constraints
                .into_iter()
                .next()
                .unwrap_or_else(|| unreachable!())
        } else {
            BaseConstraint::Compound(self)
        }
    }

    /// `{and: [...]}` or `{or: [...]}`.
    #[must_use]
    pub fn to_spec(&self) -> Spec {
        let mut mapping = Mapping::new();
        mapping.insert(
            Spec::String(self.kind.to_string()),
            Spec::Sequence(self.constraints.iter().map(BaseConstraint::to_spec).collect()),
        );
        Spec::Mapping(mapping)
    }
}

impl Display for CompoundConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.kind)?;
            }
            write!(f, "{constraint}")?;
        }
        write!(f, ")")
    }
}
