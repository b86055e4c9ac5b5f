// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The constraint tree.
//!
//! A tree is made of [`Constraint`] leaves grouped by [`CompoundConstraint`]s.

mod compound;
mod leaf;
mod variants;

pub use compound::{CompoundConstraint, CompoundKind};
pub use leaf::{Constraint, LIST_VALUED_CONSTRAINTS, MEMBERSHIP_CONSTRAINTS, ValueKind};
pub use variants::{Variant, Variants};

use crate::facts::GuestFacts;
use crate::parse::Spec;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// A node of the constraint tree.
#[derive(Clone, Debug, PartialEq, strum::EnumIs)]
pub enum BaseConstraint {
    Leaf(Constraint),
    Compound(CompoundConstraint),
}

impl BaseConstraint {
    /// Every leaf of the tree, depth first.
    #[must_use]
    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Constraint> + '_> {
        match self {
            BaseConstraint::Leaf(constraint) => Box::new(std::iter::once(constraint)),
            BaseConstraint::Compound(compound) => {
                Box::new(compound.constraints().iter().flat_map(BaseConstraint::leaves))
            }
        }
    }

    /// Whether any leaf of the tree concerns `name`.
    ///
    /// `name` is either a dimension (`memory`, `disk`) or a full printable name
    /// (`cpu.processors`, `disk[0].size`).
    #[must_use]
    pub fn uses_constraint(&self, name: &str) -> bool {
        for constraint in self.leaves() {
            let printable = constraint.printable_name();
            let dimension = constraint
                .expand_name()
                .map(|components| components.name)
                .unwrap_or_default();
            if dimension == name || printable == name {
                debug!("{name} is used by '{constraint}'");
                return true;
            }
        }
        debug!("{name} is not used by '{self}'");
        false
    }

    /// Check the tree against the facts observed on a guest.
    ///
    /// A leaf without a matching fact does not hold.
    #[must_use]
    pub fn evaluate(&self, facts: &GuestFacts) -> bool {
        match self {
            BaseConstraint::Leaf(constraint) => facts
                .get(&constraint.printable_name())
                .is_some_and(|actual| constraint.evaluate(actual)),
            BaseConstraint::Compound(compound) => {
                let mut children = compound.constraints().iter();
                match compound.kind() {
                    CompoundKind::And => children.all(|child| child.evaluate(facts)),
                    CompoundKind::Or => children.any(|child| child.evaluate(facts)),
                }
            }
        }
    }

    /// Render the tree as a specification.
    #[must_use]
    pub fn to_spec(&self) -> Spec {
        match self {
            BaseConstraint::Leaf(constraint) => constraint.to_spec(),
            BaseConstraint::Compound(compound) => compound.to_spec(),
        }
    }
}

impl From<Constraint> for BaseConstraint {
    fn from(value: Constraint) -> Self {
        BaseConstraint::Leaf(value)
    }
}

impl From<CompoundConstraint> for BaseConstraint {
    fn from(value: CompoundConstraint) -> Self {
        BaseConstraint::Compound(value)
    }
}

impl Display for BaseConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BaseConstraint::Leaf(constraint) => write!(f, "{constraint}"),
            BaseConstraint::Compound(compound) => write!(f, "{compound}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::operator::{FLAG_OPERATORS, NUMERIC_OPERATORS};
    use crate::units::parse_quantity;
    use tracing_test::traced_test;

    fn tree() -> BaseConstraint {
        let processors = Constraint::from_specification(
            "cpu.processors",
            ">= 8",
            ValueKind::Integer,
            NUMERIC_OPERATORS,
        )
        .unwrap();
        let flag = Constraint::from_specification("cpu.flag", "avx2", ValueKind::Text, FLAG_OPERATORS)
            .unwrap()
            .into_membership();
        let small = Constraint::from_specification("memory", "< 4 GiB", ValueKind::SIZE, NUMERIC_OPERATORS)
            .unwrap();
        let large = Constraint::from_specification("memory", ">= 16 GiB", ValueKind::SIZE, NUMERIC_OPERATORS)
            .unwrap();
        CompoundConstraint::and(vec![
            processors.into(),
            flag.into(),
            CompoundConstraint::or(vec![small.into(), large.into()]).into(),
        ])
        .into()
    }

    #[test]
    fn display() {
        assert_eq!(
            tree().to_string(),
            "(cpu.processors >= 8 and cpu.flag contains avx2 and (memory < 4 GiB or memory >= 16 GiB))"
        );
    }

    #[test]
    #[traced_test]
    fn uses_constraint() {
        let tree = tree();
        assert!(tree.uses_constraint("memory"));
        assert!(tree.uses_constraint("cpu"));
        assert!(tree.uses_constraint("cpu.processors"));
        assert!(!tree.uses_constraint("cpu.cores"));
        assert!(!tree.uses_constraint("disk"));
        assert!(logs_contain("disk is not used by"));
    }

    #[test]
    fn evaluate() {
        let tree = tree();
        let facts = GuestFacts::new()
            .with("cpu.processors", 16_i64)
            .with("cpu.flag", ["avx", "avx2"].into_iter().collect::<crate::value::ConstraintValue>())
            .with("memory", parse_quantity("32 GiB", None).unwrap());
        assert!(tree.evaluate(&facts));

        let facts = facts.with("memory", parse_quantity("8 GiB", None).unwrap());
        assert!(!tree.evaluate(&facts));

        let facts = GuestFacts::new().with("cpu.processors", 16_i64);
        assert!(!tree.evaluate(&facts));
    }

    #[test]
    fn empty_groups() {
        let facts = GuestFacts::new();
        assert!(BaseConstraint::from(CompoundConstraint::and(vec![])).evaluate(&facts));
        assert!(!BaseConstraint::from(CompoundConstraint::or(vec![])).evaluate(&facts));
    }

    #[test]
    fn ungroupify() {
        let leaf = Constraint::from_specification("memory", "8 GiB", ValueKind::SIZE, NUMERIC_OPERATORS)
            .unwrap();
        let single = CompoundConstraint::and(vec![leaf.clone().into()]).ungroupify();
        assert_eq!(single, BaseConstraint::Leaf(leaf.clone()));
        let pair = CompoundConstraint::or(vec![leaf.clone().into(), leaf.into()]).ungroupify();
        assert!(pair.is_compound());
    }
}
