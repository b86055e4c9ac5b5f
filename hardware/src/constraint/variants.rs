// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Expansion of a constraint tree into variants.
//!
//! A variant is a list of leaf constraints which, all holding at once, satisfy the whole tree.
//! A leaf is its own single variant, an `or` is the union of its children's variants and an
//! `and` is the cartesian product of its compound children's variants, each combination
//! carrying the `and`'s direct leaves along.
//!
//! Enumeration never mutates the tree and restarts from scratch on every call.

use crate::constraint::{BaseConstraint, CompoundConstraint, CompoundKind, Constraint};
use crate::error::{HardwareError, HardwareResult};
use itertools::{Either, Itertools};
use std::iter;

/// One way of satisfying a tree.
pub type Variant<'a> = Vec<&'a Constraint>;

/// Iterator over every [`Variant`] of a tree.
pub type Variants<'a> = Box<dyn Iterator<Item = Variant<'a>> + 'a>;

impl BaseConstraint {
    /// Enumerate every variant of the tree.
    #[must_use]
    pub fn variants(&self) -> Variants<'_> {
        self.variants_with(Vec::new())
    }

    /// Enumerate every variant of the tree, each prefixed with `members`.
    #[must_use]
    pub fn variants_with<'a>(&'a self, members: Variant<'a>) -> Variants<'a> {
        match self {
            BaseConstraint::Leaf(constraint) => constraint.variants_with(members),
            BaseConstraint::Compound(compound) => compound.variants_with(members),
        }
    }

    /// A representative variant, the first one enumerated.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::General`] if the tree has no variant at all.
    pub fn variant(&self) -> HardwareResult<Variant<'_>> {
        self.variants()
            .next()
            .ok_or_else(|| HardwareError::General(format!("No variant satisfies '{self}'")))
    }
}

impl Constraint {
    #[must_use]
    pub fn variants_with<'a>(&'a self, mut members: Variant<'a>) -> Variants<'a> {
        members.push(self);
        Box::new(iter::once(members))
    }
}

impl CompoundConstraint {
    #[must_use]
    pub fn variants_with<'a>(&'a self, members: Variant<'a>) -> Variants<'a> {
        match self.kind() {
            CompoundKind::Or => Box::new(
                self.constraints()
                    .iter()
                    .flat_map(move |child| child.variants_with(members.clone())),
            ),
            CompoundKind::And => {
                let (simple, compound): (Vec<&Constraint>, Vec<&CompoundConstraint>) =
                    self.constraints().iter().partition_map(|child| match child {
                        BaseConstraint::Leaf(leaf) => Either::Left(leaf),
                        BaseConstraint::Compound(compound) => Either::Right(compound),
                    });
                let mut members = members;
                members.extend(simple);
                if compound.is_empty() {
                    return Box::new(iter::once(members));
                }
                // Products need to revisit their factors, so each factor is collected.
                let factors: Vec<Vec<Variant<'a>>> = compound
                    .into_iter()
                    .map(|child| child.variants_with(Vec::new()).collect())
                    .collect();
                Box::new(
                    factors
                        .into_iter()
                        .multi_cartesian_product()
                        .map(move |combination| {
                            let mut variant = members.clone();
                            variant.extend(combination.into_iter().flatten());
                            variant
                        }),
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::constraint::ValueKind;
    use crate::operator::NUMERIC_OPERATORS;
    use pretty_assertions::assert_eq;

    fn leaf(name: &str, value: &str) -> BaseConstraint {
        Constraint::from_specification(name, value, ValueKind::Integer, NUMERIC_OPERATORS)
            .unwrap()
            .into()
    }

    fn names(variant: &Variant<'_>) -> Vec<String> {
        variant.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn leaf_is_its_own_variant() {
        let tree = leaf("cpu.processors", ">= 8");
        let variants: Vec<_> = tree.variants().map(|v| names(&v)).collect();
        assert_eq!(variants, vec![vec!["cpu.processors >= 8".to_string()]]);
    }

    #[test]
    fn and_without_compound_children_is_one_variant() {
        let tree: BaseConstraint = CompoundConstraint::and(vec![
            leaf("cpu.processors", ">= 8"),
            leaf("cpu.cores", "4"),
        ])
        .into();
        assert_eq!(tree.variants().count(), 1);
        assert_eq!(tree.variant().unwrap().len(), 2);
    }

    #[test]
    fn or_is_a_union() {
        let tree: BaseConstraint = CompoundConstraint::or(vec![
            leaf("cpu.processors", "1"),
            leaf("cpu.processors", "2"),
            leaf("cpu.processors", "3"),
        ])
        .into();
        let variants: Vec<_> = tree.variants().map(|v| names(&v)).collect();
        assert_eq!(
            variants,
            vec![
                vec!["cpu.processors == 1".to_string()],
                vec!["cpu.processors == 2".to_string()],
                vec!["cpu.processors == 3".to_string()],
            ]
        );
    }

    #[test]
    fn and_is_a_product() {
        let tree: BaseConstraint = CompoundConstraint::and(vec![
            CompoundConstraint::or(vec![leaf("cpu.cores", "1"), leaf("cpu.cores", "2")]).into(),
            CompoundConstraint::or(vec![
                leaf("cpu.threads", "1"),
                leaf("cpu.threads", "2"),
                leaf("cpu.threads", "3"),
            ])
            .into(),
            leaf("cpu.sockets", "1"),
        ])
        .into();
        let variants: Vec<_> = tree.variants().map(|v| names(&v)).collect();
        assert_eq!(variants.len(), 6);
        for variant in &variants {
            assert_eq!(variant.len(), 3);
            assert!(variant.contains(&"cpu.sockets == 1".to_string()));
            assert_eq!(variant.iter().filter(|c| c.starts_with("cpu.cores")).count(), 1);
            assert_eq!(variant.iter().filter(|c| c.starts_with("cpu.threads")).count(), 1);
        }
        assert_eq!(variants.iter().unique().count(), 6);
    }

    #[test]
    fn nested_or_inside_and_inside_or() {
        let tree: BaseConstraint = CompoundConstraint::or(vec![
            leaf("cpu.cores", "1"),
            CompoundConstraint::and(vec![
                leaf("cpu.sockets", "2"),
                CompoundConstraint::or(vec![leaf("cpu.threads", "1"), leaf("cpu.threads", "2")])
                    .into(),
            ])
            .into(),
        ])
        .into();
        let variants: Vec<_> = tree.variants().map(|v| names(&v)).collect();
        assert_eq!(
            variants,
            vec![
                vec!["cpu.cores == 1".to_string()],
                vec!["cpu.sockets == 2".to_string(), "cpu.threads == 1".to_string()],
                vec!["cpu.sockets == 2".to_string(), "cpu.threads == 2".to_string()],
            ]
        );
    }

    #[test]
    fn enumeration_restarts() {
        let tree: BaseConstraint =
            CompoundConstraint::or(vec![leaf("cpu.cores", "1"), leaf("cpu.cores", "2")]).into();
        let first: Vec<_> = tree.variants().collect();
        let second: Vec<_> = tree.variants().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_tree_has_no_representative() {
        let tree: BaseConstraint = CompoundConstraint::or(vec![]).into();
        assert!(matches!(tree.variant(), Err(HardwareError::General(_))));
    }

    #[test]
    fn and_with_an_unsatisfiable_member_has_no_variant() {
        let tree: BaseConstraint = CompoundConstraint::and(vec![
            leaf("cpu.sockets", "1"),
            CompoundConstraint::or(vec![]).into(),
        ])
        .into();
        assert_eq!(tree.variants().count(), 0);
        assert!(matches!(tree.variant(), Err(HardwareError::General(_))));
    }
}
