// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors
//
// # Hardware requirements

//! The `hardware` crate turns declarative hardware requirements of test guests into typed
//! constraint trees, and answers the questions provisioning backends ask about them.
//!
//! ## Overview
//!
//! A specification names hardware dimensions and the values they should have:
//!
//! ```yaml
//! cpu:
//!   processors: ">= 8"
//!   flag: [avx2]
//! memory: "8 GiB"
//! disk:
//!   - size: ">= 40 GiB"
//! ```
//!
//! Parsing it yields a tree of [`Constraint`] leaves (`cpu.processors >= 8`) grouped by `and` /
//! `or` [`CompoundConstraint`]s.  Backends then
//!
//! - enumerate the variants of the tree, the concrete lists of leaves which satisfy it,
//! - check whether a dimension is used at all,
//! - report the requirements they cannot honor,
//! - or evaluate the tree against the facts observed on a guest.
//!
//! ## Example
//!
//! ```
//! use hwreq_hardware::Hardware;
//!
//! let spec = serde_yaml_ng::from_str("{memory: '>= 8 GiB', cpu: {processors: 4}}").unwrap();
//! let hardware = Hardware::from_spec(spec).unwrap();
//! let variant = hardware.constraint().unwrap().variant().unwrap();
//! assert_eq!(variant.len(), 2);
//! assert!(hardware.uses_constraint("memory"));
//! ```
//!
//! ## Features
//!
//! - `bolero`: Enables fuzzing support for testing.

#![deny(clippy::pedantic, clippy::unwrap_used)]

pub mod constraint;
pub mod error;
pub mod facts;
pub mod hardware;
pub mod normalize;
pub mod operator;
pub mod parse;
pub mod pattern;
pub mod units;
pub mod value;

pub use constraint::{BaseConstraint, CompoundConstraint, CompoundKind, Constraint, Variant};
pub use error::{HardwareError, HardwareResult, ParseError, SpecificationError};
pub use facts::GuestFacts;
pub use hardware::Hardware;
pub use operator::Operator;
pub use parse::{DimensionRegistry, Spec, parse_hw_requirements};
pub use value::ConstraintValue;
