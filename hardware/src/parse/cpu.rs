// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::constraint::BaseConstraint;
use crate::error::HardwareResult;
use crate::parse::{Field, Spec, parse_fields};

const CPU_FIELDS: &[Field] = &[
    Field::integer("processors"),
    Field::integer("sockets"),
    Field::integer("cores"),
    Field::integer("threads"),
    Field::integer("cores-per-socket"),
    Field::integer("threads-per-core"),
    Field::integer("model"),
    Field::text("model-name"),
    Field::integer("family"),
    Field::text("family-name"),
    Field::integer("vendor"),
    Field::text("vendor-name"),
    Field::integer("stepping"),
    Field::frequency("frequency"),
    Field::set("flag"),
    Field::flag("hyper-threading"),
];

pub(crate) fn parse_cpu(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("cpu", spec, CPU_FIELDS)
}
