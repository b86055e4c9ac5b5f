// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use crate::constraint::BaseConstraint;
use crate::error::HardwareResult;
use crate::parse::{Field, Spec, parse_peers};

const DISK_FIELDS: &[Field] = &[
    Field::size("size"),
    Field::text("model-name"),
    Field::size("physical-sector-size"),
    Field::size("logical-sector-size"),
    Field::text("driver"),
];

pub(crate) fn parse_disk(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_peers("disk", spec, DISK_FIELDS)
}
