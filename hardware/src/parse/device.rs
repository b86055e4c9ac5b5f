// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Devices: generic PCI devices, GPUs, network interfaces and the system board.

use crate::constraint::BaseConstraint;
use crate::error::HardwareResult;
use crate::parse::{Field, Spec, parse_fields, parse_peers};

const DEVICE_FIELDS: &[Field] = &[
    Field::integer("vendor"),
    Field::text("vendor-name"),
    Field::integer("device"),
    Field::text("device-name"),
    Field::text("driver"),
];

const NETWORK_FIELDS: &[Field] = &[
    Field::text("type"),
    Field::integer("vendor"),
    Field::text("vendor-name"),
    Field::integer("device"),
    Field::text("device-name"),
    Field::text("driver"),
];

const SYSTEM_FIELDS: &[Field] = &[
    Field::integer("vendor"),
    Field::text("vendor-name"),
    Field::integer("model"),
    Field::text("model-name"),
    Field::integer("numa-nodes"),
];

pub(crate) fn parse_device(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("device", spec, DEVICE_FIELDS)
}

pub(crate) fn parse_gpu(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("gpu", spec, DEVICE_FIELDS)
}

pub(crate) fn parse_network(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_peers("network", spec, NETWORK_FIELDS)
}

pub(crate) fn parse_system(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("system", spec, SYSTEM_FIELDS)
}
