// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Dimensions describing the machine as a whole rather than one of its components.

use crate::constraint::BaseConstraint;
use crate::error::HardwareResult;
use crate::parse::{Field, Spec, parse_fields, parse_scalar};

const BEAKER_FIELDS: &[Field] = &[Field::text("pool")];
const BOOT_FIELDS: &[Field] = &[Field::set("method")];
const COMPATIBLE_FIELDS: &[Field] = &[Field::set("distro")];
const IOMMU_FIELDS: &[Field] = &[Field::flag("is-supported"), Field::text("model-name")];
const LOCATION_FIELDS: &[Field] = &[Field::text("lab-controller")];
const TPM_FIELDS: &[Field] = &[Field::version("version")];
const VIRTUALIZATION_FIELDS: &[Field] = &[
    Field::flag("is-virtualized"),
    Field::flag("is-supported"),
    Field::text("hypervisor"),
];
const ZCRYPT_FIELDS: &[Field] = &[Field::text("adapter"), Field::text("mode")];

pub(crate) fn parse_arch(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_scalar("arch", spec, Field::text("arch"))
}

pub(crate) fn parse_hostname(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_scalar("hostname", spec, Field::text("hostname"))
}

pub(crate) fn parse_memory(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_scalar("memory", spec, Field::size("memory"))
}

pub(crate) fn parse_beaker(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("beaker", spec, BEAKER_FIELDS)
}

pub(crate) fn parse_boot(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("boot", spec, BOOT_FIELDS)
}

pub(crate) fn parse_compatible(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("compatible", spec, COMPATIBLE_FIELDS)
}

pub(crate) fn parse_iommu(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("iommu", spec, IOMMU_FIELDS)
}

pub(crate) fn parse_location(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("location", spec, LOCATION_FIELDS)
}

pub(crate) fn parse_tpm(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("tpm", spec, TPM_FIELDS)
}

pub(crate) fn parse_virtualization(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("virtualization", spec, VIRTUALIZATION_FIELDS)
}

pub(crate) fn parse_zcrypt(spec: &Spec) -> HardwareResult<BaseConstraint> {
    parse_fields("zcrypt", spec, ZCRYPT_FIELDS)
}
