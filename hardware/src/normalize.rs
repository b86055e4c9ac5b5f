// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Merging command line requirements into a nested specification.
//!
//! On the command line requirements are given one per option, `name[index].child operator
//! value`:
//!
//! ```text
//! --hardware 'memory >= 8 GiB' --hardware 'disk[0].size >= 40 GiB' --hardware 'cpu.flag = avx'
//! ```
//!
//! which merges into
//!
//! ```yaml
//! memory: '>= 8 GiB'
//! disk:
//!   - size: '>= 40 GiB'
//! cpu:
//!   flag: ['== avx']
//! ```

use crate::constraint::LIST_VALUED_CONSTRAINTS;
use crate::error::{HardwareResult, SpecificationError};
use crate::parse::Spec;
use crate::pattern::ConstraintComponents;
use serde_yaml_ng::Mapping;
use tracing::debug;

/// Dimensions holding a single value, with no properties.
pub const CHILDLESS_CONSTRAINTS: &[&str] = &["arch", "memory", "hostname"];

/// Dimensions describing a list of peers, addressed by index.
pub const INDEXABLE_CONSTRAINTS: &[&str] = &["disk", "network"];

/// Merge command line requirements into a nested specification.
///
/// A requirement given twice keeps the last value, except for list valued properties
/// (`cpu.flag`, `compatible.distro`) which accumulate.
///
/// # Errors
///
/// * [`crate::error::ParseError`] when a requirement does not follow the grammar.
/// * [`SpecificationError`] when a requirement lacks or carries an index or a child property
///   it should not, or when the indices of a dimension are not contiguous from zero.
pub fn normalize_requirements(requirements: &[impl AsRef<str>]) -> HardwareResult<Spec> {
    let mut spec = Mapping::new();
    for raw in requirements {
        let components: ConstraintComponents = raw.as_ref().parse()?;
        let printable = components.name_components().to_string();
        let value = Spec::String(format!("{} {}", components.operator, components.value));
        let name = Spec::String(components.name.clone());

        let index = match (
            components.peer_index,
            INDEXABLE_CONSTRAINTS.contains(&components.name.as_str()),
        ) {
            (None, true) => return Err(SpecificationError::MissingIndex(printable).into()),
            (Some(index), true) => Some(usize::try_from(index).map_err(|_| {
                SpecificationError::InvalidIndex {
                    name: printable.clone(),
                    index,
                }
            })?),
            (Some(_), false) => return Err(SpecificationError::UnexpectedIndex(printable).into()),
            (None, false) => None,
        };

        let childless = CHILDLESS_CONSTRAINTS.contains(&components.name.as_str());
        let child = match (&components.child_name, childless) {
            (Some(_), true) => {
                return Err(SpecificationError::UnexpectedChildName(printable).into());
            }
            (None, false) => return Err(SpecificationError::MissingChildName(printable).into()),
            (Some(child), false) => child.clone(),
            (None, true) => {
                spec.insert(name, value);
                continue;
            }
        };

        let properties = match index {
            Some(index) => {
                let peers = spec
                    .entry(name)
                    .or_insert(Spec::Sequence(Vec::new()))
                    .as_sequence_mut()
                    .unwrap_or_else(|| unreachable!());
                if peers.len() <= index {
                    peers.resize(index + 1, Spec::Mapping(Mapping::new()));
                }
                &mut peers[index]
            }
            None => spec.entry(name).or_insert(Spec::Mapping(Mapping::new())),
        }
        .as_mapping_mut()
        .unwrap_or_else(|| unreachable!());

        let key = format!("{}.{}", components.name, child.replace('-', "_"));
        if LIST_VALUED_CONSTRAINTS.contains(&key.as_str()) {
            properties
                .entry(Spec::String(child))
                .or_insert(Spec::Sequence(Vec::new()))
                .as_sequence_mut()
                .unwrap_or_else(|| unreachable!())
                .push(value);
        } else {
            properties.insert(Spec::String(child), value);
        }
    }

    for dimension in INDEXABLE_CONSTRAINTS {
        let Some(peers) = spec.get(*dimension).and_then(Spec::as_sequence) else {
            continue;
        };
        if let Some(index) = peers
            .iter()
            .position(|peer| peer.as_mapping().is_some_and(Mapping::is_empty))
        {
            return Err(SpecificationError::IndexGap {
                name: (*dimension).to_owned(),
                index,
            }
            .into());
        }
    }

    debug!("normalized {} requirements", requirements.len());
    Ok(Spec::Mapping(spec))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test {
    use super::*;
    use crate::error::HardwareError;
    use pretty_assertions::assert_eq;

    fn yaml(text: &str) -> Spec {
        serde_yaml_ng::from_str(text).unwrap()
    }

    #[test]
    fn merges_into_nested_form() {
        let spec = normalize_requirements(&[
            "memory >= 8 GiB",
            "cpu.processors >= 4",
            "disk[0].size >= 40 GiB",
            "disk[1].size = 1 TB",
            "disk[0].driver ~ virtio.*",
            "cpu.flag = avx",
            "cpu.flag != smep",
        ])
        .unwrap();
        assert_eq!(
            spec,
            yaml(
                r"
                memory: '>= 8 GiB'
                cpu:
                  processors: '>= 4'
                  flag: ['== avx', '!= smep']
                disk:
                  - size: '>= 40 GiB'
                    driver: '~ virtio.*'
                  - size: '== 1 TB'
                "
            )
        );
    }

    #[test]
    fn last_value_wins() {
        let spec = normalize_requirements(&["memory 1 GiB", "memory 2 GiB"]).unwrap();
        assert_eq!(spec, yaml("memory: '== 2 GiB'"));
    }

    #[test]
    fn index_rules() {
        assert_eq!(
            normalize_requirements(&["disk.size 1 GiB"]).unwrap_err(),
            HardwareError::from(SpecificationError::MissingIndex("disk.size".to_string()))
        );
        assert_eq!(
            normalize_requirements(&["cpu[0].cores 2"]).unwrap_err(),
            HardwareError::from(SpecificationError::UnexpectedIndex("cpu[0].cores".to_string()))
        );
        assert_eq!(
            normalize_requirements(&["disk[-1].size 1 GiB"]).unwrap_err(),
            HardwareError::from(SpecificationError::InvalidIndex {
                name: "disk[-1].size".to_string(),
                index: -1
            })
        );
        assert_eq!(
            normalize_requirements(&["disk[0].size 1 GiB", "disk[2].size 1 GiB"]).unwrap_err(),
            HardwareError::from(SpecificationError::IndexGap {
                name: "disk".to_string(),
                index: 1
            })
        );
    }

    #[test]
    fn child_rules() {
        assert_eq!(
            normalize_requirements(&["memory.size 1 GiB"]).unwrap_err(),
            HardwareError::from(SpecificationError::UnexpectedChildName("memory.size".to_string()))
        );
        assert_eq!(
            normalize_requirements(&["cpu 4"]).unwrap_err(),
            HardwareError::from(SpecificationError::MissingChildName("cpu".to_string()))
        );
    }

    #[test]
    fn malformed_requirement() {
        assert!(matches!(
            normalize_requirements(&["Memory 1 GiB"]).unwrap_err(),
            HardwareError::Parse(_)
        ));
    }
}
