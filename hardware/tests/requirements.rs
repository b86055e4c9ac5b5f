// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![allow(clippy::unwrap_used)]

use hwreq_hardware::operator::INPUTABLE_SIGNS;
use hwreq_hardware::pattern::ConstraintNameComponents;
use hwreq_hardware::units::{Quantity, Unit};
use hwreq_hardware::{
    BaseConstraint, ConstraintValue, GuestFacts, Hardware, HardwareError, Operator, Spec,
    SpecificationError, parse_hw_requirements,
};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn yaml(text: &str) -> Spec {
    serde_yaml_ng::from_str(text).unwrap()
}

fn leaves(tree: &BaseConstraint) -> Vec<String> {
    tree.leaves().map(ToString::to_string).collect()
}

const GUEST: &str = r"
cpu:
  processors: '>= 8'
memory: 8 GiB
disk:
  - size: 40 GiB
";

#[test]
fn end_to_end() {
    let spec = yaml(GUEST);
    let hardware = Hardware::from_spec(spec.clone()).unwrap();
    let BaseConstraint::Compound(root) = hardware.constraint().unwrap() else {
        panic!("expected a compound root");
    };
    assert_eq!(root.kind().to_string(), "and");
    assert!(root.constraints().iter().all(BaseConstraint::is_leaf));
    assert_eq!(
        leaves(hardware.constraint().unwrap()),
        vec!["cpu.processors >= 8", "disk[0].size == 40 GiB", "memory == 8 GiB"]
    );

    let variant = hardware.constraint().unwrap().variant().unwrap();
    let names: Vec<String> = variant.iter().map(|c| c.printable_name()).collect();
    assert_eq!(names, vec!["cpu.processors", "disk[0].size", "memory"]);

    assert_eq!(hardware.to_spec(), spec);
    assert_eq!(hardware.to_minimal_spec(), spec);
}

#[test]
fn end_to_end_evaluation() {
    let hardware = Hardware::from_spec(yaml(GUEST)).unwrap();
    let facts = GuestFacts::new()
        .with("cpu.processors", 16_i64)
        .with("memory", Quantity::new(8192.0, Unit::Mebibyte))
        .with("disk[0].size", Quantity::new(40.0, Unit::Gibibyte));
    assert!(hardware.matches(&facts));
    let facts = facts.with("cpu.processors", 4_i64);
    assert!(!hardware.matches(&facts));
}

#[test]
fn round_trip_identity() {
    for text in [
        GUEST,
        "{cpu: {flag: [avx, '!= smep'], cores-per-socket: 2}}",
        "or: [{memory: '< 4 GiB'}, {and: [{arch: x86_64}, {memory: '>= 16 GiB'}]}]",
        "{tpm: {version: '>= 2.0'}, virtualization: {is-virtualized: false}}",
        "['memory >= 8 GiB', 'disk[0].size >= 40 GiB']",
    ] {
        let spec = yaml(text);
        assert_eq!(Hardware::from_spec(spec.clone()).unwrap().to_spec(), spec);
    }
}

#[test]
fn tree_to_spec_reparses() {
    for text in [
        GUEST,
        "{cpu: {flag: [avx, '!= smep']}, compatible: {distro: [rhel-9]}, boot: {method: uefi}}",
        "or: [{memory: '< 4 GiB'}, {network: [{type: eth}, {driver: '~ ^mlx'}]}]",
    ] {
        let tree = parse_hw_requirements(&yaml(text)).unwrap();
        let reparsed = parse_hw_requirements(&tree.to_spec()).unwrap();
        assert_eq!(leaves(&reparsed), leaves(&tree), "{text}");
    }
}

#[test]
fn and_product() {
    let tree = parse_hw_requirements(&yaml(
        r"
        and:
          - or:
              - cpu: {cores: 1}
              - cpu: {cores: 2}
          - or:
              - memory: 1 GiB
              - memory: 2 GiB
              - memory: 4 GiB
          - arch: x86_64
        ",
    ))
    .unwrap();
    let variants: Vec<Vec<String>> = tree
        .variants()
        .map(|variant| variant.iter().map(ToString::to_string).collect())
        .collect();
    assert_eq!(variants.len(), 6);
    for variant in &variants {
        assert_eq!(variant.len(), 3);
        assert!(variant.contains(&"arch == x86_64".to_string()));
        assert_eq!(variant.iter().filter(|c| c.starts_with("cpu.cores")).count(), 1);
        assert_eq!(variant.iter().filter(|c| c.starts_with("memory")).count(), 1);
    }
}

#[test]
fn or_union() {
    let tree = parse_hw_requirements(&yaml(
        "or: [{memory: 1 GiB}, {memory: 2 GiB}, {memory: 4 GiB}]",
    ))
    .unwrap();
    let variants: Vec<_> = tree.variants().collect();
    assert_eq!(variants.len(), 3);
    assert!(variants.iter().all(|variant| variant.len() == 1));
}

#[test]
fn empty_or_blocks_every_variant() {
    let tree = parse_hw_requirements(&yaml("and: [{arch: x86_64}, {or: []}]")).unwrap();
    assert_eq!(tree.variants().count(), 0);
    assert!(matches!(tree.variant(), Err(HardwareError::General(_))));
}

#[test]
fn flag_rewrite() {
    let tree = parse_hw_requirements(&yaml("cpu: {flag: [avx, '= avx2', '!= smep']}")).unwrap();
    let operators: Vec<Operator> = tree.leaves().map(|c| c.operator()).collect();
    assert_eq!(
        operators,
        vec![Operator::Contains, Operator::Contains, Operator::NotContains]
    );
    let originals: Vec<Operator> = tree
        .leaves()
        .map(|c| c.original_constraint().unwrap().operator())
        .collect();
    assert_eq!(operators.len(), originals.len());
    assert_eq!(originals, vec![Operator::Eq, Operator::Eq, Operator::Neq]);
}

#[test]
fn unit_strictness() {
    let bare = parse_hw_requirements(&yaml("memory: '8'")).unwrap();
    let BaseConstraint::Leaf(bare) = bare else {
        panic!("expected a leaf");
    };
    assert_eq!(
        bare.value(),
        &ConstraintValue::Quantity(Quantity::new(8.0, Unit::Byte))
    );
    let sized = parse_hw_requirements(&yaml("memory: 8 GiB")).unwrap();
    let BaseConstraint::Leaf(sized) = sized else {
        panic!("expected a leaf");
    };
    assert!(sized.evaluate(&ConstraintValue::Integer(8 * 1024 * 1024 * 1024)));
    assert!(!bare.evaluate(&ConstraintValue::Quantity(Quantity::new(8.0, Unit::Gigabyte))));
}

#[test]
fn unsupported_operator() {
    let e = Hardware::from_spec(yaml("tpm: {version: '~ 2.0'}")).unwrap_err();
    assert_eq!(
        e,
        HardwareError::Specification(SpecificationError::UnsupportedOperator {
            name: "tpm.version".to_string(),
            operator: Operator::Match,
        })
    );
    assert!(e.to_string().contains("tpm.version"));
    assert!(e.to_string().contains('~'));
}

#[test]
fn name_decomposition() {
    for (raw, name, peer_index, child_name) in [
        ("disk[1].size", "disk", Some(1), Some("size")),
        ("memory", "memory", None, None),
        ("cpu.processors", "cpu", None, Some("processors")),
    ] {
        let components: ConstraintNameComponents = raw.parse().unwrap();
        assert_eq!(components.name, name);
        assert_eq!(components.peer_index, peer_index);
        assert_eq!(components.child_name.as_deref(), child_name);
        assert_eq!(components.to_string(), raw);
    }
}

#[test]
fn operator_coverage() {
    bolero::check!()
        .with_type::<u16>()
        .cloned()
        .for_each(|value| {
            for sign in INPUTABLE_SIGNS {
                let operator = Operator::from_sign(sign).unwrap();
                let spec = match operator {
                    Operator::Match | Operator::NotMatch => format!("hostname: '{sign} {value}'"),
                    _ => format!("cpu: {{processors: '{sign} {value}'}}"),
                };
                let tree = parse_hw_requirements(&yaml(&spec)).unwrap();
                let BaseConstraint::Leaf(leaf) = tree else {
                    panic!("expected a leaf");
                };
                assert_eq!(leaf.operator(), operator);
                assert_eq!(leaf.raw_value(), value.to_string());
                let actual = match operator {
                    Operator::Match | Operator::NotMatch => ConstraintValue::from(value.to_string()),
                    _ => ConstraintValue::from(i64::from(value)),
                };
                let expected = !matches!(
                    operator,
                    Operator::Neq | Operator::Gt | Operator::Lt | Operator::NotMatch
                );
                assert_eq!(leaf.evaluate(&actual), expected, "{sign} {value}");
            }
        });
}

#[test]
#[traced_test]
fn report_support() {
    let hardware = Hardware::from_spec(yaml(
        r"
        cpu:
          processors: '>= 8'
          flag: [avx2]
        memory: 8 GiB
        tpm:
          version: '>= 2.0'
        ",
    ))
    .unwrap();
    let supported = hardware.report_support(&["memory", "cpu.processors"], |constraint| {
        constraint.printable_name() == "tpm.version"
    });
    assert!(!supported);
    assert!(logs_contain("Hardware requirement 'cpu.flag' is not supported"));
    assert!(!logs_contain("'memory' is not supported"));
    assert!(!logs_contain("'tpm.version' is not supported"));
}

#[test]
fn cli_requirements_combine() {
    let mut hardware = Hardware::from_spec(yaml("memory: '>= 4 GiB'")).unwrap();
    assert!(hardware.uses_constraint("memory"));
    assert!(!hardware.uses_constraint("cpu"));
    let extra = Hardware::from_spec(yaml("['cpu.processors >= 2']")).unwrap();
    hardware.and(extra.constraint().unwrap().clone());
    assert!(hardware.uses_constraint("cpu.processors"));
    assert_eq!(
        hardware.to_spec(),
        yaml("and: [{memory: '>= 4 GiB'}, {cpu: {processors: '>= 2'}}]")
    );
    assert_eq!(
        hardware.format_variants().collect::<Vec<_>>(),
        vec![
            "variant #1: memory >= 4 GiB",
            "variant #1: cpu.processors >= 2",
        ]
    );
}
