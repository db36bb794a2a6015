//! Property tests using proptest

use super::*;
use crate::middle::ir::{RegClass, TestCond, Tmp, TmpId, Width};
use crate::middle::passes::{PassKind, Pipeline};
use proptest::prelude::*;
use std::collections::HashSet;

fn operand_strategy() -> impl Strategy<Value = Operand> {
    prop_oneof![
        (0u8..6).prop_map(|n| reg(&format!("t{}", n))),
        prop_oneof![Just(-1i64), Just(0), Just(1), any::<i64>()].prop_map(imm),
        "\\.[a-z]{1,6}".prop_map(|s| label(&s)),
        (0u32..8, any::<bool>()).prop_map(|(id, gpr)| {
            Operand::tmp(Tmp {
                id: TmpId(id),
                class: if gpr { RegClass::Gpr } else { RegClass::Fpr },
                origin: origin(1),
            })
        }),
    ]
}

/// Every temporary id named in `nodes`
fn tmp_ids(nodes: &[Node]) -> HashSet<TmpId> {
    nodes
        .iter()
        .filter_map(Node::as_instruction)
        .flat_map(|inst| inst.operands.iter().filter_map(Operand::as_tmp))
        .map(|tmp| tmp.id)
        .collect()
}

fn mnemonic_strategy() -> impl Strategy<Value = String> {
    let bit_test = (
        any::<bool>(),
        prop::sample::select(Width::ALL.to_vec()),
        prop::sample::select(TestCond::ALL.to_vec()),
    )
        .prop_map(|(branch, w, c)| {
            format!("{}{}{}", if branch { "bt" } else { "t" }, w.suffix(), c.suffix())
        });
    prop_oneof![
        Just("noti".to_string()),
        Just("notp".to_string()),
        Just("bmulio".to_string()),
        bit_test,
        prop::sample::select(vec!["addi", "loadp", "storei", "jmp", "bieq", "andp", "notq"])
            .prop_map(str::to_string),
    ]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let instruction = (
        1usize..500,
        mnemonic_strategy(),
        prop::collection::vec(operand_strategy(), 3),
        0usize..4,
    )
        .prop_map(|(line, m, mut ops, other_arity)| {
            let arity = match Opcode::parse(&m) {
                Opcode::Not(_) => 1,
                Opcode::BranchMulOverflow => 3,
                Opcode::BitTest { .. } => 2 + other_arity % 2,
                _ => other_arity,
            };
            ops.truncate(arity);
            inst(line, &m, ops)
        });
    let label_node = (1usize..500, "\\.[a-z]{1,6}").prop_map(|(line, name)| Node::Label {
        name,
        origin: origin(line),
    });
    prop_oneof![4 => instruction, 1 => label_node]
}

proptest! {
    #[test]
    fn prop_unmatched_nodes_are_identity(nodes in prop::collection::vec(node_strategy(), 0..20)) {
        for kind in PassKind::ALL {
            let pass = kind.pass();
            let untouched: Vec<Node> = nodes
                .iter()
                .filter(|n| n.as_instruction().map_or(true, |i| !pass.handles(&i.opcode)))
                .cloned()
                .collect();
            let out = run(pass, &untouched).unwrap();
            prop_assert_eq!(out, untouched);
        }
    }

    #[test]
    fn prop_origins_preserved(nodes in prop::collection::vec(node_strategy(), 0..20)) {
        for kind in PassKind::ALL {
            let pass = kind.pass();
            for node in &nodes {
                let out = run(pass, std::slice::from_ref(node)).unwrap();
                prop_assert!(!out.is_empty());
                for emitted in &out {
                    prop_assert_eq!(emitted.origin(), node.origin());
                }
            }
        }
    }

    #[test]
    fn prop_each_pass_reaches_fixed_point(nodes in prop::collection::vec(node_strategy(), 0..20)) {
        for kind in PassKind::ALL {
            let once = run(kind.pass(), &nodes).unwrap();
            let twice = run(kind.pass(), &once).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn prop_malformed_arity_is_rejected(
        line in 1usize..500,
        extra in 4usize..7,
        which in 0usize..3,
    ) {
        let (mnemonic, count) = match which {
            0 => ("noti", extra - 2),
            1 => ("bmulio", extra),
            _ => ("btpz", extra),
        };
        let ops: Vec<Operand> = (0..count).map(|n| reg(&format!("t{}", n))).collect();
        let err = Pipeline::default()
            .run(&[inst(line, mnemonic, ops)], &mut TmpCounter::new())
            .unwrap_err();
        prop_assert_eq!(err.origin(), &origin(line));
    }

    #[test]
    fn prop_deterministic_with_distinct_temporaries(
        nodes in prop::collection::vec(node_strategy(), 0..20),
    ) {
        let input_ids = tmp_ids(&nodes);
        let floor = input_ids.iter().copied().max();
        let pipeline = Pipeline::default();
        let first = pipeline.run(&nodes, &mut TmpCounter::above(floor)).unwrap();
        let second = pipeline.run(&nodes, &mut TmpCounter::above(floor)).unwrap();
        prop_assert_eq!(&first, &second);

        // Fresh temporaries avoid the input's ids and are each defined by exactly one
        // instruction.
        let mut defined = HashSet::new();
        for inst in first.iter().filter_map(Node::as_instruction) {
            let dest = match &inst.opcode {
                Opcode::And(_) | Opcode::RShift(_) => inst.operands.last(),
                _ => None,
            };
            if let Some(tmp) = dest.and_then(Operand::as_tmp) {
                if !input_ids.contains(&tmp.id) {
                    prop_assert!(defined.insert(tmp.id));
                }
            }
        }
        let fresh: HashSet<TmpId> = tmp_ids(&first).difference(&input_ids).copied().collect();
        prop_assert_eq!(&fresh, &defined);
        prop_assert!(fresh.iter().all(|id| floor.map_or(true, |max| *id > max)));
        prop_assert!(Pipeline::residual(&first).is_none());
    }
}
