//! Listing in, listing out

use macrolower::frontend::parse_listing;
use macrolower::middle::{LowerError, PassKind, Pipeline};
use macrolower::{lower_source, lower_to_string};

fn lower(source: &str) -> String {
    lower_to_string("scenario.asm", source, &Pipeline::default()).expect("lowering failed")
}

#[test]
fn test_noti() {
    assert_eq!(lower("    noti t0\n"), "    xori -1, t0\n");
}

#[test]
fn test_notp() {
    assert_eq!(lower("    notp t1\n"), "    xorp -1, t1\n");
}

#[test]
fn test_bmulio() {
    assert_eq!(
        lower("    bmulio a, b, .overflow\n"),
        "    smulli a, b, b\n\
         \x20   rshiftp b, 32, %t0\n\
         \x20   rshifti b, 31, %t1\n\
         \x20   zxi2p b, b\n\
         \x20   bineq %t0, %t1, .overflow\n"
    );
}

#[test]
fn test_btiz_registers() {
    assert_eq!(
        lower("    btiz t0, t1, .L\n"),
        "    andi t0, t1, %t0\n    bieq %t0, 0, .L\n"
    );
}

#[test]
fn test_btiz_all_ones() {
    assert_eq!(lower("    btiz t0, -1, .L\n"), "    bieq t0, 0, .L\n");
}

#[test]
fn test_tiz_two_operands() {
    assert_eq!(lower("    tiz t0, t1\n"), "    cieq t0, 0, t1\n");
}

#[test]
fn test_surrounding_nodes_survive() {
    let source = "\
# entry point
.align 4
_llint_op_bitnot:
    loadi 8[cfr], t0
    noti t0
    storei t0, 8[cfr]
    ret
";
    let expected = "\
# entry point
.align 4
_llint_op_bitnot:
    loadi 8[cfr], t0
    xori -1, t0
    storei t0, 8[cfr]
    ret
";
    assert_eq!(lower(source), expected);
}

#[test]
fn test_fresh_temporaries_avoid_existing_ones() {
    let out = lower("    addi 1, %t7\n    btpz t0, t1, .L\n");
    assert_eq!(out, "    addi 1, %t7\n    andp t0, t1, %t8\n    bpeq %t8, 0, .L\n");
}

#[test]
fn test_lowered_output_is_fixed_point() {
    let source = "\
.loop:
    bmulio t0, t1, .slow
    btbnz t2, 0x80, .loop
    tqs t3, t4
    notp t5
";
    let once = lower(source);
    assert_eq!(lower(&once), once);
}

#[test]
fn test_malformed_reports_origin() {
    let err = lower_source("bad.asm", "    noti t0\n\n    btiz t0\n", &Pipeline::default())
        .unwrap_err();
    let lower_err = err.downcast_ref::<LowerError>().expect("lowering error");
    assert_eq!(lower_err.origin().to_string(), "bad.asm:3:5");
    assert_eq!(
        err.to_string(),
        "bad.asm:3:5: malformed `btiz`: expected 2 or 3 operands, found 1"
    );
}

#[test]
fn test_partial_pipeline_leaves_other_macros() {
    let source = "    noti t0\n    btiz t0, t1, .L\n";
    let nodes = lower_source("p.asm", source, &Pipeline::new([PassKind::BitTest])).unwrap();
    let residual = Pipeline::residual(&nodes).unwrap();
    assert_eq!(residual.opcode.to_string(), "noti");
}

#[test]
fn test_every_node_keeps_its_line() {
    let source = "    noti t0\n    bmulio t1, t2, .o\n    tpnz t3, t4, t5\n";
    let nodes = lower_source("lines.asm", source, &Pipeline::default()).unwrap();
    let lines: Vec<usize> = nodes.iter().map(|n| n.origin().line()).collect();
    assert_eq!(lines, vec![1, 2, 2, 2, 2, 2, 3, 3]);

    let input = parse_listing("lines.asm", source).unwrap();
    assert_eq!(input.nodes.len(), 3);
}

#[test]
fn test_highest_temporary_id_runs_out_instead_of_reusing() {
    let source = "    addi 1, %t0\n    addi 1, %t4294967295\n    btiz t0, t1, .L\n";
    let err = lower_source("ids.asm", source, &Pipeline::default()).unwrap_err();
    let lower_err = err.downcast_ref::<LowerError>().expect("lowering error");
    assert!(matches!(lower_err, LowerError::TemporariesExhausted { .. }));
    assert_eq!(err.to_string(), "ids.asm:3:5: out of temporary ids");
}

#[test]
fn test_highest_temporary_id_is_fine_without_fresh_ones() {
    let source = "    addi 1, %t4294967295\n    noti t0\n    btiz t0, -1, .L\n";
    assert_eq!(
        lower(source),
        "    addi 1, %t4294967295\n    xori -1, t0\n    bieq t0, 0, .L\n"
    );
}
