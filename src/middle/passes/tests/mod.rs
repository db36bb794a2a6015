//! 降级 Pass 测试套件

mod properties;

use crate::middle::ir::{Instruction, Node, Opcode, Operand, Origin};
use crate::middle::passes::{LowerError, LoweringPass};
use crate::middle::tmp::TmpCounter;
use crate::util::span::Span;

pub(super) fn origin(line: usize) -> Origin {
    Origin::new("test.asm", Span::on_line(line, 5, 8))
}

pub(super) fn inst(
    line: usize,
    mnemonic: &str,
    operands: impl IntoIterator<Item = Operand>,
) -> Node {
    Node::Instruction(Instruction::new(origin(line), Opcode::parse(mnemonic), operands))
}

pub(super) fn reg(name: &str) -> Operand {
    Operand::reg(name)
}

pub(super) fn imm(value: i64) -> Operand {
    Operand::imm(value)
}

pub(super) fn label(name: &str) -> Operand {
    Operand::label(name)
}

pub(super) fn run(
    pass: &dyn LoweringPass,
    nodes: &[Node],
) -> Result<Vec<Node>, LowerError> {
    let mut tmps = TmpCounter::new();
    pass.run(nodes, &mut tmps)
}

/// Mnemonic and operands of an instruction node, for compact assertions
pub(super) fn shape(node: &Node) -> (String, Vec<Operand>) {
    let inst = node.as_instruction().expect("instruction node");
    (inst.opcode.to_string(), inst.operands.to_vec())
}
