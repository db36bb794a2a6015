//! 按位取反降级
//!
//! ```text
//! noti t0        =>   xori -1, t0
//! ```
//!
//! The target has no `not`; `x ^ -1 == !x` at the instruction's own width.

use super::error::{check_arity, Arity};
use super::{unchanged, Lowered, LowerError, LoweringPass};
use crate::middle::ir::{Instruction, Opcode, Operand};
use crate::middle::tmp::TmpSource;
use smallvec::smallvec;

#[derive(Debug, Default, Clone, Copy)]
pub struct NotLowering;

impl LoweringPass for NotLowering {
    fn name(&self) -> &'static str {
        "not"
    }

    fn handles(
        &self,
        opcode: &Opcode,
    ) -> bool {
        matches!(opcode, Opcode::Not(_))
    }

    fn lower(
        &self,
        inst: &Instruction,
        _tmps: &mut dyn TmpSource,
    ) -> Result<Lowered, LowerError> {
        let Opcode::Not(width) = &inst.opcode else {
            return Ok(unchanged(inst));
        };
        check_arity(&inst.opcode, Arity::Exactly(1), inst.arity(), &inst.origin)?;

        Ok(smallvec![Instruction::new(
            inst.origin.clone(),
            Opcode::Xor(*width),
            [Operand::imm(-1), inst.operands[0].clone()],
        )])
    }
}
