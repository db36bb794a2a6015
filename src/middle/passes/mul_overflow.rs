//! 乘法溢出分支降级
//!
//! ```text
//! bmulio a, b, .overflow
//! ```
//!
//! becomes
//!
//! ```text
//! smulli a, b, b          # 64-bit product into b
//! rshiftp b, 32, %t0      # high word
//! rshifti b, 31, %t1      # sign of the low word, smeared
//! zxi2p b, b
//! bineq %t0, %t1, .overflow
//! ```
//!
//! The product fits in 32 bits exactly when the high word equals the sign extension
//! of the low word.

use super::error::{check_arity, Arity};
use super::{unchanged, Lowered, LowerError, LoweringPass};
use crate::middle::ir::{Cond, Form, Instruction, Opcode, Operand, RegClass, Width};
use crate::middle::tmp::TmpSource;
use smallvec::smallvec;

#[derive(Debug, Default, Clone, Copy)]
pub struct MulOverflowLowering;

impl LoweringPass for MulOverflowLowering {
    fn name(&self) -> &'static str {
        "mul-overflow"
    }

    fn handles(
        &self,
        opcode: &Opcode,
    ) -> bool {
        matches!(opcode, Opcode::BranchMulOverflow)
    }

    fn lower(
        &self,
        inst: &Instruction,
        tmps: &mut dyn TmpSource,
    ) -> Result<Lowered, LowerError> {
        if inst.opcode != Opcode::BranchMulOverflow {
            return Ok(unchanged(inst));
        }
        check_arity(&inst.opcode, Arity::Exactly(3), inst.arity(), &inst.origin)?;

        let origin = &inst.origin;
        let lhs = &inst.operands[0];
        let acc = &inst.operands[1];
        let target = &inst.operands[2];

        let high = Operand::from(tmps.fresh(RegClass::Gpr, origin)?);
        let sign = Operand::from(tmps.fresh(RegClass::Gpr, origin)?);

        Ok(smallvec![
            Instruction::new(
                origin.clone(),
                Opcode::SignedMulLong,
                [lhs.clone(), acc.clone(), acc.clone()],
            ),
            Instruction::new(
                origin.clone(),
                Opcode::RShift(Width::Ptr),
                [acc.clone(), Operand::imm(32), high.clone()],
            ),
            Instruction::new(
                origin.clone(),
                Opcode::RShift(Width::Int),
                [acc.clone(), Operand::imm(31), sign.clone()],
            ),
            Instruction::new(
                origin.clone(),
                Opcode::ZeroExtendIntToPtr,
                [acc.clone(), acc.clone()],
            ),
            Instruction::new(
                origin.clone(),
                Opcode::Compare {
                    form: Form::Branch,
                    width: Width::Int,
                    cond: Cond::Neq,
                },
                [high, sign, target.clone()],
            ),
        ])
    }
}
