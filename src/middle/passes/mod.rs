//! 降级 Pass
//!
//! 把与架构无关的宏指令改写成目标指令集真正支持的指令序列。
//!
//! ## 模块职责
//!
//! - `not.rs`: `noti`/`notp` → `xor` with all ones
//! - `mul_overflow.rs`: `bmulio` → widening multiply + high/low word comparison
//! - `bit_test.rs`: `bt*`/`t*` → optional `and` + compare against zero
//! - `pipeline.rs`: 按配置顺序串联各个 Pass
//! - `error.rs`: 错误类型
//!
//! Every pass is a fold from one node list to a fresh one. Instructions a pass does not
//! handle, and all non-instruction nodes, are copied through in order.

pub mod error;
pub mod mul_overflow;
pub mod not;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use bit_test::BitTestLowering;
pub use error::{Arity, LowerError};
pub use mul_overflow::MulOverflowLowering;
pub use not::NotLowering;
pub use pipeline::{PassKind, Pipeline};

use crate::middle::ir::{Instruction, Node, Opcode, Origin, RegClass, Tmp};
use crate::middle::tmp::TmpSource;
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Replacement for one matched instruction
pub type Lowered = SmallVec<[Instruction; 5]>;

/// A single lowering pass
pub trait LoweringPass: Send + Sync {
    /// Name used in config files, the CLI and logs
    fn name(&self) -> &'static str;

    /// Whether `lower` rewrites instructions with this opcode
    fn handles(
        &self,
        opcode: &Opcode,
    ) -> bool;

    /// Rewrite one instruction. Unhandled opcodes come back unchanged.
    fn lower(
        &self,
        inst: &Instruction,
        tmps: &mut dyn TmpSource,
    ) -> Result<Lowered, LowerError>;

    /// Run over a whole node list
    fn run(
        &self,
        nodes: &[Node],
        tmps: &mut dyn TmpSource,
    ) -> Result<Vec<Node>, LowerError> {
        run_pass(self, nodes, tmps)
    }
}

/// Counts allocations going through to the caller's source
struct CountingSource<'a> {
    inner: &'a mut dyn TmpSource,
    count: usize,
}

impl TmpSource for CountingSource<'_> {
    fn fresh(
        &mut self,
        class: RegClass,
        origin: &Origin,
    ) -> Result<Tmp, LowerError> {
        let tmp = self.inner.fresh(class, origin)?;
        self.count += 1;
        Ok(tmp)
    }
}

/// Fold `nodes` through `pass` into a new list
pub fn run_pass<P: LoweringPass + ?Sized>(
    pass: &P,
    nodes: &[Node],
    tmps: &mut dyn TmpSource,
) -> Result<Vec<Node>, LowerError> {
    let mut source = CountingSource {
        inner: tmps,
        count: 0,
    };
    let mut rewritten = 0usize;

    let out = nodes
        .iter()
        .try_fold(Vec::with_capacity(nodes.len()), |mut out, node| {
            match node {
                Node::Instruction(inst) if pass.handles(&inst.opcode) => {
                    let lowered = pass.lower(inst, &mut source)?;
                    trace!(
                        pass = pass.name(),
                        origin = %inst.origin,
                        opcode = %inst.opcode,
                        emitted = lowered.len(),
                        "rewrote instruction"
                    );
                    rewritten += 1;
                    out.extend(lowered.into_iter().map(Node::Instruction));
                }
                _ => out.push(node.clone()),
            }
            Ok::<_, LowerError>(out)
        })?;

    debug!(
        pass = pass.name(),
        nodes = nodes.len(),
        rewritten,
        temporaries = source.count,
        "lowering pass finished"
    );
    Ok(out)
}

/// Wrap an unhandled instruction as its own replacement
pub(crate) fn unchanged(inst: &Instruction) -> Lowered {
    let mut out = Lowered::new();
    out.push(inst.clone());
    out
}
