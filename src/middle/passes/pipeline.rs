//! Pass 流水线
//!
//! Runs the configured passes in order; pass N's output is pass N+1's input.

use super::{BitTestLowering, LowerError, LoweringPass, MulOverflowLowering, NotLowering};
use crate::middle::ir::{Instruction, Node};
use crate::middle::tmp::TmpSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

static NOT: NotLowering = NotLowering;
static MUL_OVERFLOW: MulOverflowLowering = MulOverflowLowering;
static BIT_TEST: BitTestLowering = BitTestLowering;

/// Selectable pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PassKind {
    Not,
    MulOverflow,
    BitTest,
}

impl PassKind {
    /// Every pass, in default order
    pub const ALL: [PassKind; 3] = [PassKind::Not, PassKind::MulOverflow, PassKind::BitTest];

    pub fn pass(self) -> &'static dyn LoweringPass {
        match self {
            PassKind::Not => &NOT,
            PassKind::MulOverflow => &MUL_OVERFLOW,
            PassKind::BitTest => &BIT_TEST,
        }
    }

    pub fn name(self) -> &'static str {
        self.pass().name()
    }

    /// One-line summary for `macrolower passes`
    pub fn description(self) -> &'static str {
        match self {
            PassKind::Not => "noti/notp -> xor with -1",
            PassKind::MulOverflow => "bmulio -> smulli + shifts + bineq",
            PassKind::BitTest => "bt*/t* -> and + compare against zero",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered list of passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    passes: Vec<PassKind>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PassKind::ALL)
    }
}

impl Pipeline {
    pub fn new(passes: impl IntoIterator<Item = PassKind>) -> Self {
        Self {
            passes: passes.into_iter().collect(),
        }
    }

    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }

    /// Run every pass in order. The first error aborts the whole run.
    pub fn run(
        &self,
        nodes: &[Node],
        tmps: &mut dyn TmpSource,
    ) -> Result<Vec<Node>, LowerError> {
        let Some((first, rest)) = self.passes.split_first() else {
            return Ok(nodes.to_vec());
        };

        let mut current = first.pass().run(nodes, tmps)?;
        for kind in rest {
            current = kind.pass().run(&current, tmps)?;
        }

        debug!(
            passes = self.passes.len(),
            input = nodes.len(),
            output = current.len(),
            "pipeline finished"
        );
        Ok(current)
    }

    /// First instruction any known pass would still rewrite
    ///
    /// `None` after a run of the full pipeline; a pipeline configured with fewer
    /// passes can leave macro instructions behind.
    pub fn residual(nodes: &[Node]) -> Option<&Instruction> {
        nodes
            .iter()
            .filter_map(Node::as_instruction)
            .filter(|inst| !inst.opcode.is_other())
            .find(|inst| PassKind::ALL.iter().any(|k| k.pass().handles(&inst.opcode)))
    }
}
