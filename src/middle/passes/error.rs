//! 降级错误
//!
//! Malformed input means an upstream stage is broken, so nothing here is recoverable:
//! a pass returns the first error it sees and the pipeline gives up on the unit.

use crate::middle::ir::{Opcode, Origin};
use std::fmt;
use thiserror::Error;

/// Operand count an opcode family accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    /// Either of two counts (`bt*`/`t*` take 2 or 3)
    Either(usize, usize),
}

impl Arity {
    pub fn accepts(
        self,
        count: usize,
    ) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::Either(a, b) => count == a || count == b,
        }
    }

    /// `operand` or `operands`, agreeing with the count
    pub fn noun(self) -> &'static str {
        match self {
            Arity::Exactly(1) => "operand",
            _ => "operands",
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::Either(a, b) => write!(f, "{} or {}", a, b),
        }
    }
}

/// Lowering error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// A handled opcode with the wrong number of operands
    #[error("{origin}: malformed `{opcode}`: expected {expected} {}, found {found}", .expected.noun())]
    MalformedIr {
        opcode: Opcode,
        expected: Arity,
        found: usize,
        origin: Origin,
    },

    /// The temporary source has no ids left
    #[error("{origin}: out of temporary ids")]
    TemporariesExhausted { origin: Origin },
}

impl LowerError {
    pub fn origin(&self) -> &Origin {
        match self {
            LowerError::MalformedIr { origin, .. } => origin,
            LowerError::TemporariesExhausted { origin } => origin,
        }
    }
}

pub(crate) fn malformed(
    opcode: &Opcode,
    expected: Arity,
    found: usize,
    origin: &Origin,
) -> LowerError {
    LowerError::MalformedIr {
        opcode: opcode.clone(),
        expected,
        found,
        origin: origin.clone(),
    }
}

/// Fail with [`LowerError::MalformedIr`] unless `count` fits `expected`
pub(crate) fn check_arity(
    opcode: &Opcode,
    expected: Arity,
    count: usize,
    origin: &Origin,
) -> Result<(), LowerError> {
    if expected.accepts(count) {
        return Ok(());
    }
    Err(malformed(opcode, expected, count, origin))
}
