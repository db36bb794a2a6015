//! Macro-assembly intermediate representation
//!
//! Nodes are what the lowering passes consume and produce. Opcodes are parsed once into
//! [`Opcode`]; passes match on its variants and never look at mnemonic text again.

use smallvec::SmallVec;
use std::fmt;

pub use crate::util::span::Origin;

/// Operand size class selected by the last letter of most mnemonics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// `b` — 8-bit
    Byte,
    /// `i` — 32-bit integer
    Int,
    /// `p` — pointer width
    Ptr,
    /// `q` — 64-bit quad
    Quad,
}

impl Width {
    pub const ALL: [Width; 4] = [Width::Byte, Width::Int, Width::Ptr, Width::Quad];

    pub fn suffix(self) -> char {
        match self {
            Width::Byte => 'b',
            Width::Int => 'i',
            Width::Ptr => 'p',
            Width::Quad => 'q',
        }
    }

    pub fn from_suffix(c: char) -> Option<Self> {
        match c {
            'b' => Some(Width::Byte),
            'i' => Some(Width::Int),
            'p' => Some(Width::Ptr),
            'q' => Some(Width::Quad),
            _ => None,
        }
    }
}

/// Whether a test/compare branches to a label or writes a 0/1 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Branch,
    Set,
}

/// Condition of the `bt*` / `t*` family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestCond {
    /// `s` — sign bit of the masked value set
    Sign,
    /// `z` — masked value is zero
    Zero,
    /// `nz` — masked value is non-zero
    NonZero,
}

impl TestCond {
    pub const ALL: [TestCond; 3] = [TestCond::Sign, TestCond::Zero, TestCond::NonZero];

    pub fn suffix(self) -> &'static str {
        match self {
            TestCond::Sign => "s",
            TestCond::Zero => "z",
            TestCond::NonZero => "nz",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        TestCond::ALL.into_iter().find(|c| c.suffix() == s)
    }
}

/// Condition of the `b*` / `c*` compare family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Eq,
    Neq,
    Above,
    AboveEq,
    Below,
    BelowEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl Cond {
    pub const ALL: [Cond; 10] = [
        Cond::Eq,
        Cond::Neq,
        Cond::Above,
        Cond::AboveEq,
        Cond::Below,
        Cond::BelowEq,
        Cond::Gt,
        Cond::GtEq,
        Cond::Lt,
        Cond::LtEq,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Neq => "neq",
            Cond::Above => "a",
            Cond::AboveEq => "aeq",
            Cond::Below => "b",
            Cond::BelowEq => "beq",
            Cond::Gt => "gt",
            Cond::GtEq => "gteq",
            Cond::Lt => "lt",
            Cond::LtEq => "lteq",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        Cond::ALL.into_iter().find(|c| c.suffix() == s)
    }
}

/// Instruction opcode
///
/// `Other` holds every mnemonic none of the structured families claim. Build opcodes
/// with [`Opcode::parse`] so that a known mnemonic never ends up in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `noti`, `notp`
    Not(Width),
    /// `xor{b,i,p,q}`
    Xor(Width),
    /// `and{b,i,p,q}`
    And(Width),
    /// `rshift{b,i,p,q}` (arithmetic)
    RShift(Width),
    /// `smulli` — widening signed multiply
    SignedMulLong,
    /// `zxi2p`
    ZeroExtendIntToPtr,
    /// `bmulio` — multiply, branch on 32-bit overflow
    BranchMulOverflow,
    /// `bt{w}{s,z,nz}` and `t{w}{s,z,nz}`
    BitTest {
        form: Form,
        width: Width,
        cond: TestCond,
    },
    /// `b{w}{cond}` and `c{w}{cond}`
    Compare {
        form: Form,
        width: Width,
        cond: Cond,
    },
    Other(String),
}

impl Opcode {
    /// Parse a mnemonic. Total: unknown mnemonics become [`Opcode::Other`].
    pub fn parse(mnemonic: &str) -> Opcode {
        match mnemonic {
            "noti" => return Opcode::Not(Width::Int),
            "notp" => return Opcode::Not(Width::Ptr),
            "smulli" => return Opcode::SignedMulLong,
            "zxi2p" => return Opcode::ZeroExtendIntToPtr,
            "bmulio" => return Opcode::BranchMulOverflow,
            _ => {}
        }

        if let Some(w) = mnemonic.strip_prefix("xor").and_then(single_width) {
            return Opcode::Xor(w);
        }
        if let Some(w) = mnemonic.strip_prefix("and").and_then(single_width) {
            return Opcode::And(w);
        }
        if let Some(w) = mnemonic.strip_prefix("rshift").and_then(single_width) {
            return Opcode::RShift(w);
        }
        if let Some(op) = parse_bit_test(mnemonic) {
            return op;
        }
        if let Some(op) = parse_compare(mnemonic) {
            return op;
        }

        Opcode::Other(mnemonic.to_string())
    }

    /// True for mnemonics no structured family claims
    pub fn is_other(&self) -> bool {
        matches!(self, Opcode::Other(_))
    }
}

fn single_width(rest: &str) -> Option<Width> {
    let mut chars = rest.chars();
    let w = Width::from_suffix(chars.next()?)?;
    chars.next().is_none().then_some(w)
}

fn split_width(rest: &str) -> Option<(Width, &str)> {
    let c = rest.chars().next()?;
    Some((Width::from_suffix(c)?, &rest[c.len_utf8()..]))
}

fn parse_bit_test(mnemonic: &str) -> Option<Opcode> {
    let (form, rest) = if let Some(rest) = mnemonic.strip_prefix("bt") {
        (Form::Branch, rest)
    } else {
        (Form::Set, mnemonic.strip_prefix('t')?)
    };
    let (width, rest) = split_width(rest)?;
    let cond = TestCond::from_suffix(rest)?;
    Some(Opcode::BitTest { form, width, cond })
}

fn parse_compare(mnemonic: &str) -> Option<Opcode> {
    let (form, rest) = if let Some(rest) = mnemonic.strip_prefix('b') {
        (Form::Branch, rest)
    } else {
        (Form::Set, mnemonic.strip_prefix('c')?)
    };
    let (width, rest) = split_width(rest)?;
    let cond = Cond::from_suffix(rest)?;
    Some(Opcode::Compare { form, width, cond })
}

impl fmt::Display for Opcode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Opcode::Not(w) => write!(f, "not{}", w.suffix()),
            Opcode::Xor(w) => write!(f, "xor{}", w.suffix()),
            Opcode::And(w) => write!(f, "and{}", w.suffix()),
            Opcode::RShift(w) => write!(f, "rshift{}", w.suffix()),
            Opcode::SignedMulLong => write!(f, "smulli"),
            Opcode::ZeroExtendIntToPtr => write!(f, "zxi2p"),
            Opcode::BranchMulOverflow => write!(f, "bmulio"),
            Opcode::BitTest { form, width, cond } => {
                let prefix = match form {
                    Form::Branch => "bt",
                    Form::Set => "t",
                };
                write!(f, "{}{}{}", prefix, width.suffix(), cond.suffix())
            }
            Opcode::Compare { form, width, cond } => {
                let prefix = match form {
                    Form::Branch => 'b',
                    Form::Set => 'c',
                };
                write!(f, "{}{}{}", prefix, width.suffix(), cond.suffix())
            }
            Opcode::Other(name) => write!(f, "{}", name),
        }
    }
}

// =====================
// 操作数
// =====================

/// Register class of a virtual temporary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegClass {
    Gpr,
    Fpr,
}

/// Virtual temporary id, unique within one compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TmpId(pub u32);

/// Virtual temporary
///
/// Handed out by a [`TmpSource`](crate::middle::tmp::TmpSource); resolved to a real
/// register by register allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tmp {
    pub id: TmpId,
    pub class: RegClass,
    /// Origin of the instruction whose lowering introduced this temporary
    pub origin: Origin,
}

impl fmt::Display for Tmp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.class {
            RegClass::Gpr => write!(f, "%t{}", self.id.0),
            RegClass::Fpr => write!(f, "%f{}", self.id.0),
        }
    }
}

/// Register operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Register {
    /// Named machine register (`t0`, `cfr`, `sp`, ...)
    Machine(String),
    Tmp(Tmp),
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(Register),
    Immediate(i64),
    /// Branch target
    Label(String),
    /// Addressing form the passes never look inside (`8[t0]`, `[cfr, t1, 8]`)
    Address(String),
}

impl Operand {
    pub fn reg(name: impl Into<String>) -> Self {
        Operand::Register(Register::Machine(name.into()))
    }

    pub fn tmp(tmp: Tmp) -> Self {
        Operand::Register(Register::Tmp(tmp))
    }

    pub fn imm(value: i64) -> Self {
        Operand::Immediate(value)
    }

    /// Branch target. Listings only read names starting with `.` or `_` back as labels.
    pub fn label(name: impl Into<String>) -> Self {
        Operand::Label(name.into())
    }

    pub fn as_immediate(&self) -> Option<i64> {
        match self {
            Operand::Immediate(v) => Some(*v),
            _ => None,
        }
    }

    /// True iff this is the immediate `value`
    pub fn is_immediate(
        &self,
        value: i64,
    ) -> bool {
        self.as_immediate() == Some(value)
    }

    pub fn as_tmp(&self) -> Option<&Tmp> {
        match self {
            Operand::Register(Register::Tmp(tmp)) => Some(tmp),
            _ => None,
        }
    }
}

impl From<Tmp> for Operand {
    fn from(tmp: Tmp) -> Self {
        Operand::tmp(tmp)
    }
}

impl fmt::Display for Operand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Operand::Register(Register::Machine(name)) => write!(f, "{}", name),
            Operand::Register(Register::Tmp(tmp)) => write!(f, "{}", tmp),
            Operand::Immediate(v) => write!(f, "{}", v),
            Operand::Label(name) | Operand::Address(name) => write!(f, "{}", name),
        }
    }
}

// =====================
// 指令与节点
// =====================

/// Operand list; nothing in the macro set takes more than three
pub type Operands = SmallVec<[Operand; 3]>;

/// Real or pseudo instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub origin: Origin,
    pub opcode: Opcode,
    pub operands: Operands,
}

impl Instruction {
    pub fn new(
        origin: Origin,
        opcode: Opcode,
        operands: impl IntoIterator<Item = Operand>,
    ) -> Self {
        Self {
            origin,
            opcode,
            operands: operands.into_iter().collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

impl fmt::Display for Instruction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}

/// Element of an instruction list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Instruction(Instruction),
    Label { name: String, origin: Origin },
    Directive { text: String, origin: Origin },
    Comment { text: String, origin: Origin },
}

impl Node {
    pub fn origin(&self) -> &Origin {
        match self {
            Node::Instruction(inst) => &inst.origin,
            Node::Label { origin, .. }
            | Node::Directive { origin, .. }
            | Node::Comment { origin, .. } => origin,
        }
    }

    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            Node::Instruction(inst) => Some(inst),
            _ => None,
        }
    }
}

impl From<Instruction> for Node {
    fn from(inst: Instruction) -> Self {
        Node::Instruction(inst)
    }
}

impl fmt::Display for Node {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Node::Instruction(inst) => write!(f, "    {}", inst),
            Node::Label { name, .. } => write!(f, "{}:", name),
            Node::Directive { text, .. } => write!(f, "{}", text),
            Node::Comment { text, .. } => write!(f, "# {}", text),
        }
    }
}
