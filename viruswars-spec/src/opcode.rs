//! # Opcode Definitions
//!
//! The top nibble of every instruction word selects one of sixteen
//! opcodes. All 4-bit values are assigned, so any word decodes to a
//! well-formed instruction (a `Data` cell terminates the thread that
//! executes it).

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;
use crate::Word;

/// Instruction opcode (4 bits, values 0x0-0xF)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Raw value; not executable, the fetching thread terminates
    Data = 0,
    /// No effect
    Nop = 1,
    /// `a := value(b)` as an opaque 32-bit word
    Assign = 2,
    /// `a := data(a) + data(b)`
    Add = 3,
    /// `a := data(a) - data(b)`
    Sub = 4,
    /// `a := data(a) * data(b)`
    Mul = 5,
    /// `a := data(a) / data(b)`; divisor 0 faults the thread
    Div = 6,
    /// `a := data(a) % data(b)`; divisor 0 faults the thread
    Mod = 7,
    /// `r1 := sign(data(a) - data(b))`
    Compare = 8,
    /// `pc := pc + data(b)`
    Jump = 9,
    /// Branch iff `data(a) == 0`
    JumpZero = 10,
    /// Branch iff `data(a) != 0`
    JumpNotZero = 11,
    /// Branch iff `data(a) < 0`
    JumpLess = 12,
    /// Branch iff `data(a) > 0`
    JumpGreater = 13,
    /// Decrement `a` as a data value, branch iff the result != 0
    DecJumpNotZero = 14,
    /// Spawn a sibling thread at `pc + data(b)`; `r1` reports 1/0
    Fork = 15,
}

impl Opcode {
    /// Opcode field width in bits
    pub const BITS: u32 = 4;

    /// Try to convert from the raw 4-bit value
    pub fn from_u4(value: u8) -> Result<Self, EncodingError> {
        match value {
            0 => Ok(Opcode::Data),
            1 => Ok(Opcode::Nop),
            2 => Ok(Opcode::Assign),
            3 => Ok(Opcode::Add),
            4 => Ok(Opcode::Sub),
            5 => Ok(Opcode::Mul),
            6 => Ok(Opcode::Div),
            7 => Ok(Opcode::Mod),
            8 => Ok(Opcode::Compare),
            9 => Ok(Opcode::Jump),
            10 => Ok(Opcode::JumpZero),
            11 => Ok(Opcode::JumpNotZero),
            12 => Ok(Opcode::JumpLess),
            13 => Ok(Opcode::JumpGreater),
            14 => Ok(Opcode::DecJumpNotZero),
            15 => Ok(Opcode::Fork),
            _ => Err(EncodingError::BadOpcode(value)),
        }
    }

    /// Convert to the raw 4-bit value
    #[inline]
    pub const fn to_u4(self) -> u8 {
        self as u8
    }

    /// Extract the opcode from an instruction word
    #[inline]
    pub fn from_word(word: Word) -> Self {
        // The nibble covers exactly the 16 variants, so this cannot fail.
        Self::from_u4((word >> 28) as u8).unwrap_or(Opcode::Data)
    }

    /// Arithmetic opcodes operate on both operands as data values and
    /// write the result back through operand `a`
    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod
        )
    }

    /// Conditional branches test operand `a` against zero
    #[inline]
    pub const fn is_conditional_branch(self) -> bool {
        matches!(
            self,
            Opcode::JumpZero
                | Opcode::JumpNotZero
                | Opcode::JumpLess
                | Opcode::JumpGreater
                | Opcode::DecJumpNotZero
        )
    }

    /// Opcodes that may rewrite `pc` from operand `b`
    #[inline]
    pub const fn is_control_flow(self) -> bool {
        self.is_conditional_branch() || matches!(self, Opcode::Jump | Opcode::Fork)
    }

    /// Opcodes that write through operand `a`
    #[inline]
    pub const fn writes_operand_a(self) -> bool {
        self.is_arithmetic() || matches!(self, Opcode::Assign | Opcode::DecJumpNotZero)
    }

    /// Canonical lower-case name used in diagnostics
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Data => "data",
            Opcode::Nop => "nop",
            Opcode::Assign => "assign",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Compare => "compare",
            Opcode::Jump => "jump",
            Opcode::JumpZero => "jump-zero",
            Opcode::JumpNotZero => "jump-not-zero",
            Opcode::JumpLess => "jump-less",
            Opcode::JumpGreater => "jump-greater",
            Opcode::DecJumpNotZero => "dec-jump-not-zero",
            Opcode::Fork => "fork",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
