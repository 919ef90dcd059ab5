//! # Decoded Instructions
//!
//! A structured view of one instruction word. The raw word remains the
//! source of truth inside the core (memory holds words, not these), but
//! the assembler produces them and the runtime executes against them.

use serde::{Deserialize, Serialize};

use crate::encoding::{encode, encode_data_checked};
use crate::error::EncodingError;
use crate::opcode::Opcode;
use crate::param::Param;
use crate::Word;

/// One decoded instruction
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Raw cell value; executing it terminates the thread
    Data { value: i32 },
    Nop,
    /// `dst := value(src)` as an opaque word
    Assign { dst: Param, src: Param },
    Add { dst: Param, src: Param },
    Sub { dst: Param, src: Param },
    Mul { dst: Param, src: Param },
    Div { dst: Param, src: Param },
    Mod { dst: Param, src: Param },
    /// `r1 := sign(data(lhs) - data(rhs))`
    Compare { lhs: Param, rhs: Param },
    /// `pc := pc + data(offset)`
    Jump { offset: Param },
    JumpZero { cond: Param, offset: Param },
    JumpNotZero { cond: Param, offset: Param },
    JumpLess { cond: Param, offset: Param },
    JumpGreater { cond: Param, offset: Param },
    /// Decrement `counter` as a data value, branch iff the result != 0
    DecJumpNotZero { counter: Param, offset: Param },
    /// Spawn a sibling thread at `pc + data(offset)`
    Fork { offset: Param },
}

impl Instruction {
    /// The opcode this instruction encodes to
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::Data { .. } => Opcode::Data,
            Instruction::Nop => Opcode::Nop,
            Instruction::Assign { .. } => Opcode::Assign,
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Sub { .. } => Opcode::Sub,
            Instruction::Mul { .. } => Opcode::Mul,
            Instruction::Div { .. } => Opcode::Div,
            Instruction::Mod { .. } => Opcode::Mod,
            Instruction::Compare { .. } => Opcode::Compare,
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::JumpZero { .. } => Opcode::JumpZero,
            Instruction::JumpNotZero { .. } => Opcode::JumpNotZero,
            Instruction::JumpLess { .. } => Opcode::JumpLess,
            Instruction::JumpGreater { .. } => Opcode::JumpGreater,
            Instruction::DecJumpNotZero { .. } => Opcode::DecJumpNotZero,
            Instruction::Fork { .. } => Opcode::Fork,
        }
    }

    /// The two operand parameters, as encoded. Operand `a` of `Jump` and
    /// `Fork` is unused and encodes as literal 0.
    fn operands(&self) -> (Param, Param) {
        let zero = Param::literal(0);
        match *self {
            Instruction::Data { .. } | Instruction::Nop => (zero, zero),
            Instruction::Assign { dst, src }
            | Instruction::Add { dst, src }
            | Instruction::Sub { dst, src }
            | Instruction::Mul { dst, src }
            | Instruction::Div { dst, src }
            | Instruction::Mod { dst, src } => (dst, src),
            Instruction::Compare { lhs, rhs } => (lhs, rhs),
            Instruction::Jump { offset } | Instruction::Fork { offset } => (zero, offset),
            Instruction::JumpZero { cond, offset }
            | Instruction::JumpNotZero { cond, offset }
            | Instruction::JumpLess { cond, offset }
            | Instruction::JumpGreater { cond, offset }
            | Instruction::DecJumpNotZero { counter: cond, offset } => (cond, offset),
        }
    }

    /// Pack into an instruction word
    pub fn encode(&self) -> Result<Word, EncodingError> {
        if let Instruction::Data { value } = self {
            return encode_data_checked(*value as i64);
        }
        let (a, b) = self.operands();
        Ok(encode(self.opcode().to_u4(), a.encode()?, b.encode()?))
    }
}
