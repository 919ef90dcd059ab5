//! Instruction word decoding
//!
//! Decoding is total: all sixteen opcode values are assigned and every
//! 14-bit parameter pattern is meaningful, so any 32-bit cell decodes to
//! some instruction. Cells written as data come back as `Data`.

use viruswars_spec::encoding::{a_of, b_of, data_value_of};
use viruswars_spec::{Instruction, Opcode, Param, Word};

/// Decode one instruction word
pub fn decode(word: Word) -> Instruction {
    let opcode = Opcode::from_word(word);
    let a = Param::decode(a_of(word));
    let b = Param::decode(b_of(word));

    match opcode {
        Opcode::Data => Instruction::Data {
            value: data_value_of(word),
        },
        Opcode::Nop => Instruction::Nop,
        Opcode::Assign => Instruction::Assign { dst: a, src: b },
        Opcode::Add => Instruction::Add { dst: a, src: b },
        Opcode::Sub => Instruction::Sub { dst: a, src: b },
        Opcode::Mul => Instruction::Mul { dst: a, src: b },
        Opcode::Div => Instruction::Div { dst: a, src: b },
        Opcode::Mod => Instruction::Mod { dst: a, src: b },
        Opcode::Compare => Instruction::Compare { lhs: a, rhs: b },
        Opcode::Jump => Instruction::Jump { offset: b },
        Opcode::JumpZero => Instruction::JumpZero { cond: a, offset: b },
        Opcode::JumpNotZero => Instruction::JumpNotZero { cond: a, offset: b },
        Opcode::JumpLess => Instruction::JumpLess { cond: a, offset: b },
        Opcode::JumpGreater => Instruction::JumpGreater { cond: a, offset: b },
        Opcode::DecJumpNotZero => Instruction::DecJumpNotZero {
            counter: a,
            offset: b,
        },
        Opcode::Fork => Instruction::Fork { offset: b },
    }
}
