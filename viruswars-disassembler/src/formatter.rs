//! Instruction formatting to assembly text
//!
//! Every rendered statement re-assembles to the word it came from:
//! literals print as signed decimal, dereferences as `@` prefixes,
//! registers as `r1..r16` / `s1..s16`.

use viruswars_spec::{Instruction, Param};

/// Render one operand parameter
pub fn format_param(param: &Param) -> String {
    match *param {
        Param::Literal { value } => value.to_string(),
        Param::Register { reg, deref } => {
            format!("{}{}", "@".repeat(deref as usize), reg.name())
        }
        Param::Indirect { offset, deref } => {
            format!("{}{}", "@".repeat(deref as usize), offset)
        }
    }
}

/// Render one instruction as a source statement
pub fn format_instruction(inst: &Instruction) -> String {
    match inst {
        Instruction::Data { value } => format!("data {}", value),
        Instruction::Nop => "nop".to_string(),
        Instruction::Assign { dst, src } => {
            format!("{} = {}", format_param(dst), format_param(src))
        }
        Instruction::Add { dst, src } => {
            format!("{} += {}", format_param(dst), format_param(src))
        }
        Instruction::Sub { dst, src } => {
            format!("{} -= {}", format_param(dst), format_param(src))
        }
        Instruction::Mul { dst, src } => {
            format!("{} *= {}", format_param(dst), format_param(src))
        }
        Instruction::Div { dst, src } => {
            format!("{} /= {}", format_param(dst), format_param(src))
        }
        Instruction::Mod { dst, src } => {
            format!("{} %= {}", format_param(dst), format_param(src))
        }
        Instruction::Compare { lhs, rhs } => {
            format!("{} <=> {}", format_param(lhs), format_param(rhs))
        }
        Instruction::Jump { offset } => format!("jump {}", format_param(offset)),
        Instruction::JumpZero { cond, offset } => {
            format!("jump {} if {} == 0", format_param(offset), format_param(cond))
        }
        Instruction::JumpNotZero { cond, offset } => {
            format!("jump {} if {} != 0", format_param(offset), format_param(cond))
        }
        Instruction::JumpLess { cond, offset } => {
            format!("jump {} if {} < 0", format_param(offset), format_param(cond))
        }
        Instruction::JumpGreater { cond, offset } => {
            format!("jump {} if {} > 0", format_param(offset), format_param(cond))
        }
        Instruction::DecJumpNotZero { counter, offset } => {
            format!(
                "jump {} if --{} != 0",
                format_param(offset),
                format_param(counter)
            )
        }
        Instruction::Fork { offset } => format!("fork {}", format_param(offset)),
    }
}
