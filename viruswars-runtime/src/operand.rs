//! Resolved operand forms
//!
//! An encoded parameter resolves to one of four storage sites before any
//! value moves. The six addressing shapes of the encoding (immediate,
//! register direct, register indirect x1/x2, memory indirect x1/x2)
//! collapse onto these four: the indirect shapes all end at a memory
//! address once their pointer chain is walked.

use viruswars_spec::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedOperand {
    /// A literal immediate; readable, never writable
    Immediate(i32),
    /// Slot in the executing thread's private bank
    PrivateReg(usize),
    /// Slot in the owning program's shared bank
    SharedReg(usize),
    /// A wrapped absolute core address
    Memory(Address),
}

impl ResolvedOperand {
    /// Writes to immediates fault; everything else is a valid store site
    pub const fn is_writable(&self) -> bool {
        !matches!(self, ResolvedOperand::Immediate(_))
    }
}
