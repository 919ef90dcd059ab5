//! # Operand Parameters
//!
//! Each instruction word carries two 14-bit operand parameters. A
//! parameter is one of three shapes, with up to two levels of PC-relative
//! memory indirection:
//!
//! - a literal immediate (no memory access),
//! - a register, optionally dereferenced through memory once or twice,
//! - a literal offset dereferenced once or twice.
//!
//! Every 14-bit pattern decodes to a valid `Param`; only the checked
//! encoders can fail, and only on out-of-range inputs.

use serde::{Deserialize, Serialize};

use crate::encoding::{
    dereference_count_of, encode_literal_param, encode_register_param, literal_value_of,
    param_class_of, register_index_of, CLASS_LITERAL, CLASS_REGISTER,
};
use crate::error::EncodingError;
use crate::register::Register;

/// One decoded operand parameter
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// Class 00: a 12-bit signed immediate, read-only
    Literal { value: i16 },
    /// Class 01: a register, dereferenced `deref` times (0..=2)
    Register { reg: Register, deref: u8 },
    /// Classes 10/11: a 12-bit signed offset, dereferenced `deref` times (1..=2)
    Indirect { offset: i16, deref: u8 },
}

impl Param {
    /// Literal immediate shorthand
    pub const fn literal(value: i16) -> Self {
        Param::Literal { value }
    }

    /// Decode a 14-bit parameter field. Total: every pattern is meaningful.
    pub fn decode(raw: u16) -> Self {
        match param_class_of(raw) {
            CLASS_LITERAL => Param::Literal {
                value: literal_value_of(raw) as i16,
            },
            CLASS_REGISTER => Param::Register {
                // The 5-bit field holds index-1, so all 32 registers decode.
                reg: Register::from_index(register_index_of(raw))
                    .unwrap_or(Register::R1),
                deref: dereference_count_of(raw),
            },
            _ => Param::Indirect {
                offset: literal_value_of(raw) as i16,
                deref: dereference_count_of(raw),
            },
        }
    }

    /// Encode back to the 14-bit field
    pub fn encode(&self) -> Result<u16, EncodingError> {
        match *self {
            Param::Literal { value } => encode_literal_param(value as i32, 0),
            Param::Register { reg, deref } => encode_register_param(reg.index(), deref),
            Param::Indirect { offset, deref } => encode_literal_param(offset as i32, deref),
        }
    }

    /// Number of memory touches needed to resolve this operand
    pub const fn deref_count(&self) -> u8 {
        match *self {
            Param::Literal { .. } => 0,
            Param::Register { deref, .. } => deref,
            Param::Indirect { deref, .. } => deref,
        }
    }

    pub const fn is_literal(&self) -> bool {
        matches!(self, Param::Literal { .. })
    }

    pub const fn is_register(&self) -> bool {
        matches!(self, Param::Register { .. })
    }
}
