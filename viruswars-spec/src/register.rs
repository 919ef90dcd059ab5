//! Register identities: 16 thread-private registers (`r1..r16`) and 16
//! program-shared registers (`s1..s16`), indices 1..=32 in operand encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EncodingError;

/// Registers per bank (private and shared alike)
pub const REGISTERS_PER_BANK: usize = 16;

/// A register reference. Index 1..=16 is private to the executing thread,
/// 17..=32 is shared across all threads of the owning program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register(u8);

impl Register {
    /// Conventional result register for COMPARE and FORK
    pub const R1: Self = Register(1);

    /// Private register `r{n}`, n in 1..=16
    pub fn private(n: u8) -> Result<Self, EncodingError> {
        if (1..=16).contains(&n) {
            Ok(Register(n))
        } else {
            Err(EncodingError::BadRegisterIndex(n))
        }
    }

    /// Shared register `s{n}`, n in 1..=16
    pub fn shared(n: u8) -> Result<Self, EncodingError> {
        if (1..=16).contains(&n) {
            Ok(Register(n + 16))
        } else {
            Err(EncodingError::BadRegisterIndex(n))
        }
    }

    /// From the operand-encoding index 1..=32
    pub fn from_index(index: u8) -> Result<Self, EncodingError> {
        if (1..=32).contains(&index) {
            Ok(Register(index))
        } else {
            Err(EncodingError::BadRegisterIndex(index))
        }
    }

    /// Operand-encoding index, 1..=32
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Shared registers live on the program, private ones on the thread
    #[inline]
    pub const fn is_shared(self) -> bool {
        self.0 > 16
    }

    /// Zero-based slot within its bank
    #[inline]
    pub const fn slot(self) -> usize {
        if self.is_shared() {
            (self.0 - 17) as usize
        } else {
            (self.0 - 1) as usize
        }
    }

    /// Source-level name, `r1..r16` or `s1..s16`
    pub fn name(self) -> String {
        if self.is_shared() {
            format!("s{}", self.0 - 16)
        } else {
            format!("r{}", self.0)
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
