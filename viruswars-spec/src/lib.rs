//! # Virus Wars Specification
//!
//! Shared core types for the virus wars machine: a "Core Wars"-style game
//! where small programs ("viruses") fight for survival inside a circular
//! 32-bit memory array.
//!
//! ## Key Features
//! - 32-bit instruction word: `[opcode:4][a:14][b:14]`
//! - 16 opcodes, all 4-bit values assigned
//! - 14-bit operand parameters: literals, registers, and PC-relative
//!   indirection up to two levels deep
//! - 28-bit signed data values with sign bit `0x0800_0000`
//! - 16 private registers per thread (`r1..r16`) and 16 shared registers
//!   per program (`s1..s16`)

pub mod config;
pub mod encoding;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod param;
pub mod program;
pub mod register;

pub use config::{ConfigError, VmConfig};
pub use error::EncodingError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use param::Param;
pub use program::CompiledProgram;
pub use register::{Register, REGISTERS_PER_BANK};

/// One memory cell / instruction word (32-bit)
pub type Word = u32;

/// Absolute memory address, always kept in `[0, memory_size)` by wrapping
pub type Address = usize;

/// Smallest legal core size
pub const MIN_MEMORY_SIZE: usize = 256;

/// Largest legal core size
pub const MAX_MEMORY_SIZE: usize = 65536;

/// Data values are 28-bit two's complement
pub const DATA_VALUE_BITS: u32 = 28;

/// Smallest representable data value
pub const DATA_VALUE_MIN: i32 = -(1 << 27);

/// Largest representable data value
pub const DATA_VALUE_MAX: i32 = (1 << 27) - 1;

/// Smallest 12-bit literal parameter
pub const LITERAL_MIN: i32 = -2048;

/// Largest 12-bit literal parameter
pub const LITERAL_MAX: i32 = 2047;

/// Configuration defaults
pub const DEFAULT_MEMORY_SIZE: usize = 8000;
pub const DEFAULT_MAX_THREADS: usize = 2000;
pub const DEFAULT_CYCLES: u64 = 80_000;
pub const DEFAULT_MAX_PROGRAM_LENGTH: usize = 100;
pub const DEFAULT_MIN_PROGRAM_DISTANCE: usize = 100;
pub const DEFAULT_VIRUSES_PER_MATCH: usize = 2;
pub const DEFAULT_ROUNDS_PER_SETUP: usize = 4;
