//! Runtime error types
//!
//! Two severities, kept apart on purpose: [`RuntimeError`] aborts a match
//! before it starts (configuration and placement problems), while a
//! [`ThreadFault`] only ever terminates the offending thread and is
//! absorbed by the scheduler.

use thiserror::Error;
use viruswars_spec::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("program `{name}` is {len} cells long, limit is {max}")]
    ProgramTooLong {
        name: String,
        len: usize,
        max: usize,
    },

    #[error("placement impossible: {free_per} free cells per program, need at least {min_distance}")]
    InsufficientDistance {
        free_per: usize,
        min_distance: usize,
    },

    #[error("no programs loaded")]
    NoPrograms,

    #[error("tournament needs at least {need} viruses, have {have}")]
    NotEnoughViruses { have: usize, need: usize },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Per-thread failure; terminates only the thread that raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ThreadFault {
    #[error("executed a data cell")]
    ExecutedData,

    #[error("write to a literal immediate operand")]
    WriteToImmediate,

    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("unknown opcode {0:#x}")]
    UnknownOpcode(u8),
}
