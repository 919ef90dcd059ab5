//! # Match Configuration
//!
//! One configuration object covers the core, the match controller and
//! the tournament driver. Front ends build it from flags; the assembler
//! reads it for the predefined symbol values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    DEFAULT_CYCLES, DEFAULT_MAX_PROGRAM_LENGTH, DEFAULT_MAX_THREADS, DEFAULT_MEMORY_SIZE,
    DEFAULT_MIN_PROGRAM_DISTANCE, DEFAULT_ROUNDS_PER_SETUP, DEFAULT_VIRUSES_PER_MATCH,
    MAX_MEMORY_SIZE, MIN_MEMORY_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("memory size {0} outside [{MIN_MEMORY_SIZE}, {MAX_MEMORY_SIZE}]")]
    MemorySizeOutOfRange(usize),

    #[error("cycle budget must be positive")]
    ZeroCycleBudget,

    #[error("maximum program length must be positive")]
    ZeroProgramLength,

    #[error("max threads {max_threads} below the number of programs {programs}")]
    MaxThreadsBelowPrograms { max_threads: usize, programs: usize },

    #[error("viruses per match must be at least 1")]
    ZeroVirusesPerMatch,

    #[error("rounds per setup must be at least 1")]
    ZeroRounds,
}

/// VM, match and tournament knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    /// Core size in cells, within [256, 65536]
    pub memory_size: usize,

    /// Global cap on simultaneously live threads
    pub max_threads: usize,

    /// Cycle budget of one match
    pub cycles_to_completion: u64,

    /// Longest accepted compiled program, in cells
    pub max_program_length: usize,

    /// Smallest allowed distance between program start addresses
    pub min_program_distance: usize,

    /// Match size `k` for tournaments
    pub viruses_per_match: usize,

    /// Rounds played per program subset
    pub rounds_per_setup: usize,

    /// Placement RNG seed; `None` draws from entropy (matches stop being
    /// replayable, which is the production default)
    pub seed: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            max_threads: DEFAULT_MAX_THREADS,
            cycles_to_completion: DEFAULT_CYCLES,
            max_program_length: DEFAULT_MAX_PROGRAM_LENGTH,
            min_program_distance: DEFAULT_MIN_PROGRAM_DISTANCE,
            viruses_per_match: DEFAULT_VIRUSES_PER_MATCH,
            rounds_per_setup: DEFAULT_ROUNDS_PER_SETUP,
            seed: None,
        }
    }
}

impl VmConfig {
    /// Validate the static bounds. The per-match check against the number
    /// of loaded programs happens in the match controller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size < MIN_MEMORY_SIZE || self.memory_size > MAX_MEMORY_SIZE {
            return Err(ConfigError::MemorySizeOutOfRange(self.memory_size));
        }
        if self.cycles_to_completion == 0 {
            return Err(ConfigError::ZeroCycleBudget);
        }
        if self.max_program_length == 0 {
            return Err(ConfigError::ZeroProgramLength);
        }
        if self.viruses_per_match == 0 {
            return Err(ConfigError::ZeroVirusesPerMatch);
        }
        if self.rounds_per_setup == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        Ok(())
    }
}
