//! # Virus Wars Runtime
//!
//! Execution core for the virus wars machine: the circular memory
//! context, programs and their FIFO thread queues, the round-robin match
//! controller, and the k-subset tournament driver.
//!
//! The runtime is single-threaded and cooperative: one cycle of the
//! global clock executes exactly one instruction of exactly one thread,
//! deterministically up to the seeded placement shuffle.
//!
//! ## Example
//!
//! ```rust
//! use viruswars_runtime::{Vm, MatchOutcome};
//! use viruswars_spec::{CompiledProgram, VmConfig};
//!
//! let mut config = VmConfig::default();
//! config.memory_size = 256;
//! config.cycles_to_completion = 10;
//! config.seed = Some(1);
//!
//! let mut vm = Vm::new(config);
//! // start: nop ; jump start
//! vm.add_program(CompiledProgram::new("loop", vec![0x1000_0000, 0x9000_0FFF], 0));
//!
//! let result = vm.run().unwrap();
//! assert_eq!(result.outcome, MatchOutcome::Victory { winner: 0 });
//! ```

pub mod context;
pub mod error;
pub mod listener;
pub mod operand;
pub mod program;
pub mod thread;
pub mod tournament;
pub mod vm;

pub use context::{ExecutionContext, ProgramId, ThreadId};
pub use error::{Result, RuntimeError, ThreadFault};
pub use listener::{EventListener, NullListener};
pub use program::{Program, StepOutcome};
pub use thread::Thread;
pub use tournament::{RoundRecord, Standings, StandingsEntry, Tournament, TournamentResult};
pub use vm::{MatchOutcome, MatchResult, ProgramReport, Vm};
