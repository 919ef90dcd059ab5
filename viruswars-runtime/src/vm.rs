//! Match controller
//!
//! Loads compiled programs into the core at shuffled, distance-checked
//! positions, then drives the global clock: one cycle steps one thread
//! of one program, programs rotate round-robin, threads rotate FIFO
//! inside their program. The match ends when the cycle budget runs out
//! or no program has a live thread left.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use viruswars_spec::{Address, CompiledProgram, VmConfig};

use crate::context::{ExecutionContext, ProgramId};
use crate::error::{Result, RuntimeError};
use crate::listener::{EventListener, NullListener};
use crate::program::Program;

/// How a finished match came out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Exactly one program still had live threads
    Victory { winner: ProgramId },
    /// Zero or several programs survived; empty means mutual destruction
    Draw { survivors: Vec<ProgramId> },
}

/// Per-program summary of a finished match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramReport {
    pub id: ProgramId,
    pub name: String,
    /// Core address the program was loaded at
    pub base: Address,
    pub survived: bool,
    pub threads_remaining: usize,
    pub instructions_executed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub cycles_executed: u64,
    pub outcome: MatchOutcome,
    pub programs: Vec<ProgramReport>,
}

impl MatchResult {
    pub fn survivors(&self) -> Vec<ProgramId> {
        match &self.outcome {
            MatchOutcome::Victory { winner } => vec![*winner],
            MatchOutcome::Draw { survivors } => survivors.clone(),
        }
    }
}

/// One configured match over a set of compiled programs. Reusable: each
/// `run` rebuilds all runtime state from the compiled units.
pub struct Vm {
    config: VmConfig,
    programs: Vec<CompiledProgram>,
}

impl Vm {
    pub fn new(config: VmConfig) -> Self {
        Self {
            config,
            programs: Vec::new(),
        }
    }

    /// Register a program; its id is its registration order
    pub fn add_program(&mut self, program: CompiledProgram) -> ProgramId {
        self.programs.push(program);
        self.programs.len() - 1
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Run a match without observation
    pub fn run(&self) -> Result<MatchResult> {
        self.run_with(&mut NullListener)
    }

    /// Run a match, reporting every event to `listener`
    pub fn run_with(&self, listener: &mut dyn EventListener) -> Result<MatchResult> {
        self.validate()?;

        let mut programs: Vec<Program> = self
            .programs
            .iter()
            .enumerate()
            .map(|(id, compiled)| Program::from_compiled(id, compiled))
            .collect();

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut order: Vec<ProgramId> = (0..programs.len()).collect();
        order.shuffle(&mut rng);

        let mut ctx = ExecutionContext::new(
            self.config.memory_size,
            self.config.max_threads,
            listener,
        );

        let bases = self.place(&mut ctx, &mut programs, &order, &mut rng)?;

        let snapshot = ctx.snapshot();
        ctx.listener().on_execution_started(&snapshot);

        let cycles_executed = Self::drive(&mut ctx, &mut programs, &order, self.config.cycles_to_completion);

        ctx.listener().on_execution_completed();

        let survivors: Vec<ProgramId> = programs
            .iter()
            .filter(|p| p.has_threads())
            .map(|p| p.id())
            .collect();

        let outcome = if survivors.len() == 1 {
            MatchOutcome::Victory {
                winner: survivors[0],
            }
        } else {
            MatchOutcome::Draw { survivors }
        };

        let reports = programs
            .iter()
            .map(|p| ProgramReport {
                id: p.id(),
                name: p.name().to_string(),
                base: bases[p.id()],
                survived: p.has_threads(),
                threads_remaining: p.live_threads(),
                instructions_executed: p.instructions_executed(),
            })
            .collect();

        log::info!(
            "match finished after {} cycles: {:?}",
            cycles_executed,
            outcome
        );

        Ok(MatchResult {
            cycles_executed,
            outcome,
            programs: reports,
        })
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.programs.is_empty() {
            return Err(RuntimeError::NoPrograms);
        }
        if self.config.max_threads < self.programs.len() {
            return Err(viruswars_spec::ConfigError::MaxThreadsBelowPrograms {
                max_threads: self.config.max_threads,
                programs: self.programs.len(),
            }
            .into());
        }
        for program in &self.programs {
            if program.len() > self.config.max_program_length {
                return Err(RuntimeError::ProgramTooLong {
                    name: program.name.clone(),
                    len: program.len(),
                    max: self.config.max_program_length,
                });
            }
        }
        Ok(())
    }

    /// Write every program into the core and spawn its initial thread.
    /// The first program of the shuffled order sits at address 0; each
    /// successor starts past the previous program's end, separated by
    /// the minimum distance plus a uniform share of the slack.
    fn place(
        &self,
        ctx: &mut ExecutionContext<'_>,
        programs: &mut [Program],
        order: &[ProgramId],
        rng: &mut StdRng,
    ) -> Result<Vec<Address>> {
        let total_len: usize = programs.iter().map(|p| p.len()).sum();
        // Programs that do not fit at all fail the same way as a gap that
        // is too small
        let free_per = self
            .config
            .memory_size
            .checked_sub(total_len)
            .map(|free| free / programs.len());

        let free_per = match free_per {
            Some(free) if free >= self.config.min_program_distance => free,
            _ => {
                return Err(RuntimeError::InsufficientDistance {
                    free_per: free_per.unwrap_or(0),
                    min_distance: self.config.min_program_distance,
                })
            }
        };
        let slack = free_per - self.config.min_program_distance;

        for &id in order {
            ctx.listener().on_program_added(id, programs[id].name());
        }

        let mut bases = vec![0; programs.len()];
        let mut cursor: Address = 0;
        let mut prev_len = 0usize;

        for (position, &id) in order.iter().enumerate() {
            if position > 0 {
                let gap = self.config.min_program_distance + rng.gen_range(0..=slack);
                cursor = ctx.wrap_add(cursor, (prev_len + gap) as i64);
            }
            let program = &mut programs[id];
            program.write_program(ctx, cursor);
            program.spawn_initial(ctx, cursor);
            log::debug!(
                "placed program {} ({}) at {} ({} cells)",
                id,
                program.name(),
                cursor,
                program.len()
            );
            bases[id] = cursor;
            prev_len = program.len();
        }

        Ok(bases)
    }

    /// The global clock: round-robin over the active program queue,
    /// dropping programs as they drain, stopping early on an empty queue
    fn drive(
        ctx: &mut ExecutionContext<'_>,
        programs: &mut [Program],
        order: &[ProgramId],
        budget: u64,
    ) -> u64 {
        let mut active: VecDeque<ProgramId> = order
            .iter()
            .copied()
            .filter(|&id| programs[id].has_threads())
            .collect();

        let mut cycles = 0u64;
        while cycles < budget {
            let Some(id) = active.pop_front() else {
                break;
            };
            programs[id].step(ctx);
            cycles += 1;
            if programs[id].has_threads() {
                active.push_back(id);
            }
        }
        cycles
    }
}
