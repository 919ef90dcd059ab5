//! Runtime program state: shared registers and the thread queue
//!
//! Threads of one program advance in strict FIFO order: the scheduler
//! pops the head, runs one instruction, and pushes the survivor to the
//! tail. The program also owns the 16 shared registers every one of its
//! threads can reach as `s1..s16`.

use std::collections::VecDeque;

use viruswars_spec::{Address, CompiledProgram, Word, REGISTERS_PER_BANK};

use crate::context::{ExecutionContext, ProgramId};
use crate::thread::Thread;

/// What one scheduler tick against a program produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No thread to run
    Idle,
    /// Ran one instruction, threads remain
    Progressing,
    /// Ran one instruction and the last thread died
    Drained,
}

pub struct Program {
    id: ProgramId,
    name: String,
    code: Vec<Word>,
    start_offset: usize,
    pub(crate) shared_regs: [Word; REGISTERS_PER_BANK],
    threads: VecDeque<Thread>,
    instructions_executed: u64,
}

impl Program {
    pub fn from_compiled(id: ProgramId, compiled: &CompiledProgram) -> Self {
        Self {
            id,
            name: compiled.name.clone(),
            code: compiled.code.clone(),
            start_offset: compiled.start_offset,
            shared_regs: [0; REGISTERS_PER_BANK],
            threads: VecDeque::new(),
            instructions_executed: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cells this program occupies in the core
    #[inline]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    #[inline]
    pub fn live_threads(&self) -> usize {
        self.threads.len()
    }

    #[inline]
    pub fn has_threads(&self) -> bool {
        !self.threads.is_empty()
    }

    #[inline]
    pub fn instructions_executed(&self) -> u64 {
        self.instructions_executed
    }

    /// Bulk-store the instruction vector into the core at `base`
    pub fn write_program(&self, ctx: &mut ExecutionContext<'_>, base: Address) {
        ctx.set_scope(self.id, 0);
        ctx.write_block(base, &self.code);
    }

    /// Create the match-start thread at `base + start_offset`
    pub fn spawn_initial(&mut self, ctx: &mut ExecutionContext<'_>, base: Address) -> bool {
        let pc = ctx.wrap_add(base, self.start_offset as i64);
        if !ctx.try_acquire_thread() {
            log::warn!("program {} ({}): initial thread denied", self.id, self.name);
            ctx.listener().on_thread_create_failed(self.id);
            return false;
        }
        let tid = ctx.new_thread_id();
        self.threads.push_back(Thread::new(tid, pc));
        ctx.listener().on_thread_created(self.id, tid);
        true
    }

    /// FORK path: spawn a sibling thread carrying a copy of the parent's
    /// private registers. False when the global cap denies the slot.
    pub(crate) fn create_thread(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        pc: Address,
        template: &Thread,
    ) -> bool {
        if !ctx.try_acquire_thread() {
            ctx.listener().on_thread_create_failed(self.id);
            return false;
        }
        let tid = ctx.new_thread_id();
        self.threads.push_back(Thread::forked(tid, pc, template));
        ctx.listener().on_thread_created(self.id, tid);
        true
    }

    /// Run one instruction of the head thread
    pub fn step(&mut self, ctx: &mut ExecutionContext<'_>) -> StepOutcome {
        let Some(mut thread) = self.threads.pop_front() else {
            return StepOutcome::Idle;
        };

        ctx.set_scope(self.id, thread.id());
        self.instructions_executed += 1;

        match thread.step(ctx, self) {
            Ok(()) => self.threads.push_back(thread),
            Err(fault) => {
                log::debug!(
                    "program {} ({}) thread {} terminated: {}",
                    self.id,
                    self.name,
                    thread.id(),
                    fault
                );
                ctx.listener().on_thread_terminated(self.id, thread.id());
                ctx.release_thread();
            }
        }

        if self.threads.is_empty() {
            StepOutcome::Drained
        } else {
            StepOutcome::Progressing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::NullListener;
    use viruswars_spec::{Instruction, Param};

    fn compiled(instructions: &[Instruction], start_offset: usize) -> CompiledProgram {
        let code = instructions.iter().map(|i| i.encode().unwrap()).collect();
        CompiledProgram::new("test", code, start_offset)
    }

    #[test]
    fn test_write_and_spawn() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let source = compiled(&[Instruction::Nop, Instruction::Nop], 1);
        let mut program = Program::from_compiled(0, &source);

        program.write_program(&mut ctx, 250);
        assert!(program.spawn_initial(&mut ctx, 250));
        assert_eq!(program.live_threads(), 1);
        assert_eq!(ctx.live_threads(), 1);

        // entry thread sits at wrap(250 + 1)
        assert_eq!(program.step(&mut ctx), StepOutcome::Progressing);
    }

    #[test]
    fn test_spawn_denied_at_cap() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 1, &mut listener);
        let source = compiled(&[Instruction::Nop], 0);
        let mut a = Program::from_compiled(0, &source);
        let mut b = Program::from_compiled(1, &source);

        assert!(a.spawn_initial(&mut ctx, 0));
        assert!(!b.spawn_initial(&mut ctx, 100));
        assert_eq!(b.live_threads(), 0);
        assert_eq!(ctx.live_threads(), 1);
    }

    #[test]
    fn test_idle_when_no_threads() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let source = compiled(&[Instruction::Nop], 0);
        let mut program = Program::from_compiled(0, &source);
        assert_eq!(program.step(&mut ctx), StepOutcome::Idle);
    }

    #[test]
    fn test_drained_on_fault() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        // executing an untouched cell is a DATA fetch
        let source = compiled(&[], 0);
        let mut program = Program::from_compiled(0, &source);
        assert!(program.spawn_initial(&mut ctx, 17));

        assert_eq!(program.step(&mut ctx), StepOutcome::Drained);
        assert_eq!(program.live_threads(), 0);
        assert_eq!(ctx.live_threads(), 0);
        assert_eq!(program.instructions_executed(), 1);
    }

    #[test]
    fn test_fifo_rotation() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 8, &mut listener);
        // fork 0 would loop; use two nops so both threads just advance
        let source = compiled(&[Instruction::Nop, Instruction::Nop], 0);
        let mut program = Program::from_compiled(0, &source);
        program.write_program(&mut ctx, 0);
        assert!(program.spawn_initial(&mut ctx, 0));
        assert!(program.spawn_initial(&mut ctx, 0));
        assert_eq!(program.live_threads(), 2);

        // four steps: each thread runs twice, alternating
        for _ in 0..4 {
            assert_eq!(program.step(&mut ctx), StepOutcome::Progressing);
        }
        assert_eq!(program.instructions_executed(), 4);
    }

    #[test]
    fn test_fork_appends_to_queue() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 8, &mut listener);
        let source = compiled(
            &[
                Instruction::Fork {
                    offset: Param::literal(1),
                },
                Instruction::Nop,
            ],
            0,
        );
        let mut program = Program::from_compiled(0, &source);
        program.write_program(&mut ctx, 0);
        assert!(program.spawn_initial(&mut ctx, 0));

        assert_eq!(program.step(&mut ctx), StepOutcome::Progressing);
        assert_eq!(program.live_threads(), 2);
        assert_eq!(ctx.live_threads(), 2);
    }
}
