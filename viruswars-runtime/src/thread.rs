//! Thread state and single-instruction execution
//!
//! A thread is a program counter and a private register bank. One call
//! to [`Thread::step`] fetches, decodes and retires exactly one
//! instruction; any fault terminates the thread and nothing else.
//!
//! Memory access order within a step is fixed: operand A resolution and
//! reads, operand B resolution and reads, the write if any, then the pc
//! update. Operand indirection is PC-relative with at most two levels:
//! `addr1 = wrap(pc + offset)`, and for the second level
//! `addr2 = wrap(addr1 + data(read(addr1)))`.

use viruswars_disassembler::decode;
use viruswars_spec::encoding::{data_value_of, encode_data};
use viruswars_spec::{Address, Instruction, Param, Word, REGISTERS_PER_BANK};

use crate::context::{ExecutionContext, ThreadId};
use crate::error::ThreadFault;
use crate::operand::ResolvedOperand;
use crate::program::Program;

/// Private slot of the conventional result register `r1`
const RESULT_SLOT: usize = 0;

#[derive(Debug, Clone)]
pub struct Thread {
    id: ThreadId,
    pc: Address,
    regs: [Word; REGISTERS_PER_BANK],
}

enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Thread {
    /// Fresh thread with a zeroed register bank
    pub fn new(id: ThreadId, pc: Address) -> Self {
        Self {
            id,
            pc,
            regs: [0; REGISTERS_PER_BANK],
        }
    }

    /// FORK child: inherits a copy of the parent's private registers
    pub fn forked(id: ThreadId, pc: Address, parent: &Thread) -> Self {
        Self {
            id,
            pc,
            regs: parent.regs,
        }
    }

    #[inline]
    pub fn id(&self) -> ThreadId {
        self.id
    }

    #[inline]
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Execute one instruction. `Err` means the thread is dead.
    pub fn step(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        program: &mut Program,
    ) -> Result<(), ThreadFault> {
        let word = ctx.fetch(self.pc);

        match decode(word) {
            Instruction::Data { .. } => Err(ThreadFault::ExecutedData),

            Instruction::Nop => {
                self.advance(ctx);
                Ok(())
            }

            Instruction::Assign { dst, src } => {
                let dst = self.resolve(ctx, program, &dst);
                let src = self.resolve(ctx, program, &src);
                let word = self.read_word(ctx, program, src);
                self.write_word(ctx, program, dst, word)?;
                self.advance(ctx);
                Ok(())
            }

            Instruction::Add { dst, src } => self.arithmetic(ctx, program, dst, src, ArithOp::Add),
            Instruction::Sub { dst, src } => self.arithmetic(ctx, program, dst, src, ArithOp::Sub),
            Instruction::Mul { dst, src } => self.arithmetic(ctx, program, dst, src, ArithOp::Mul),
            Instruction::Div { dst, src } => self.arithmetic(ctx, program, dst, src, ArithOp::Div),
            Instruction::Mod { dst, src } => self.arithmetic(ctx, program, dst, src, ArithOp::Mod),

            Instruction::Compare { lhs, rhs } => {
                let lhs = self.resolve(ctx, program, &lhs);
                let a = self.read_data(ctx, program, lhs) as i64;
                let rhs = self.resolve(ctx, program, &rhs);
                let b = self.read_data(ctx, program, rhs) as i64;
                self.regs[RESULT_SLOT] = encode_data((a - b).signum() as i32);
                self.advance(ctx);
                Ok(())
            }

            Instruction::Jump { offset } => {
                let displacement = self.branch_displacement(ctx, program, &offset);
                self.pc = ctx.wrap_add(self.pc, displacement);
                Ok(())
            }

            Instruction::JumpZero { cond, offset } => {
                self.conditional_jump(ctx, program, cond, offset, |v| v == 0)
            }
            Instruction::JumpNotZero { cond, offset } => {
                self.conditional_jump(ctx, program, cond, offset, |v| v != 0)
            }
            Instruction::JumpLess { cond, offset } => {
                self.conditional_jump(ctx, program, cond, offset, |v| v < 0)
            }
            Instruction::JumpGreater { cond, offset } => {
                self.conditional_jump(ctx, program, cond, offset, |v| v > 0)
            }

            Instruction::DecJumpNotZero { counter, offset } => {
                let counter = self.resolve(ctx, program, &counter);
                let raw = self.read_word(ctx, program, counter) as i64;
                let displacement = self.branch_displacement(ctx, program, &offset);
                let stored = encode_data((raw - 1) as i32);
                self.write_word(ctx, program, counter, stored)?;
                if data_value_of(stored) != 0 {
                    self.pc = ctx.wrap_add(self.pc, displacement);
                } else {
                    self.advance(ctx);
                }
                Ok(())
            }

            Instruction::Fork { offset } => {
                let displacement = self.branch_displacement(ctx, program, &offset);
                let child_pc = ctx.wrap_add(self.pc, displacement);
                let created = program.create_thread(ctx, child_pc, &*self);
                self.regs[RESULT_SLOT] = encode_data(created as i32);
                self.advance(ctx);
                Ok(())
            }
        }
    }

    fn advance(&mut self, ctx: &ExecutionContext<'_>) {
        self.pc = ctx.wrap_add(self.pc, 1);
    }

    fn arithmetic(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        program: &mut Program,
        dst: Param,
        src: Param,
        op: ArithOp,
    ) -> Result<(), ThreadFault> {
        let dst = self.resolve(ctx, program, &dst);
        let a = self.read_data(ctx, program, dst) as i64;
        let src = self.resolve(ctx, program, &src);
        let b = self.read_data(ctx, program, src) as i64;

        let value = match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => {
                if b == 0 {
                    return Err(ThreadFault::DivisionByZero);
                }
                a / b
            }
            ArithOp::Mod => {
                if b == 0 {
                    return Err(ThreadFault::ModuloByZero);
                }
                a % b
            }
        };

        self.write_data(ctx, program, dst, value)?;
        self.advance(ctx);
        Ok(())
    }

    fn conditional_jump(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        program: &mut Program,
        cond: Param,
        offset: Param,
        test: fn(i32) -> bool,
    ) -> Result<(), ThreadFault> {
        let cond = self.resolve(ctx, program, &cond);
        let value = self.read_data(ctx, program, cond);
        let displacement = self.branch_displacement(ctx, program, &offset);
        if test(value) {
            self.pc = ctx.wrap_add(self.pc, displacement);
        } else {
            self.advance(ctx);
        }
        Ok(())
    }

    /// Operand B of every control-flow instruction, as a data value
    fn branch_displacement(
        &self,
        ctx: &mut ExecutionContext<'_>,
        program: &Program,
        offset: &Param,
    ) -> i64 {
        let offset = self.resolve(ctx, program, offset);
        self.read_data(ctx, program, offset) as i64
    }

    // ========================================================================
    // Operand resolution and access
    // ========================================================================

    /// Walk a parameter down to its storage site, performing the
    /// indirection reads along the way
    fn resolve(
        &self,
        ctx: &mut ExecutionContext<'_>,
        program: &Program,
        param: &Param,
    ) -> ResolvedOperand {
        match *param {
            Param::Literal { value } => ResolvedOperand::Immediate(value as i32),

            Param::Register { reg, deref: 0 } => {
                if reg.is_shared() {
                    ResolvedOperand::SharedReg(reg.slot())
                } else {
                    ResolvedOperand::PrivateReg(reg.slot())
                }
            }

            Param::Register { reg, deref } => {
                let offset = data_value_of(self.register_word(program, reg.is_shared(), reg.slot()));
                self.indirect(ctx, offset as i64, deref)
            }

            Param::Indirect { offset, deref } => self.indirect(ctx, offset as i64, deref),
        }
    }

    fn indirect(&self, ctx: &mut ExecutionContext<'_>, offset: i64, deref: u8) -> ResolvedOperand {
        let mut addr = ctx.wrap_add(self.pc, offset);
        if deref >= 2 {
            let pointer = data_value_of(ctx.read(addr));
            addr = ctx.wrap_add(addr, pointer as i64);
        }
        ResolvedOperand::Memory(addr)
    }

    fn register_word(&self, program: &Program, shared: bool, slot: usize) -> Word {
        if shared {
            program.shared_regs[slot]
        } else {
            self.regs[slot]
        }
    }

    /// Read an operand as an opaque 32-bit word
    fn read_word(
        &self,
        ctx: &mut ExecutionContext<'_>,
        program: &Program,
        operand: ResolvedOperand,
    ) -> Word {
        match operand {
            ResolvedOperand::Immediate(value) => value as Word,
            ResolvedOperand::PrivateReg(slot) => self.regs[slot],
            ResolvedOperand::SharedReg(slot) => program.shared_regs[slot],
            ResolvedOperand::Memory(addr) => ctx.read(addr),
        }
    }

    /// Read an operand as a signed data value
    fn read_data(
        &self,
        ctx: &mut ExecutionContext<'_>,
        program: &Program,
        operand: ResolvedOperand,
    ) -> i32 {
        match operand {
            ResolvedOperand::Immediate(value) => value,
            other => data_value_of(self.read_word(ctx, program, other)),
        }
    }

    /// Store an opaque word through an operand
    fn write_word(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        program: &mut Program,
        operand: ResolvedOperand,
        word: Word,
    ) -> Result<(), ThreadFault> {
        match operand {
            ResolvedOperand::Immediate(_) => Err(ThreadFault::WriteToImmediate),
            ResolvedOperand::PrivateReg(slot) => {
                self.regs[slot] = word;
                Ok(())
            }
            ResolvedOperand::SharedReg(slot) => {
                program.shared_regs[slot] = word;
                Ok(())
            }
            ResolvedOperand::Memory(addr) => {
                ctx.write(addr, word);
                Ok(())
            }
        }
    }

    /// Store a data value: truncated to 28 bits and laid down as a DATA
    /// cell (or a data-encoded register word)
    fn write_data(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        program: &mut Program,
        operand: ResolvedOperand,
        value: i64,
    ) -> Result<(), ThreadFault> {
        self.write_word(ctx, program, operand, encode_data(value as i32))
    }

    /// Test hook: peek at a private register slot
    #[cfg(test)]
    pub(crate) fn reg(&self, slot: usize) -> Word {
        self.regs[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::NullListener;
    use viruswars_spec::Register;

    fn setup(code: &[Instruction]) -> (Vec<Word>, Program) {
        let words: Vec<Word> = code.iter().map(|i| i.encode().unwrap()).collect();
        let compiled = viruswars_spec::CompiledProgram::new("t", words.clone(), 0);
        (words, Program::from_compiled(0, &compiled))
    }

    fn run_one(
        ctx: &mut ExecutionContext<'_>,
        program: &mut Program,
        thread: &mut Thread,
    ) -> Result<(), ThreadFault> {
        ctx.set_scope(0, thread.id());
        thread.step(ctx, program)
    }

    fn load(ctx: &mut ExecutionContext<'_>, words: &[Word]) {
        ctx.write_block(0, words);
    }

    #[test]
    fn test_nop_advances_pc() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Nop]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(thread.pc(), 1);
    }

    #[test]
    fn test_data_terminates() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let mut thread = Thread::new(0, 10);
        let (_, mut program) = setup(&[]);
        // cell 10 is zero-initialized, i.e. `data 0`
        let err = run_one(&mut ctx, &mut program, &mut thread).unwrap_err();
        assert_eq!(err, ThreadFault::ExecutedData);
    }

    #[test]
    fn test_assign_to_register() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Assign {
            dst: Param::Register {
                reg: Register::private(2).unwrap(),
                deref: 0,
            },
            src: Param::literal(-7),
        }]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        // raw-word semantics: the sign-extended literal as a 32-bit word
        assert_eq!(thread.reg(1), (-7i32) as u32);
    }

    #[test]
    fn test_assign_memory_copies_raw_words() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Assign {
            dst: Param::Indirect { offset: 5, deref: 1 },
            src: Param::Indirect { offset: 6, deref: 1 },
        }]);
        load(&mut ctx, &words);
        ctx.write(6, 0xABCD_1234);

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(ctx.read(5), 0xABCD_1234);
    }

    #[test]
    fn test_write_to_immediate_faults() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Assign {
            dst: Param::literal(3),
            src: Param::literal(4),
        }]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        let err = run_one(&mut ctx, &mut program, &mut thread).unwrap_err();
        assert_eq!(err, ThreadFault::WriteToImmediate);
    }

    #[test]
    fn test_arithmetic_on_shared_register() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let s1 = Param::Register {
            reg: Register::shared(1).unwrap(),
            deref: 0,
        };
        let (words, mut program) = setup(&[
            Instruction::Assign { dst: s1, src: Param::literal(40) },
            Instruction::Add { dst: s1, src: Param::literal(2) },
        ]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(program.shared_regs[0]), 42);
    }

    #[test]
    fn test_arithmetic_wraps_modulo_28_bits() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let r2 = Param::Register {
            reg: Register::private(2).unwrap(),
            deref: 0,
        };
        let (words, mut program) = setup(&[
            Instruction::Assign {
                dst: r2,
                src: Param::literal(2047),
            },
            Instruction::Mul { dst: r2, src: r2 },
            Instruction::Mul { dst: r2, src: r2 },
        ]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        for _ in 0..3 {
            run_one(&mut ctx, &mut program, &mut thread).unwrap();
        }
        let expected = ((2047i64 * 2047).pow(2) as i64).rem_euclid(1 << 28);
        let expected = data_value_of(expected as u32 & 0x0FFF_FFFF);
        assert_eq!(data_value_of(thread.reg(1)), expected);
    }

    #[test]
    fn test_division_faults() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let r1 = Param::Register {
            reg: Register::private(1).unwrap(),
            deref: 0,
        };
        let (words, mut program) = setup(&[Instruction::Div {
            dst: r1,
            src: Param::literal(0),
        }]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        let err = run_one(&mut ctx, &mut program, &mut thread).unwrap_err();
        assert_eq!(err, ThreadFault::DivisionByZero);

        let (words, mut program) = setup(&[Instruction::Mod {
            dst: r1,
            src: Param::literal(0),
        }]);
        load(&mut ctx, &words);
        let mut thread = Thread::new(1, 0);
        let err = run_one(&mut ctx, &mut program, &mut thread).unwrap_err();
        assert_eq!(err, ThreadFault::ModuloByZero);
    }

    #[test]
    fn test_compare_sets_r1() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[
            Instruction::Compare {
                lhs: Param::literal(3),
                rhs: Param::literal(10),
            },
            Instruction::Compare {
                lhs: Param::literal(10),
                rhs: Param::literal(10),
            },
            Instruction::Compare {
                lhs: Param::literal(10),
                rhs: Param::literal(3),
            },
        ]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(thread.reg(RESULT_SLOT)), -1);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(thread.reg(RESULT_SLOT)), 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(thread.reg(RESULT_SLOT)), 1);
    }

    #[test]
    fn test_jump_is_pc_relative_and_wraps() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Jump {
            offset: Param::literal(-2),
        }]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(thread.pc(), 254);
    }

    #[test]
    fn test_conditional_jumps() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let r1 = Param::Register {
            reg: Register::private(1).unwrap(),
            deref: 0,
        };
        let (words, mut program) = setup(&[Instruction::JumpZero {
            cond: r1,
            offset: Param::literal(10),
        }]);
        load(&mut ctx, &words);

        // r1 == 0: taken
        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(thread.pc(), 10);

        // r1 != 0: falls through
        let mut thread = Thread::new(1, 0);
        thread.regs[0] = 5;
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(thread.pc(), 1);
    }

    #[test]
    fn test_dec_jump_counts_down() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 8, &mut listener);
        let r2 = Param::Register {
            reg: Register::private(2).unwrap(),
            deref: 0,
        };
        let (words, mut program) = setup(&[Instruction::DecJumpNotZero {
            counter: r2,
            offset: Param::literal(0),
        }]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        thread.regs[1] = 3;

        // 3 -> 2: branch taken, pc stays at 0
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(thread.reg(1)), 2);
        assert_eq!(thread.pc(), 0);

        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(thread.reg(1)), 1);
        assert_eq!(thread.pc(), 0);

        // 1 -> 0: falls through
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(thread.reg(1)), 0);
        assert_eq!(thread.pc(), 1);
    }

    #[test]
    fn test_dec_jump_through_zero_goes_negative() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 8, &mut listener);
        let (words, mut program) = setup(&[Instruction::DecJumpNotZero {
            counter: Param::Indirect { offset: 3, deref: 1 },
            offset: Param::literal(2),
        }]);
        load(&mut ctx, &words);
        // cell 3 holds data 0; decrementing stores data -1 and branches
        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(data_value_of(ctx.read(3)), -1);
        assert_eq!(thread.pc(), 2);
    }

    #[test]
    fn test_two_level_indirection() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Assign {
            dst: Param::Indirect { offset: 4, deref: 2 },
            src: Param::literal(9),
        }]);
        load(&mut ctx, &words);
        // addr1 = wrap(0 + 4) = 4; its data value 10 points the write at
        // addr2 = wrap(4 + 10) = 14
        ctx.write(4, encode_data(10));

        let mut thread = Thread::new(0, 0);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        assert_eq!(ctx.read(14), 9);
    }

    #[test]
    fn test_register_indirection_uses_register_offset() {
        let mut listener = NullListener;
        let mut ctx = ExecutionContext::new(256, 4, &mut listener);
        let (words, mut program) = setup(&[Instruction::Assign {
            dst: Param::Register {
                reg: Register::private(3).unwrap(),
                deref: 1,
            },
            src: Param::literal(77),
        }]);
        load(&mut ctx, &words);

        let mut thread = Thread::new(0, 0);
        thread.regs[2] = encode_data(20);
        run_one(&mut ctx, &mut program, &mut thread).unwrap();
        // write lands at wrap(pc + r3) = 20
        assert_eq!(ctx.read(20), 77);
    }

    #[test]
    fn test_forked_thread_inherits_registers() {
        let parent = {
            let mut t = Thread::new(0, 5);
            t.regs[3] = 1234;
            t
        };
        let child = Thread::forked(1, 9, &parent);
        assert_eq!(child.id(), 1);
        assert_eq!(child.pc(), 9);
        assert_eq!(child.reg(3), 1234);
    }
}
