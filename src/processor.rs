use std::convert::TryFrom;
use std::thread;
use std::time::Duration;

use crate::error::Fault;
use crate::memory::{Byte, Memory, Word};
use crate::output::Output;
use color_eyre::eyre::Result;
use log::*;

pub mod alu;
mod instruction;
pub mod registers;

use alu::AluOp;
pub use instruction::{operand_count, Flow, Instruction};
use registers::{Flags, Registers};

/// Whether the processor still fetches instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Running,
    Halted,
}

/// Emulates the LS-8 CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// General purpose registers, R7 doubles as the stack pointer
    pub registers: Registers,
    /// Program counter
    pub pc: Word,
    /// Flags register
    pub fl: Flags,
    pub state: State,
}

impl Default for Processor {
    /// Initializes a new CPU
    fn default() -> Self {
        Self {
            registers: Registers::default(),
            pc: 0x0000,
            fl: Flags::default(),
            state: State::Running,
        }
    }
}

impl Processor {
    /// Initializes a new CPU
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    /// One line summary of the machine state
    pub fn trace(&self) -> String {
        format!(
            "PC:{:02X} FL:{} R:{:02X?}",
            self.pc,
            self.fl,
            self.registers.as_slice()
        )
    }

    fn reg(&self, index: Byte) -> Result<Byte, Fault> {
        self.registers
            .get(index)
            .ok_or(Fault::InvalidRegister { index, pc: self.pc })
    }

    fn set_reg(&mut self, index: Byte, value: Byte) -> Result<(), Fault> {
        self.registers
            .set(index, value)
            .ok_or(Fault::InvalidRegister { index, pc: self.pc })
    }

    /// Decrements SP and stores `value` at the new top of the stack
    fn push<const S: usize>(&mut self, memory: &mut Memory<S>, value: Byte) -> Result<(), Fault> {
        let sp = self.registers.sp();
        let top = sp
            .checked_sub(1)
            .ok_or(Fault::StackOverflow { sp, pc: self.pc })?;

        memory.write_byte(top as Word, value)?;
        self.registers.set_sp(top);
        Ok(())
    }

    /// Reads the top of the stack and increments SP
    fn pop<const S: usize>(&mut self, memory: &Memory<S>) -> Result<Byte, Fault> {
        let sp = self.registers.sp();
        if sp as usize >= S {
            return Err(Fault::AddressOutOfRange { address: sp as usize });
        }

        let next = match sp.checked_add(1) {
            Some(next) if (next as usize) < S => next,
            _ => return Err(Fault::StackUnderflow { sp, pc: self.pc }),
        };

        let value = memory.read_byte(sp as Word)?;
        self.registers.set_sp(next);
        Ok(value)
    }

    fn arithmetic(&mut self, op: AluOp, a: Byte, b: Byte) -> Result<Byte, Fault> {
        let result = alu::apply(op, self.reg(a)?, self.reg(b)?);
        self.set_reg(a, result)?;
        Ok(result)
    }

    /// Executes a single instruction with its two operand bytes. Operands an
    /// instruction does not take are ignored.
    pub fn execute_instruction<const S: usize, O: Output + ?Sized>(
        &mut self,
        instruction: Instruction,
        a: Byte,
        b: Byte,
        memory: &mut Memory<S>,
        output: &mut O,
    ) -> Result<Flow> {
        let flow = match instruction {
            Instruction::HLT => {
                self.state = State::Halted;

                debug!("{:02X}: HLT", self.pc);
                Flow::Continue
            }
            Instruction::LDI => {
                self.set_reg(a, b)?;

                debug!("{:02X}: LDI R{} {}", self.pc, a, b);
                Flow::Continue
            }
            Instruction::PRN => {
                let value = self.reg(a)?;
                output.emit(value);

                debug!("{:02X}: PRN R{}: {}", self.pc, a, value);
                Flow::Continue
            }
            Instruction::MUL => {
                let result = self.arithmetic(AluOp::Mul, a, b)?;

                debug!("{:02X}: MUL R{} R{}: {}", self.pc, a, b, result);
                Flow::Continue
            }
            Instruction::ADD => {
                let result = self.arithmetic(AluOp::Add, a, b)?;

                debug!("{:02X}: ADD R{} R{}: {}", self.pc, a, b, result);
                Flow::Continue
            }
            Instruction::PUSH => {
                let value = self.reg(a)?;
                self.push(memory, value)?;

                debug!("{:02X}: PUSH R{}: {}", self.pc, a, value);
                Flow::Continue
            }
            Instruction::POP => {
                self.reg(a)?; // validate before touching the stack
                let value = self.pop(memory)?;
                self.set_reg(a, value)?;

                debug!("{:02X}: POP R{}: {}", self.pc, a, value);
                Flow::Continue
            }
            Instruction::CALL => {
                self.reg(a)?;
                let pc = self.pc + 2;
                let ret = Byte::try_from(pc).map_err(|_| Fault::AddressOutOfRange {
                    address: pc as usize,
                })?;
                self.push(memory, ret)?;
                let target = self.reg(a)?;

                debug!(
                    "{:02X}: CALL R{}: 0x{:02X} (return to 0x{:02X})",
                    self.pc, a, target, ret
                );
                Flow::Jump(target as Word)
            }
            Instruction::RET => {
                let target = self.pop(memory)?;

                debug!("{:02X}: RET 0x{:02X}", self.pc, target);
                Flow::Jump(target as Word)
            }
            Instruction::CMP => {
                let (x, y) = (self.reg(a)?, self.reg(b)?);
                self.fl.compare(x, y);

                debug!("{:02X}: CMP R{} R{}: {}", self.pc, a, b, self.fl);
                Flow::Continue
            }
            Instruction::JMP => {
                let target = self.reg(a)?;

                debug!("{:02X}: JMP R{}: 0x{:02X}", self.pc, a, target);
                Flow::Jump(target as Word)
            }
            Instruction::JEQ => self.branch_if(self.fl.contains(Flags::EQF), "JEQ", a)?,
            Instruction::JNE => self.branch_if(!self.fl.contains(Flags::EQF), "JNE", a)?,
        };

        Ok(flow)
    }

    fn branch_if(&self, taken: bool, name: &str, a: Byte) -> Result<Flow, Fault> {
        let target = self.reg(a)?;
        debug!("{:02X}: {} R{}: 0x{:02X} (taken: {})", self.pc, name, a, target, taken);

        Ok(if taken {
            Flow::Jump(target as Word)
        } else {
            Flow::Continue
        })
    }

    fn fetch<const S: usize>(&self, memory: &Memory<S>, offset: Word) -> Result<Byte, Fault> {
        let address = self
            .pc
            .checked_add(offset)
            .ok_or(Fault::AddressOutOfRange {
                address: self.pc as usize + offset as usize,
            })?;
        memory.read_byte(address)
    }

    /// Fetches operand byte `offset`. Bytes past the end of memory read as 0
    /// unless `instruction` actually takes that operand.
    fn fetch_operand<const S: usize>(
        &self,
        memory: &Memory<S>,
        instruction: Instruction,
        offset: Word,
    ) -> Result<Byte, Fault> {
        match self.fetch(memory, offset) {
            Err(Fault::AddressOutOfRange { .. })
                if offset > instruction.operand_count() as Word =>
            {
                Ok(0)
            }
            fetched => fetched,
        }
    }

    /// Runs one fetch-decode-execute cycle. Does nothing once halted.
    pub fn step<const S: usize, O: Output + ?Sized>(
        &mut self,
        memory: &mut Memory<S>,
        output: &mut O,
    ) -> Result<State> {
        if self.is_halted() {
            return Ok(self.state);
        }

        let opcode = self.fetch(memory, 0)?; // Read opcode where PC is
        let instruction = Instruction::try_from(opcode)
            .map_err(|_| Fault::InvalidOpcode { opcode, pc: self.pc })?;
        let a = self.fetch_operand(memory, instruction, 1)?;
        let b = self.fetch_operand(memory, instruction, 2)?;

        trace!("{}", self.trace());
        match self.execute_instruction(instruction, a, b, memory, output)? {
            Flow::Jump(address) => self.pc = address,
            Flow::Continue => self.pc += instruction.len(),
        }

        Ok(self.state)
    }

    /// Runs the program until it halts. Returns the number of executed instructions.
    pub fn run_until_halt<const S: usize, O: Output + ?Sized>(
        &mut self,
        memory: &mut Memory<S>,
        output: &mut O,
    ) -> Result<usize> {
        let mut cycles = 0;
        while !self.is_halted() {
            self.step(memory, output)?;
            cycles += 1;
        }

        info!("Program halted after {} instructions", cycles);
        Ok(cycles)
    }

    /// Like [`Processor::run_until_halt`], but executes one instruction per `period`
    pub fn run_with_clock<const S: usize, O: Output + ?Sized>(
        &mut self,
        memory: &mut Memory<S>,
        output: &mut O,
        period: Duration,
    ) -> Result<usize> {
        let mut cycles = 0;
        while self.step(memory, output)? == State::Running {
            cycles += 1;
            thread::sleep(period);
        }

        info!("Program halted after {} instructions", cycles + 1);
        Ok(cycles + 1)
    }
}
