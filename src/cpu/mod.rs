//!
//! The Kora processor: a single-issue interpreter for the RV32I base integer set (without
//! interrupts or privilege levels) plus the two read-only cycle counter CSRs.
//!
//! [Cpu::step] fetches, decodes and executes exactly one instruction. The cpu doesn't own its
//! [Bus]; the caller passes it in on every step, so the host can reach the devices in between.
//!

use crate::bus::Bus;
use crate::error::{Error, WithPc};
use crate::instruction::Instruction;
use owo_colors::OwoColorize;
use std::fmt;

mod execute;
mod into_register;
use into_register::*;

/// Why the program stopped on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    Ecall,
    Ebreak,
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Ecall => write!(f, "ECALL"),
            Halt::Ebreak => write!(f, "EBREAK"),
        }
    }
}

/// Returned by [Cpu::step]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The instruction at `pc` was an ECALL or EBREAK. Nothing was modified.
    Halt(Halt),
}

#[derive(Debug, Default, Clone)]
pub struct Cpu {
    registers: [u32; 32],
    pc: u32,
    cycle_count: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// Instructions completed so far
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn registers(&self) -> &[u32; 32] {
        &self.registers
    }

    /// Value of register `x{i}`. Only the low 5 bits of `i` are used.
    pub fn register(&self, i: u32) -> u32 {
        self.reg(i & 0x1f)
    }

    /// Writes `x{i}`, with `i` masked like in [Cpu::register]. Writes to x0 are discarded.
    pub fn set_register(&mut self, i: u32, x: u32) {
        self.set_reg(i & 0x1f, x);
    }

    #[inline]
    fn reg<T: FromRegister>(&self, i: u32) -> T {
        T::from_register(self.registers[i as usize])
    }

    #[inline]
    fn set_reg<T: IntoRegister>(&mut self, i: u32, x: T) {
        if i != 0 {
            self.registers[i as usize] = x.into_register();
        }
    }

    /// Runs one instruction.
    ///
    /// On error, the registers, pc and cycle counter are left exactly as they were before the
    /// faulting instruction, and the error carries its pc.
    pub fn step(&mut self, bus: &mut Bus) -> Result<Step, Error> {
        let pc = self.pc;
        let word = bus.read(pc).map_err(|e| e.with_pc(pc))?;

        match self.execute(bus, Instruction::from(word)).map_err(|e| e.with_pc(pc))? {
            Some(halt) => Ok(Step::Halt(halt)),
            None => {
                self.cycle_count += 1;
                Ok(Step::Continue)
            }
        }
    }

    pub fn print_state(&self) {
        eprintln!("{}", "Registers:".bright_blue());
        for (i, x) in self.registers.iter().enumerate() {
            eprint!("{}{:02}: {:08x} ", "x".bright_blue(), i.bright_blue(), x);
            if i % 4 == 3 {
                eprintln!();
            }
        }
        eprintln!(
            "{} {:08x}  {} {}",
            "pc:".bright_blue(),
            self.pc,
            "cycles:".bright_blue(),
            self.cycle_count
        );
    }
}
