//!
//! A complete Kora system: the cpu plus the canonical bus layout.
//!
//! | Device    | Base         | Size   |
//! |-----------|--------------|--------|
//! | ram       | `0x00000000` | config |
//! | uart tx   | `0x00800000` | `0x08` |
//! | video     | `0x00800100` | `0x0f` |
//! | ps/2 mouse| `0x00800200` | `0x08` |
//!
//! The video window is served by a [Latch] since there is no display to draw on.
//!

use crate::bus::{Bus, DeviceId};
use crate::config::{Config, DEFAULT_BATCH_SIZE};
use crate::cpu::{Cpu, Halt, Step};
use crate::devices::{hex, Latch, Ps2Mouse, Ram, UartTx};
use crate::error::Error;
use crate::instruction::Instruction;
use owo_colors::OwoColorize;
use std::fs::File;
use std::io::BufReader;

pub const RAM_BASE: u32 = 0x0000_0000;
pub const UART_BASE: u32 = 0x0080_0000;
pub const UART_SIZE: u32 = 0x08;
pub const VIDEO_BASE: u32 = 0x0080_0100;
pub const VIDEO_SIZE: u32 = 0x0f;
pub const MOUSE_BASE: u32 = 0x0080_0200;
pub const MOUSE_SIZE: u32 = 0x08;

pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    mouse: DeviceId,
    trace: bool,
    batch_size: u64,
}

impl Machine {
    /// Builds the machine and boots it from `config.file`
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut ram = Ram::new(config.ram_size as usize);
        ram.load_from_reader(&mut BufReader::new(File::open(&config.file)?))?;

        let mut machine = Self::with_devices(ram, UartTx::stdout());
        machine.set_trace(config.trace);
        machine.set_batch_size(config.batch_size);
        Ok(machine)
    }

    /// Boots from an in-memory image, sending the uart output to `uart`
    pub fn from_image(image: &[u8], ram_size: u32, uart: UartTx) -> Result<Self, Error> {
        let mut ram = Ram::new(ram_size as usize);
        ram.load(image)?;
        Ok(Self::with_devices(ram, uart))
    }

    fn with_devices(ram: Ram, uart: UartTx) -> Self {
        let ram_size = ram.size() as u32;

        let mut bus = Bus::new();
        bus.add_device(ram, RAM_BASE, ram_size);
        bus.add_device(uart, UART_BASE, UART_SIZE);
        bus.add_device(Latch::new(), VIDEO_BASE, VIDEO_SIZE);
        let mouse = bus.add_device(Ps2Mouse::new(), MOUSE_BASE, MOUSE_SIZE);

        Self {
            cpu: Cpu::new(),
            bus,
            mouse,
            trace: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Instructions [Machine::run] executes between two host checkpoints
    pub fn set_batch_size(&mut self, batch_size: u64) {
        self.batch_size = batch_size.max(1);
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// The mouse, for the host to queue events on between batches
    pub fn mouse_mut(&mut self) -> Option<&mut Ps2Mouse> {
        self.bus
            .device_mut(self.mouse)
            .and_then(|device| device.as_ps2_mouse_mut())
    }

    pub fn step(&mut self) -> Result<Step, Error> {
        if self.trace {
            self.trace_instruction();
        }
        self.cpu.step(&mut self.bus)
    }

    fn trace_instruction(&self) {
        let pc = self.cpu.pc();
        // peeking keeps side-effecting devices out of the trace
        if let Some(word) = self.bus.peek(pc) {
            eprintln!("{} {:?}", hex(&pc).bright_blue(), Instruction::from(word));
        }
    }

    /// Runs at most `n` instructions, stopping early if the program halts
    pub fn run_batch(&mut self, n: u64) -> Result<Option<Halt>, Error> {
        for _ in 0..n {
            if let Step::Halt(halt) = self.step()? {
                return Ok(Some(halt));
            }
        }
        Ok(None)
    }

    /// Runs until the program halts or faults
    pub fn run(&mut self) -> Result<Halt, Error> {
        loop {
            if let Some(halt) = self.run_batch(self.batch_size)? {
                return Ok(halt);
            }
        }
    }
}
