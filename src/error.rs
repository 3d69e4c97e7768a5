use crate::bus::BusError;
use crate::devices::{hex, DeviceError};
use owo_colors::OwoColorize;
use std::io;
use thiserror::Error;

/// Everything that can go wrong while decoding or executing a single instruction
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Unaligned {op} at address {}", hex(.addr).bright_yellow())]
    UnalignedAccess { op: &'static str, addr: u32 },

    #[error("Unsupported CSR {0:#05x}")]
    UnsupportedCsr(u32),

    #[error("Unknown opcode {0:#04x}")]
    UnknownOpcode(u32),

    #[error("Invalid funct3 {} for opcode {opcode:#04x}", .funct3.bright_yellow())]
    InvalidFunct3 { opcode: u32, funct3: u32 },

    #[error("Invalid funct7 {funct7:#09b} for opcode {opcode:#04x}")]
    InvalidFunct7 { opcode: u32, funct7: u32 },

    #[error("Unknown instruction {}", hex(.0).bright_yellow())]
    UnknownInstruction(u32),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Bus(#[from] BusError),
    #[error("{0}")]
    Exec(#[from] ExecError),
    /// Loading the boot image or creating the machine failed on the host side
    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Device(#[from] DeviceError),
    #[error("{} at PC {}", err.bold(), hex(.pc).bright_blue())]
    AtPc { err: Box<Error>, pc: u32 },
}

impl Error {
    /// The error without any pc attached to it
    pub fn root(&self) -> &Error {
        match self {
            Error::AtPc { err, .. } => err.root(),
            err => err,
        }
    }

    pub fn pc(&self) -> Option<u32> {
        match self {
            Error::AtPc { pc, .. } => Some(*pc),
            _ => None,
        }
    }
}

/// Attaches the pc of the faulting instruction to an error
pub trait WithPc {
    fn with_pc(self, pc: u32) -> Error;
}

impl WithPc for Error {
    fn with_pc(self, pc: u32) -> Error {
        match self {
            Error::AtPc { err, .. } => Error::AtPc { err, pc },
            _ => Error::AtPc {
                err: Box::new(self),
                pc,
            },
        }
    }
}

macro_rules! impl_with_pc {
    ($type:ty) => {
        impl WithPc for $type {
            fn with_pc(self, pc: u32) -> Error {
                Error::AtPc {
                    err: Box::new(self.into()),
                    pc,
                }
            }
        }
    };
}

impl_with_pc! { BusError }
impl_with_pc! { ExecError }
impl_with_pc! { DeviceError }
