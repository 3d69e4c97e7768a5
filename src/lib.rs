//!
//! Kora is a small RISC-V board: an RV32I core on a word-addressed bus with a handful of
//! memory-mapped peripherals (ram, a transmit-only uart, a PS/2 mouse and a video window).
//! This crate emulates it one instruction at a time.
//!
//! The [cpu::Cpu] doesn't own its [bus::Bus], so a host can build any device layout it wants,
//! or take the canonical one from [machine::Machine]. Nothing here exits the process: every
//! failure comes back as an [error::Error] naming the address or opcode at fault and the pc.
//!

pub mod bus;
pub mod config;
pub mod cpu;
pub mod devices;
pub mod error;
pub mod instruction;
pub mod machine;
