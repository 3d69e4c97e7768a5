//!
//! Peripherals that can sit on the [Bus](crate::bus::Bus).
//!
//! Every device speaks the same word-sized protocol: the bus hands it a word-aligned offset
//! relative to the device's base address, and writes carry a 4-bit byte mask with one bit per
//! byte lane. A device may only touch the lanes whose bit is set.
//!

use owo_colors::OwoColorize;
use std::io;
use thiserror::Error;

pub mod latch;
pub mod ps2;
pub mod ram;
pub mod uart;

pub use latch::Latch;
pub use ps2::{MouseButton, MouseEvent, Ps2Mouse};
pub use ram::Ram;
pub use uart::UartTx;

/// `0x0000abcd`-style formatting used by every diagnostic that names an address
pub(crate) fn hex(x: &u32) -> String {
    format!("{x:#010x}")
}

/// Mask with all four byte lanes set
pub const FULL_MASK: u8 = 0b1111;

/// Is byte lane `lane` (0 = least significant byte) enabled in `mask`?
#[inline]
pub fn lane_enabled(mask: u8, lane: u32) -> bool {
    mask & (1 << lane) != 0
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("{device} access out of bounds: offset {} (size {size:#x})", hex(.offset).bright_yellow())]
    OutOfBounds {
        device: &'static str,
        offset: u32,
        size: u32,
    },

    #[error("{device} has no register at offset {}", hex(.offset).bright_yellow())]
    InvalidOffset { device: &'static str, offset: u32 },

    #[error("Boot image is {len} bytes long, but ram is only {size} bytes")]
    ImageTooLarge { len: usize, size: usize },

    /// The host side of a device failed, e.g. stdout was closed under the uart
    #[error("I/O Error: {0}")]
    Io(#[from] io::Error),
}

/// The capability every addressable peripheral offers to the bus
pub trait Device {
    fn read(&mut self, offset: u32) -> Result<u32, DeviceError>;
    fn write(&mut self, offset: u32, value: u32, mask: u8) -> Result<(), DeviceError>;
}

/// The devices a Kora machine is built from. Anything the core doesn't model (the video
/// coprocessor, for one) can still be plugged in as `External`.
pub enum Peripheral {
    Ram(Ram),
    UartTx(UartTx),
    Ps2Mouse(Ps2Mouse),
    Latch(Latch),
    External(Box<dyn Device>),
}

impl Peripheral {
    pub fn name(&self) -> &'static str {
        match self {
            Peripheral::Ram(_) => ram::NAME,
            Peripheral::UartTx(_) => uart::NAME,
            Peripheral::Ps2Mouse(_) => ps2::NAME,
            Peripheral::Latch(_) => latch::NAME,
            Peripheral::External(_) => "external device",
        }
    }

    pub fn as_ram(&self) -> Option<&Ram> {
        match self {
            Peripheral::Ram(ram) => Some(ram),
            _ => None,
        }
    }

    pub fn as_ps2_mouse_mut(&mut self) -> Option<&mut Ps2Mouse> {
        match self {
            Peripheral::Ps2Mouse(mouse) => Some(mouse),
            _ => None,
        }
    }

    pub fn as_latch(&self) -> Option<&Latch> {
        match self {
            Peripheral::Latch(latch) => Some(latch),
            _ => None,
        }
    }
}

impl Device for Peripheral {
    fn read(&mut self, offset: u32) -> Result<u32, DeviceError> {
        match self {
            Peripheral::Ram(d) => d.read(offset),
            Peripheral::UartTx(d) => d.read(offset),
            Peripheral::Ps2Mouse(d) => d.read(offset),
            Peripheral::Latch(d) => d.read(offset),
            Peripheral::External(d) => d.read(offset),
        }
    }

    fn write(&mut self, offset: u32, value: u32, mask: u8) -> Result<(), DeviceError> {
        match self {
            Peripheral::Ram(d) => d.write(offset, value, mask),
            Peripheral::UartTx(d) => d.write(offset, value, mask),
            Peripheral::Ps2Mouse(d) => d.write(offset, value, mask),
            Peripheral::Latch(d) => d.write(offset, value, mask),
            Peripheral::External(d) => d.write(offset, value, mask),
        }
    }
}

macro_rules! impl_from_device {
    ($variant:ident) => {
        impl From<$variant> for Peripheral {
            fn from(device: $variant) -> Self {
                Peripheral::$variant(device)
            }
        }
    };
}

impl_from_device! { Ram }
impl_from_device! { UartTx }
impl_from_device! { Ps2Mouse }
impl_from_device! { Latch }

impl From<Box<dyn Device>> for Peripheral {
    fn from(device: Box<dyn Device>) -> Self {
        Peripheral::External(device)
    }
}
