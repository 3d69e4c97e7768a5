//!
//! The address-space router between the cpu and the peripherals.
//!
//! Devices are registered on half-open windows `[base, base + size)`. Accesses are always
//! word-sized: the address is rounded down to a multiple of 4 before lookup, so anything that
//! wants a byte or a half has to pick it out of the returned word itself.
//! Windows are searched in registration order and the first one that contains the address
//! wins, overlapping or not.
//!

use crate::devices::{hex, Device, DeviceError, Peripheral};
use owo_colors::OwoColorize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Bus {access} error: no device is mapped at address {}", hex(.addr).bright_yellow())]
    UnmappedAddress { addr: u32, access: Access },

    #[error("{source} (bus address {})", hex(.addr).bright_yellow())]
    Device {
        addr: u32,
        #[source]
        source: DeviceError,
    },
}

/// Handle to a device on the bus, given out by [Bus::add_device]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId(usize);

pub struct Registration {
    pub base: u32,
    pub size: u32,
    pub device: Peripheral,
}

impl Registration {
    #[inline]
    fn contains(&self, addr: u32) -> bool {
        // written as a difference so windows that touch the top of the address space don't overflow
        addr >= self.base && addr - self.base < self.size
    }
}

#[derive(Default)]
pub struct Bus {
    devices: Vec<Registration>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `device` on `[base, base + size)`. Overlaps aren't checked.
    pub fn add_device(&mut self, device: impl Into<Peripheral>, base: u32, size: u32) -> DeviceId {
        self.devices.push(Registration {
            base,
            size,
            device: device.into(),
        });
        DeviceId(self.devices.len() - 1)
    }

    pub fn device(&self, id: DeviceId) -> Option<&Peripheral> {
        self.devices.get(id.0).map(|r| &r.device)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut Peripheral> {
        self.devices.get_mut(id.0).map(|r| &mut r.device)
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.devices
    }

    /// Reads the word containing `addr` without touching any device with read side effects.
    /// Returns `None` unless `addr` is backed by ram.
    pub fn peek(&self, addr: u32) -> Option<u32> {
        let addr = addr & !0x3;
        let r = self.devices.iter().find(|r| r.contains(addr))?;
        r.device.as_ram()?.peek(addr - r.base)
    }

    /// Finds the first device whose window contains `addr`, and the offset into it
    fn route(&mut self, addr: u32, access: Access) -> Result<(&mut Peripheral, u32), BusError> {
        self.devices
            .iter_mut()
            .find(|r| r.contains(addr))
            .map(|r| (&mut r.device, addr - r.base))
            .ok_or(BusError::UnmappedAddress { addr, access })
    }

    /// Reads the word containing `addr`
    pub fn read(&mut self, addr: u32) -> Result<u32, BusError> {
        let addr = addr & !0x3;
        let (device, offset) = self.route(addr, Access::Read)?;
        device
            .read(offset)
            .map_err(|source| BusError::Device { addr, source })
    }

    /// Writes the lanes of `value` selected by `mask` to the word containing `addr`
    pub fn write(&mut self, addr: u32, value: u32, mask: u8) -> Result<(), BusError> {
        let addr = addr & !0x3;
        let (device, offset) = self.route(addr, Access::Write)?;
        device
            .write(offset, value, mask)
            .map_err(|source| BusError::Device { addr, source })
    }
}
