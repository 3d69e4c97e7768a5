use super::{lane_enabled, Device, DeviceError};

pub(crate) const NAME: &str = "latch";

const REGISTERS: usize = 4;

/// A bank of word registers that simply hold whatever was last written to them.
/// Headless runs put one where the video coprocessor would be, so firmware that talks to the
/// display keeps running without a renderer attached.
#[derive(Debug, Default)]
pub struct Latch {
    regs: [u32; REGISTERS],
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> &[u32] {
        &self.regs
    }

    fn index(offset: u32) -> Result<usize, DeviceError> {
        let i = (offset / 4) as usize;
        if i < REGISTERS {
            Ok(i)
        } else {
            Err(DeviceError::InvalidOffset {
                device: NAME,
                offset,
            })
        }
    }
}

impl Device for Latch {
    fn read(&mut self, offset: u32) -> Result<u32, DeviceError> {
        Ok(self.regs[Self::index(offset)?])
    }

    fn write(&mut self, offset: u32, value: u32, mask: u8) -> Result<(), DeviceError> {
        let reg = &mut self.regs[Self::index(offset)?];
        let lanes = (0..4)
            .filter(|&lane| lane_enabled(mask, lane))
            .fold(0u32, |acc, lane| acc | (0xff << (lane * 8)));
        *reg = (*reg & !lanes) | (value & lanes);
        Ok(())
    }
}
