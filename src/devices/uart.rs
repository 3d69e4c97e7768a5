use super::{lane_enabled, Device, DeviceError};
use std::io::{self, Write};

pub(crate) const NAME: &str = "uart tx";

pub const DATA: u32 = 0x0;
pub const STATUS: u32 = 0x4;

/// Transmit-only serial port. Transmission is instantaneous: a byte written to [DATA] goes
/// straight to the output stream, so [STATUS] never reads as busy from the program's side.
pub struct UartTx {
    data: u8,
    busy: bool,
    out: Box<dyn Write>,
}

impl UartTx {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            data: 0,
            busy: false,
            out,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// The last byte that was transmitted
    pub fn data(&self) -> u8 {
        self.data
    }

    fn transmit(&mut self, byte: u8) -> io::Result<()> {
        self.data = byte;
        self.busy = true;
        let res = self.out.write_all(&[byte]).and_then(|_| self.out.flush());
        self.busy = false;
        res
    }
}

impl Default for UartTx {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Device for UartTx {
    fn read(&mut self, offset: u32) -> Result<u32, DeviceError> {
        match offset {
            DATA => Ok(self.data as u32),
            STATUS => Ok(self.busy as u32),
            _ => Err(DeviceError::InvalidOffset {
                device: NAME,
                offset,
            }),
        }
    }

    fn write(&mut self, offset: u32, value: u32, mask: u8) -> Result<(), DeviceError> {
        match offset {
            DATA if lane_enabled(mask, 0) => Ok(self.transmit(value as u8)?),
            DATA => Ok(()),
            _ => Err(DeviceError::InvalidOffset {
                device: NAME,
                offset,
            }),
        }
    }
}
