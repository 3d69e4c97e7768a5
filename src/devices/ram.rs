use super::{lane_enabled, Device, DeviceError};
use byteorder::{ByteOrder, LittleEndian};
use std::io::Read;

pub(crate) const NAME: &str = "ram";

/// Zero-initialised, fixed-size, little-endian memory
pub struct Ram {
    mem: Vec<u8>,
}

impl Ram {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    pub fn size(&self) -> usize {
        self.mem.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mem
    }

    /// Copies a flat boot image to the start of the ram
    pub fn load(&mut self, image: &[u8]) -> Result<(), DeviceError> {
        if image.len() > self.mem.len() {
            return Err(DeviceError::ImageTooLarge {
                len: image.len(),
                size: self.mem.len(),
            });
        }
        self.mem[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Reads a whole boot image from `reader` into the start of the ram.
    /// Returns the number of bytes loaded.
    pub fn load_from_reader<R: Read>(&mut self, reader: &mut R) -> Result<usize, DeviceError> {
        let mut image = Vec::with_capacity(self.mem.len());
        reader.read_to_end(&mut image)?;
        self.load(&image)?;
        Ok(image.len())
    }

    /// The word at `offset`, if it is in range
    pub fn peek(&self, offset: u32) -> Option<u32> {
        let range = self.word_at(offset).ok()?;
        Some(LittleEndian::read_u32(&self.mem[range]))
    }

    /// Range of the 4 bytes at `offset`, or an error if they don't all fit
    fn word_at(&self, offset: u32) -> Result<std::ops::Range<usize>, DeviceError> {
        let start = offset as usize;
        match start.checked_add(4) {
            Some(end) if end <= self.mem.len() => Ok(start..end),
            _ => Err(DeviceError::OutOfBounds {
                device: NAME,
                offset,
                size: self.mem.len() as u32,
            }),
        }
    }
}

impl Device for Ram {
    fn read(&mut self, offset: u32) -> Result<u32, DeviceError> {
        let range = self.word_at(offset)?;
        Ok(LittleEndian::read_u32(&self.mem[range]))
    }

    fn write(&mut self, offset: u32, value: u32, mask: u8) -> Result<(), DeviceError> {
        let range = self.word_at(offset)?;
        let bytes = value.to_le_bytes();
        for (lane, (dst, src)) in self.mem[range].iter_mut().zip(bytes).enumerate() {
            if lane_enabled(mask, lane as u32) {
                *dst = src;
            }
        }
        Ok(())
    }
}
