//!
//! PS/2 mouse, seen by the program as a small byte queue.
//!
//! The host side translates pointer events into standard 3-byte PS/2 packets with
//! [Ps2Mouse::push_event]; the program drains them one byte at a time from [DATA], polling
//! [STATUS] to know whether anything is waiting.
//!

use super::{lane_enabled, Device, DeviceError};

pub(crate) const NAME: &str = "ps/2 mouse";

pub const DATA: u32 = 0x0;
pub const STATUS: u32 = 0x4;

/// Bytes the queue can hold at once
pub const CAPACITY: usize = 4;

/// The ring keeps a spare slot so that `head == tail` only ever means "empty"
const SLOTS: usize = CAPACITY + 1;

/// Bit 3 of the first packet byte is always set
const PACKET_SYNC: u8 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}

/// A pointer event as the host reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// Relative motion. `buttons` holds the held buttons as [MouseButton::bit]s, and `dy`
    /// grows downwards like most host windowing systems do.
    Motion { dx: i32, dy: i32, buttons: u8 },
    /// A button was pressed or released
    Button(MouseButton),
}

impl MouseEvent {
    /// The PS/2 packet for this event. The device's y axis points up, so `dy` is negated.
    pub fn packet(self) -> [u8; 3] {
        match self {
            MouseEvent::Motion { dx, dy, buttons } => [
                PACKET_SYNC | (buttons & 0x07),
                dx as u8,
                dy.wrapping_neg() as u8,
            ],
            MouseEvent::Button(button) => [PACKET_SYNC | button.bit(), 0, 0],
        }
    }
}

#[derive(Debug, Default)]
pub struct Ps2Mouse {
    buffer: [u8; SLOTS],
    head: usize,
    tail: usize,
}

impl Ps2Mouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        (self.head + 1) % SLOTS == self.tail
    }

    pub fn len(&self) -> usize {
        (self.head + SLOTS - self.tail) % SLOTS
    }

    /// Queues a byte. Returns false (and drops the byte) if the queue is full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buffer[self.head] = byte;
        self.head = (self.head + 1) % SLOTS;
        true
    }

    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buffer[self.tail];
        self.tail = (self.tail + 1) % SLOTS;
        Some(byte)
    }

    /// Queues the packet for a host event, byte by byte. Bytes that don't fit are dropped.
    pub fn push_event(&mut self, event: MouseEvent) {
        for byte in event.packet() {
            self.push(byte);
        }
    }
}

impl Device for Ps2Mouse {
    fn read(&mut self, offset: u32) -> Result<u32, DeviceError> {
        match offset {
            DATA => Ok(self.pop().unwrap_or(0) as u32),
            STATUS => Ok((!self.is_empty()) as u32),
            _ => Err(DeviceError::InvalidOffset {
                device: NAME,
                offset,
            }),
        }
    }

    fn write(&mut self, offset: u32, value: u32, mask: u8) -> Result<(), DeviceError> {
        if offset == DATA && lane_enabled(mask, 0) {
            self.push(value as u8);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::FULL_MASK;
    use super::*;

    #[test]
    fn test_drops_when_full() {
        let mut mouse = Ps2Mouse::new();
        for b in 1..=5 {
            mouse.write(DATA, b, FULL_MASK).unwrap();
            assert_ne!(mouse.head, mouse.tail);
        }
        assert_eq!(mouse.len(), 4);
        assert!(mouse.is_full());

        let drained: Vec<_> = (0..4).map(|_| mouse.read(DATA).unwrap()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4]);
        assert!(mouse.is_empty());
    }

    #[test]
    fn test_empty_reads() {
        let mut mouse = Ps2Mouse::new();
        assert_eq!(mouse.read(STATUS).unwrap(), 0);
        assert_eq!(mouse.read(DATA).unwrap(), 0);

        mouse.push(0x2a);
        assert_eq!(mouse.read(STATUS).unwrap(), 1);
        assert_eq!(mouse.read(DATA).unwrap(), 0x2a);
        assert_eq!(mouse.read(STATUS).unwrap(), 0);
    }

    #[test]
    fn test_wraps_around() {
        let mut mouse = Ps2Mouse::new();
        for round in 0..10u8 {
            assert!(mouse.push(round));
            assert!(mouse.push(round + 100));
            assert_eq!(mouse.pop(), Some(round));
            assert_eq!(mouse.pop(), Some(round + 100));
            assert_eq!(mouse.pop(), None);
        }
    }

    #[test]
    fn test_ignored_writes() {
        let mut mouse = Ps2Mouse::new();
        mouse.write(STATUS, 7, FULL_MASK).unwrap();
        mouse.write(DATA, 7, 0b0010).unwrap();
        assert!(mouse.is_empty());
    }

    #[test]
    fn test_invalid_read_offset() {
        let mut mouse = Ps2Mouse::new();
        assert!(matches!(
            mouse.read(8),
            Err(DeviceError::InvalidOffset { offset: 8, .. })
        ));
    }

    #[test]
    fn test_packets() {
        let motion = MouseEvent::Motion {
            dx: 5,
            dy: 3,
            buttons: MouseButton::Left.bit() | MouseButton::Middle.bit(),
        };
        assert_eq!(motion.packet(), [0x0d, 5, (-3i8) as u8]);

        let motion = MouseEvent::Motion {
            dx: -1,
            dy: -2,
            buttons: 0xff,
        };
        assert_eq!(motion.packet(), [0x0f, 0xff, 2]);

        assert_eq!(MouseEvent::Button(MouseButton::Right).packet(), [0x0a, 0, 0]);
    }

    #[test]
    fn test_push_event() {
        let mut mouse = Ps2Mouse::new();
        mouse.push_event(MouseEvent::Button(MouseButton::Left));
        mouse.push_event(MouseEvent::Motion {
            dx: 1,
            dy: 1,
            buttons: 0,
        });

        // only the first byte of the second packet fits
        assert_eq!(mouse.len(), 4);
        let bytes: Vec<_> = std::iter::from_fn(|| mouse.pop()).collect();
        assert_eq!(bytes, vec![0x09, 0, 0, 0x08]);
    }
}
