//!
//! Field and immediate extraction for 32-bit instruction words.
//!
//! An [`Instruction`] is just the raw word; every field is decoded on demand, so the cpu can
//! match on `opcode()` and `funct3()` and only pay for the immediate format it actually uses.
//!

use bitfield::bitfield;
use std::fmt;
use std::ops::Range;

pub mod constants;
pub mod encode;

/// Bits `range.start..range.end` set, everything else clear
pub const fn mask(range: Range<u32>) -> u32 {
    (u32::MAX >> (32 - (range.end - range.start))) << range.start
}

bitfield! {
    #[derive(Default, Clone, Copy, PartialEq, Eq)]
    pub struct Instruction(u32);

    pub opcode, set_opcode: 6, 0;
    pub rd, set_rd: 11, 7;
    pub funct3, set_funct3: 14, 12;
    pub rs1, set_rs1: 19, 15;
    pub rs2, set_rs2: 24, 20;
    pub funct7, set_funct7: 31, 25;
}

impl Instruction {
    #[inline]
    pub fn word(self) -> u32 {
        self.0
    }

    /// Shift amount of the immediate shifts, which lives where `rs2` would be
    #[inline]
    pub fn shamt(self) -> u32 {
        self.rs2()
    }

    /// CSR number of the SYSTEM instructions (bits 31:20, zero-extended)
    #[inline]
    pub fn csr(self) -> u32 {
        self.0 >> 20
    }

    /// imm[11:0] = inst[31:20]
    pub fn imm_i(self) -> i32 {
        (self.0 as i32) >> 20
    }

    pub fn set_imm_i(&mut self, imm: i32) {
        self.0 = (self.0 & !mask(20..32)) | ((imm as u32) << 20);
    }

    /// imm[11:5] = inst[31:25], imm[4:0] = inst[11:7]
    pub fn imm_s(self) -> i32 {
        let high = ((self.0 as i32) >> 20) & !0x1f;
        let low = ((self.0 >> 7) & 0x1f) as i32;
        high | low
    }

    pub fn set_imm_s(&mut self, imm: i32) {
        let imm = imm as u32;
        self.0 &= !(mask(7..12) | mask(25..32));
        self.0 |= (imm & 0x1f) << 7;
        self.0 |= (imm & mask(5..12)) << 20;
    }

    /// imm[12|10:5] = inst[31:25], imm[4:1|11] = inst[11:7]
    pub fn imm_b(self) -> i32 {
        let sign = ((self.0 as i32) >> 31) << 12;
        let rest = ((self.0 >> 7) & 1) << 11 | ((self.0 >> 25) & 0x3f) << 5 | ((self.0 >> 8) & 0xf) << 1;
        sign | rest as i32
    }

    pub fn set_imm_b(&mut self, imm: i32) {
        let imm = imm as u32;
        self.0 &= !(mask(7..12) | mask(25..32));
        self.0 |= ((imm >> 12) & 1) << 31;
        self.0 |= ((imm >> 5) & 0x3f) << 25;
        self.0 |= ((imm >> 1) & 0xf) << 8;
        self.0 |= ((imm >> 11) & 1) << 7;
    }

    /// imm[31:12] = inst[31:12]
    pub fn imm_u(self) -> u32 {
        self.0 & mask(12..32)
    }

    pub fn set_imm_u(&mut self, imm: u32) {
        self.0 = (self.0 & !mask(12..32)) | (imm & mask(12..32));
    }

    /// imm[20|10:1|11|19:12] = inst[31:12]
    pub fn imm_j(self) -> i32 {
        let sign = ((self.0 as i32) >> 31) << 20;
        let rest = ((self.0 >> 12) & 0xff) << 12 | ((self.0 >> 20) & 1) << 11 | ((self.0 >> 21) & 0x3ff) << 1;
        sign | rest as i32
    }

    pub fn set_imm_j(&mut self, imm: i32) {
        let imm = imm as u32;
        self.0 &= !mask(12..32);
        self.0 |= ((imm >> 20) & 1) << 31;
        self.0 |= ((imm >> 1) & 0x3ff) << 21;
        self.0 |= ((imm >> 11) & 1) << 20;
        self.0 |= ((imm >> 12) & 0xff) << 12;
    }
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x} (opcode {:#04x}, rd x{}, f3 {}, rs1 x{}, rs2 x{}, f7 {:#04x})",
            self.0,
            self.opcode(),
            self.rd(),
            self.funct3(),
            self.rs1(),
            self.rs2(),
            self.funct7()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(0..5), 0x1f);
        assert_eq!(mask(12..32), 0xfffff000);
        assert_eq!(mask(7..12), 0xf80);
        assert_eq!(mask(0..32), u32::MAX);
    }

    #[test]
    fn test_fields() {
        // add x2, x1, x1
        let i = Instruction(0x00108133);
        assert_eq!(i.opcode(), 0x33);
        assert_eq!(i.rd(), 2);
        assert_eq!(i.rs1(), 1);
        assert_eq!(i.rs2(), 1);
        assert_eq!(i.funct3(), 0);
        assert_eq!(i.funct7(), 0);
    }

    #[test]
    fn test_imm_i() {
        assert_eq!(Instruction(0x07b14093).imm_i(), 123);
        assert_eq!(Instruction(0xffc4c413).imm_i(), -4);
        assert_eq!(Instruction(0x000f8f13).imm_i(), 0);

        for imm in [0, -4, 123, -123, 0x7f, 0x7ff, -2048] {
            let mut i = Instruction(0x12345678);
            i.set_imm_i(imm);
            assert_eq!(i.imm_i(), imm);
            assert_eq!(i.opcode(), 0x78);
        }
    }

    #[test]
    fn test_imm_s() {
        assert_eq!(Instruction(0x0684ada3).imm_s(), 123);
        assert_eq!(Instruction(0xfe84ae23).imm_s(), -4);
        assert_eq!(Instruction(0x0000a023).imm_s(), 0);

        for imm in [0, -4, 123, -123, 0x7f, 0x7ff, -2048] {
            let mut i = Instruction(0x12345678);
            i.set_imm_s(imm);
            assert_eq!(i.imm_s(), imm);
        }
    }

    #[test]
    fn test_imm_b() {
        // beq x1, x1, +8
        assert_eq!(Instruction(0x00108463).imm_b(), 8);
        // bne x0, x0, -4
        assert_eq!(Instruction(0xfe001ee3).imm_b(), -4);

        for imm in [0, 8, -4, 4094, -4096, 2048, 0x7fe] {
            let mut i = Instruction(0x00108463);
            i.set_imm_b(imm);
            assert_eq!(i.imm_b(), imm);
            assert_eq!(i.rs1(), 1);
            assert_eq!(i.rs2(), 1);
        }
    }

    #[test]
    fn test_imm_j() {
        // jal x5, 12
        assert_eq!(Instruction(0x00c002ef).imm_j(), 12);
        // jal x0, -8
        assert_eq!(Instruction(0xff9ff06f).imm_j(), -8);

        for imm in [0, 12, -8, 0xffffe, -0x100000, 2048] {
            let mut i = Instruction(0x0000006f);
            i.set_imm_j(imm);
            assert_eq!(i.imm_j(), imm);
        }
    }

    #[test]
    fn test_imm_u() {
        // lui x1, 0x12345
        let i = Instruction(0x123450b7);
        assert_eq!(i.imm_u(), 0x12345000);
        assert_eq!(i.rd(), 1);
    }

    #[test]
    fn test_csr() {
        // csrrs x5, cycle, x0  (rdcycle t0)
        let i = Instruction(0xc00022f3);
        assert_eq!(i.csr(), 0xC00);
        assert_eq!(i.funct3(), 2);
        assert_eq!(i.rd(), 5);
    }
}
