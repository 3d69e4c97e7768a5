//!
//! Builds instruction words, mostly so tests and benchmarks can write programs without an
//! assembler. Arguments follow assembly order (`addi rd, rs1, imm`, `sw rs2, imm(rs1)`).
//!

use super::constants::*;
use super::Instruction;

macro_rules! encode_inner {
    ($i:ident) => {};
    ($i:ident, ) => {};
    ($i:ident, $field:ident: $val:expr; $($props:tt)*) => {
        encode_field!($i, $field, $val);
        encode_inner!($i, $($props)*);
    };
}

macro_rules! encode_field {
    ($i:ident, opcode, $val:expr) => { $i.set_opcode($val as u32) };
    ($i:ident, rd, $val:expr) => { $i.set_rd($val as u32) };
    ($i:ident, funct3, $val:expr) => { $i.set_funct3($val as u32) };
    ($i:ident, funct7, $val:expr) => { $i.set_funct7($val as u32) };
    ($i:ident, rs1, $val:expr) => { $i.set_rs1($val as u32) };
    ($i:ident, rs2, $val:expr) => { $i.set_rs2($val as u32) };
    ($i:ident, imm_i, $val:expr) => { $i.set_imm_i($val as i32) };
    ($i:ident, imm_s, $val:expr) => { $i.set_imm_s($val as i32) };
    ($i:ident, imm_b, $val:expr) => { $i.set_imm_b($val as i32) };
    ($i:ident, imm_u, $val:expr) => { $i.set_imm_u($val as u32) };
    ($i:ident, imm_j, $val:expr) => { $i.set_imm_j($val as i32) };
}

macro_rules! encode {
    ($($props:tt)*) => {{
        let mut instruction = Instruction(0);
        encode_inner!(instruction, $($props)*);
        instruction.word()
    }};
}

pub fn lui(rd: u8, imm: u32) -> u32 {
    encode! { opcode: OPCODE_LUI; rd: rd; imm_u: imm; }
}

pub fn auipc(rd: u8, imm: u32) -> u32 {
    encode! { opcode: OPCODE_AUIPC; rd: rd; imm_u: imm; }
}

pub fn jal(rd: u8, offset: i32) -> u32 {
    encode! { opcode: OPCODE_JAL; rd: rd; imm_j: offset; }
}

pub fn jalr(rd: u8, rs1: u8, imm: i32) -> u32 {
    encode! { opcode: OPCODE_JALR; rd: rd; rs1: rs1; imm_i: imm; }
}

/// Any branch; `funct3` is one of the `beq::F3`..`bgeu::F3` constants
pub fn branch(funct3: u32, rs1: u8, rs2: u8, offset: i32) -> u32 {
    encode! { opcode: OPCODE_BRANCH; funct3: funct3; rs1: rs1; rs2: rs2; imm_b: offset; }
}

pub fn beq(rs1: u8, rs2: u8, offset: i32) -> u32 {
    branch(beq::F3, rs1, rs2, offset)
}

pub fn bne(rs1: u8, rs2: u8, offset: i32) -> u32 {
    branch(bne::F3, rs1, rs2, offset)
}

/// Any load; `funct3` is one of the `lb::F3`..`lhu::F3` constants
pub fn load(funct3: u32, rd: u8, imm: i32, rs1: u8) -> u32 {
    encode! { opcode: OPCODE_LOAD; funct3: funct3; rd: rd; rs1: rs1; imm_i: imm; }
}

pub fn lw(rd: u8, imm: i32, rs1: u8) -> u32 {
    load(lw::F3, rd, imm, rs1)
}

/// Any store; `funct3` is one of the `sb::F3`..`sw::F3` constants
pub fn store(funct3: u32, rs2: u8, imm: i32, rs1: u8) -> u32 {
    encode! { opcode: OPCODE_STORE; funct3: funct3; rs1: rs1; rs2: rs2; imm_s: imm; }
}

pub fn sb(rs2: u8, imm: i32, rs1: u8) -> u32 {
    store(sb::F3, rs2, imm, rs1)
}

pub fn sw(rs2: u8, imm: i32, rs1: u8) -> u32 {
    store(sw::F3, rs2, imm, rs1)
}

/// Any OP-IMM instruction. For the shifts, `imm` carries the shift amount and the
/// `funct7` bits (`srai` is `0x400 | shamt`)
pub fn op_imm(funct3: u32, rd: u8, rs1: u8, imm: i32) -> u32 {
    encode! { opcode: OPCODE_OP_IMM; funct3: funct3; rd: rd; rs1: rs1; imm_i: imm; }
}

pub fn addi(rd: u8, rs1: u8, imm: i32) -> u32 {
    op_imm(add::F3, rd, rs1, imm)
}

/// Any OP instruction, e.g. `op(sub::F3, sub::F7, ..)`
pub fn op(funct3: u32, funct7: u32, rd: u8, rs1: u8, rs2: u8) -> u32 {
    encode! { opcode: OPCODE_OP; funct3: funct3; funct7: funct7; rd: rd; rs1: rs1; rs2: rs2; }
}

pub fn add(rd: u8, rs1: u8, rs2: u8) -> u32 {
    op(add::F3, add::F7, rd, rs1, rs2)
}

pub fn sub(rd: u8, rs1: u8, rs2: u8) -> u32 {
    op(sub::F3, sub::F7, rd, rs1, rs2)
}

/// Any CSR instruction. `rs1` is the source register, or the 5-bit immediate of the `*i` forms
pub fn csr(funct3: u32, rd: u8, csr: u32, rs1: u8) -> u32 {
    encode! { opcode: OPCODE_SYSTEM; funct3: funct3; rd: rd; rs1: rs1; imm_i: csr; }
}

pub fn ecall() -> u32 {
    ECALL_WORD
}

pub fn ebreak() -> u32 {
    EBREAK_WORD
}

/// Little-endian image of a program, ready to be loaded into ram
pub fn assemble(program: &[u32]) -> Vec<u8> {
    program.iter().flat_map(|word| word.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_words() {
        assert_eq!(addi(1, 0, 5), 0x00500093);
        assert_eq!(add(2, 1, 1), 0x00108133);
        assert_eq!(beq(1, 1, 8), 0x00108463);
        assert_eq!(jal(5, 12), 0x00c002ef);
        assert_eq!(lui(1, 0x12345000), 0x123450b7);
        assert_eq!(csr(csrrs::F3, 5, CSR_CYCLE, 0), 0xc00022f3);
        assert_eq!(sw(2, 0, 1), 0x0020a023);
        assert_eq!(lw(3, 0, 1), 0x0000a183);
    }

    #[test]
    fn test_assemble() {
        assert_eq!(
            assemble(&[0x00500093, ECALL_WORD]),
            vec![0x93, 0x00, 0x50, 0x00, 0x73, 0x00, 0x00, 0x00]
        );
    }
}
