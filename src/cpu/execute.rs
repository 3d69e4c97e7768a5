//! Decodes and executes a single instruction word

use super::{Cpu, Halt};
use crate::bus::Bus;
use crate::devices::FULL_MASK;
use crate::error::{Error, ExecError};
use crate::instruction::constants::*;
use crate::instruction::Instruction;

fn invalid_funct3(i: Instruction) -> Error {
    ExecError::InvalidFunct3 {
        opcode: i.opcode(),
        funct3: i.funct3(),
    }
    .into()
}

fn invalid_funct7(i: Instruction) -> Error {
    ExecError::InvalidFunct7 {
        opcode: i.opcode(),
        funct7: i.funct7(),
    }
    .into()
}

/// An access of `bytes` bytes must not straddle a word: halves sit at offset 0 or 2, words at 0
fn check_alignment(op: &'static str, addr: u32, bytes: u32) -> Result<(), ExecError> {
    if addr % bytes == 0 {
        Ok(())
    } else {
        Err(ExecError::UnalignedAccess { op, addr })
    }
}

impl Cpu {
    /// Executes `i` and moves the pc along. Returns the halt reason for ECALL/EBREAK, in which
    /// case nothing is modified.
    pub(super) fn execute(&mut self, bus: &mut Bus, i: Instruction) -> Result<Option<Halt>, Error> {
        let pc = self.pc;
        let rd = i.rd();
        let mut next_pc = pc.wrapping_add(4);

        match i.opcode() {
            OPCODE_LUI => self.set_reg(rd, i.imm_u()),
            OPCODE_AUIPC => self.set_reg(rd, pc.wrapping_add(i.imm_u())),

            OPCODE_JAL => {
                self.set_reg(rd, pc.wrapping_add(4));
                next_pc = pc.wrapping_add(i.imm_j() as u32);
            }
            OPCODE_JALR => {
                // target first, rd may be rs1
                next_pc = self.reg::<u32>(i.rs1()).wrapping_add(i.imm_i() as u32) & !1;
                self.set_reg(rd, pc.wrapping_add(4));
            }

            OPCODE_BRANCH => {
                if self.branch_taken(i)? {
                    next_pc = pc.wrapping_add(i.imm_b() as u32);
                }
            }

            OPCODE_LOAD => self.load(bus, i)?,
            OPCODE_STORE => self.store(bus, i)?,

            OPCODE_OP_IMM => {
                let x = self.op_imm(i)?;
                self.set_reg(rd, x);
            }
            OPCODE_OP => {
                let x = self.op(i)?;
                self.set_reg(rd, x);
            }

            // Memory ordering isn't modelled
            OPCODE_MISC_MEM => match i.funct3() {
                fence::F3 | fence_i::F3 => {}
                _ => return Err(invalid_funct3(i)),
            },

            OPCODE_SYSTEM => {
                if let Some(halt) = self.exec_system(i)? {
                    return Ok(Some(halt));
                }
            }

            opcode => return Err(ExecError::UnknownOpcode(opcode).into()),
        }

        self.pc = next_pc;
        Ok(None)
    }

    fn branch_taken(&self, i: Instruction) -> Result<bool, Error> {
        let (a, b) = (self.reg::<u32>(i.rs1()), self.reg::<u32>(i.rs2()));
        let (sa, sb) = (self.reg::<i32>(i.rs1()), self.reg::<i32>(i.rs2()));

        Ok(match i.funct3() {
            beq::F3 => a == b,
            bne::F3 => a != b,
            blt::F3 => sa < sb,
            bge::F3 => sa >= sb,
            bltu::F3 => a < b,
            bgeu::F3 => a >= b,
            _ => return Err(invalid_funct3(i)),
        })
    }

    /// Reads the containing word and picks the requested width out of it
    fn load(&mut self, bus: &mut Bus, i: Instruction) -> Result<(), Error> {
        let addr = self.reg::<u32>(i.rs1()).wrapping_add(i.imm_i() as u32);

        let (op, bytes) = match i.funct3() {
            lb::F3 => ("lb", 1),
            lbu::F3 => ("lbu", 1),
            lh::F3 => ("lh", 2),
            lhu::F3 => ("lhu", 2),
            lw::F3 => ("lw", 4),
            _ => return Err(invalid_funct3(i)),
        };
        check_alignment(op, addr, bytes)?;

        let data = bus.read(addr)? >> ((addr & 0x3) * 8);
        let rd = i.rd();
        match i.funct3() {
            lb::F3 => self.set_reg(rd, data as u8 as i8),
            lbu::F3 => self.set_reg(rd, data as u8),
            lh::F3 => self.set_reg(rd, data as u16 as i16),
            lhu::F3 => self.set_reg(rd, data as u16),
            _ => self.set_reg(rd, data),
        }
        Ok(())
    }

    /// Shifts the stored bytes into their lanes and writes the containing word with a mask
    fn store(&mut self, bus: &mut Bus, i: Instruction) -> Result<(), Error> {
        let addr = self.reg::<u32>(i.rs1()).wrapping_add(i.imm_s() as u32);
        let value = self.reg::<u32>(i.rs2());

        let (op, bytes, lanes): (_, _, u8) = match i.funct3() {
            sb::F3 => ("sb", 1, 0b0001),
            sh::F3 => ("sh", 2, 0b0011),
            sw::F3 => ("sw", 4, FULL_MASK),
            _ => return Err(invalid_funct3(i)),
        };
        check_alignment(op, addr, bytes)?;

        let offset = addr & 0x3;
        let value = match bytes {
            1 => (value & 0xff) << (offset * 8),
            2 => (value & 0xffff) << (offset * 8),
            _ => value,
        };
        bus.write(addr, value, lanes << offset)?;
        Ok(())
    }

    fn op_imm(&self, i: Instruction) -> Result<u32, Error> {
        let a = self.reg::<u32>(i.rs1());
        let imm = i.imm_i();
        let b = imm as u32;
        let shamt = i.shamt();

        Ok(match (i.funct3(), i.funct7()) {
            (add::F3, _) => a.wrapping_add(b),
            (slt::F3, _) => ((a as i32) < imm) as u32,
            (sltu::F3, _) => (a < b) as u32,
            (xor::F3, _) => a ^ b,
            (or::F3, _) => a | b,
            (and::F3, _) => a & b,
            (sll::F3, sll::F7) => a << shamt,
            (srl::F3, srl::F7) => a >> shamt,
            (sra::F3, sra::F7) => ((a as i32) >> shamt) as u32,
            _ => return Err(invalid_funct7(i)),
        })
    }

    fn op(&self, i: Instruction) -> Result<u32, Error> {
        let (a, b) = (self.reg::<u32>(i.rs1()), self.reg::<u32>(i.rs2()));
        let shamt = b & 0x1f;

        Ok(match (i.funct3(), i.funct7()) {
            (add::F3, add::F7) => a.wrapping_add(b),
            (sub::F3, sub::F7) => a.wrapping_sub(b),
            (sll::F3, sll::F7) => a << shamt,
            (slt::F3, slt::F7) => ((a as i32) < (b as i32)) as u32,
            (sltu::F3, sltu::F7) => (a < b) as u32,
            (xor::F3, xor::F7) => a ^ b,
            (srl::F3, srl::F7) => a >> shamt,
            (sra::F3, sra::F7) => ((a as i32) >> shamt) as u32,
            (or::F3, or::F7) => a | b,
            (and::F3, and::F7) => a & b,
            _ => return Err(invalid_funct7(i)),
        })
    }

    fn exec_system(&mut self, i: Instruction) -> Result<Option<Halt>, Error> {
        let funct3 = i.funct3();
        match funct3 {
            system::F3 => match i.word() {
                ECALL_WORD => Ok(Some(Halt::Ecall)),
                EBREAK_WORD => Ok(Some(Halt::Ebreak)),
                word => Err(ExecError::UnknownInstruction(word).into()),
            },

            // every other funct3 is a CSR access, 4 included
            _ => {
                let csr = i.csr();
                let current = self.read_csr(csr)?;

                // The *i forms use the rs1 field as a 5-bit immediate
                let operand = if funct3 & 0b100 != 0 {
                    i.rs1()
                } else {
                    self.reg::<u32>(i.rs1())
                };
                let updated = match funct3 {
                    csrrw::F3 | csrrwi::F3 => operand,
                    csrrs::F3 | csrrsi::F3 => current | operand,
                    csrrc::F3 | csrrci::F3 => current & !operand,
                    _ => current,
                };
                self.write_csr(csr, updated);

                self.set_reg(i.rd(), current);
                Ok(None)
            }
        }
    }

    fn read_csr(&self, csr: u32) -> Result<u32, ExecError> {
        match csr {
            CSR_CYCLE => Ok(self.cycle_count as u32),
            CSR_CYCLEH => Ok((self.cycle_count >> 32) as u32),
            _ => Err(ExecError::UnsupportedCsr(csr)),
        }
    }

    /// Every implemented CSR is a read-only counter, so writes are dropped
    fn write_csr(&mut self, csr: u32, _value: u32) {
        debug_assert!(matches!(csr, CSR_CYCLE | CSR_CYCLEH));
    }
}
