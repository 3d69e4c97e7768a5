//! Opcodes, function codes and CSR numbers of the RV32I subset the Kora core runs.

macro_rules! funct {
    () => {};
    ($key:ident = $value:expr $(, $($rest:tt)*)?) => {
        #[allow(dead_code)]
        pub const $key: u32 = $value;
        funct! { $($($rest)*)? }
    };
}

/// `op! { name: F3 = .., F7 = .. }` expands into `pub mod name { pub const F3.. }`
macro_rules! op {
    ($($name:ident: { $($props:tt)* })*) => {
        $(
            pub mod $name {
                funct! { $($props)* }
            }
        )*
    };
}

pub const OPCODE_LUI: u32 = 0b0110111;
pub const OPCODE_AUIPC: u32 = 0b0010111;
pub const OPCODE_JAL: u32 = 0b1101111;
pub const OPCODE_JALR: u32 = 0b1100111;
pub const OPCODE_BRANCH: u32 = 0b1100011;
pub const OPCODE_LOAD: u32 = 0b0000011;
pub const OPCODE_STORE: u32 = 0b0100011;
pub const OPCODE_OP_IMM: u32 = 0b0010011;
pub const OPCODE_OP: u32 = 0b0110011;
pub const OPCODE_MISC_MEM: u32 = 0b0001111;
pub const OPCODE_SYSTEM: u32 = 0b1110011;

/// ECALL and EBREAK are only recognised as these exact words
pub const ECALL_WORD: u32 = 0x0000_0073;
pub const EBREAK_WORD: u32 = 0x0010_0073;

pub const CSR_CYCLE: u32 = 0xC00;
pub const CSR_CYCLEH: u32 = 0xC80;

op! {
    // Branches
    beq:  { F3 = 0b000 }
    bne:  { F3 = 0b001 }
    blt:  { F3 = 0b100 }
    bge:  { F3 = 0b101 }
    bltu: { F3 = 0b110 }
    bgeu: { F3 = 0b111 }

    // Loads
    lb:  { F3 = 0b000 }
    lh:  { F3 = 0b001 }
    lw:  { F3 = 0b010 }
    lbu: { F3 = 0b100 }
    lhu: { F3 = 0b101 }

    // Stores
    sb: { F3 = 0b000 }
    sh: { F3 = 0b001 }
    sw: { F3 = 0b010 }

    // OP-IMM and OP share their funct3 space
    add:  { F3 = 0b000, F7 = 0b0000000 }
    sub:  { F3 = 0b000, F7 = 0b0100000 }
    sll:  { F3 = 0b001, F7 = 0b0000000 }
    slt:  { F3 = 0b010, F7 = 0b0000000 }
    sltu: { F3 = 0b011, F7 = 0b0000000 }
    xor:  { F3 = 0b100, F7 = 0b0000000 }
    srl:  { F3 = 0b101, F7 = 0b0000000 }
    sra:  { F3 = 0b101, F7 = 0b0100000 }
    or:   { F3 = 0b110, F7 = 0b0000000 }
    and:  { F3 = 0b111, F7 = 0b0000000 }

    // Misc-mem
    fence:   { F3 = 0b000 }
    fence_i: { F3 = 0b001 }

    // System
    system: { F3 = 0b000 }
    csrrw:  { F3 = 0b001 }
    csrrs:  { F3 = 0b010 }
    csrrc:  { F3 = 0b011 }
    csrrwi: { F3 = 0b101 }
    csrrsi: { F3 = 0b110 }
    csrrci: { F3 = 0b111 }
}
