//! Core types for the IRRE ISA.

/// Every instruction is one fixed-width word.
pub const INSTRUCTION_SIZE: usize = 4;

// Number of registers
pub const NUM_GPRS: usize = 32;
pub const NUM_REGS: usize = 37;

// Special register indices
pub const REG_PC: u8 = 0x20;
pub const REG_LR: u8 = 0x21;
pub const REG_AD: u8 = 0x22;
pub const REG_AT: u8 = 0x23;
pub const REG_SP: u8 = 0x24;

const REG_NAMES: [&str; NUM_REGS] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13", "r14",
    "r15", "r16", "r17", "r18", "r19", "r20", "r21", "r22", "r23", "r24", "r25", "r26", "r27",
    "r28", "r29", "r30", "r31", "pc", "lr", "ad", "at", "sp",
];

/// Get register name, or `None` for an index outside the register file.
#[must_use]
pub fn reg_name(reg: u8) -> Option<&'static str> {
    REG_NAMES.get(usize::from(reg)).copied()
}

#[must_use]
pub fn is_valid_reg(reg: u8) -> bool {
    usize::from(reg) < NUM_REGS
}

/// One entry of the register file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterInfo {
    pub index: u8,
    pub name: &'static str,
    /// Width in bytes.
    pub size: u8,
}

/// Iterate over the whole register file in index order.
pub fn registers() -> impl Iterator<Item = RegisterInfo> {
    (0u8..).zip(REG_NAMES).map(|(index, name)| RegisterInfo {
        index,
        name,
        size: 4,
    })
}

/// Fixed architecture facts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchInfo {
    pub name: &'static str,
    pub address_size: usize,
    pub default_int_size: usize,
    pub instr_alignment: usize,
    pub max_instr_length: usize,
    pub little_endian: bool,
    pub stack_pointer: u8,
    pub link_register: u8,
}

pub const ARCH_INFO: ArchInfo = ArchInfo {
    name: "IRRE",
    address_size: 4,
    default_int_size: 4,
    instr_alignment: 4,
    max_instr_length: INSTRUCTION_SIZE,
    little_endian: true,
    stack_pointer: REG_SP,
    link_register: REG_LR,
};
