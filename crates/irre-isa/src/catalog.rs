//! Static opcode table.

/// Layout of the three bytes following the opcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandShape {
    None,
    Reg,
    Imm24,
    RegImm16,
    RegReg,
    RegRegImm8,
    RegImm8Imm8,
    RegRegReg,
}

/// Control-flow behavior of an opcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlowClass {
    UnconditionalDirect,
    /// Branch to its own address (`hlt`).
    UnconditionalSelf,
    Indirect,
    ConditionalPair,
    Call,
    Return,
    Exception,
}

/// Opcode byte values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0x00,
    Add = 0x01,
    Sub = 0x02,
    And = 0x03,
    Orr = 0x04,
    Xor = 0x05,
    Not = 0x06,
    Lsh = 0x07,
    Ash = 0x08,
    Tcu = 0x09,
    Tcs = 0x0A,
    Set = 0x0B,
    Mov = 0x0C,
    Ldw = 0x0D,
    Stw = 0x0E,
    Ldb = 0x0F,
    Stb = 0x10,
    Jmi = 0x20,
    Jmp = 0x21,
    Bve = 0x24,
    Bvn = 0x25,
    Cal = 0x2A,
    Ret = 0x2B,
    Mul = 0x30,
    Div = 0x31,
    Mod = 0x32,
    Sia = 0x40,
    Sup = 0x41,
    Sxt = 0x42,
    Seq = 0x43,
    Int = 0xF0,
    Snd = 0xFD,
    Hlt = 0xFF,
}

impl Opcode {
    /// Map an opcode byte to its catalog entry.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        lookup(byte).map(|info| info.opcode)
    }

    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn info(self) -> &'static OpInfo {
        // every variant has exactly one OP_INFO row
        let mut i = 0;
        while OP_INFO[i].opcode as u8 != self as u8 {
            i += 1;
        }
        &OP_INFO[i]
    }

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    /// Loads and stores, whose 8-bit offset is signed.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        matches!(self, Self::Ldw | Self::Stw | Self::Ldb | Self::Stb)
    }
}

/// Static opcode metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpInfo {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    pub shape: OperandShape,
    pub flow: Option<FlowClass>,
}

const fn op(
    opcode: Opcode,
    mnemonic: &'static str,
    shape: OperandShape,
    flow: Option<FlowClass>,
) -> OpInfo {
    OpInfo {
        opcode,
        mnemonic,
        shape,
        flow,
    }
}

use FlowClass as F;
use OperandShape as S;

/// Table-driven `OpInfo` for every defined opcode.
pub const OP_INFO: &[OpInfo] = &[
    op(Opcode::Nop, "nop", S::None, None),
    op(Opcode::Add, "add", S::RegRegReg, None),
    op(Opcode::Sub, "sub", S::RegRegReg, None),
    op(Opcode::And, "and", S::RegRegReg, None),
    op(Opcode::Orr, "orr", S::RegRegReg, None),
    op(Opcode::Xor, "xor", S::RegRegReg, None),
    op(Opcode::Not, "not", S::RegReg, None),
    op(Opcode::Lsh, "lsh", S::RegRegReg, None),
    op(Opcode::Ash, "ash", S::RegRegReg, None),
    op(Opcode::Tcu, "tcu", S::RegRegReg, None),
    op(Opcode::Tcs, "tcs", S::RegRegReg, None),
    op(Opcode::Set, "set", S::RegImm16, None),
    op(Opcode::Mov, "mov", S::RegReg, None),
    op(Opcode::Ldw, "ldw", S::RegRegImm8, None),
    op(Opcode::Stw, "stw", S::RegRegImm8, None),
    op(Opcode::Ldb, "ldb", S::RegRegImm8, None),
    op(Opcode::Stb, "stb", S::RegRegImm8, None),
    op(Opcode::Jmi, "jmi", S::Imm24, Some(F::UnconditionalDirect)),
    op(Opcode::Jmp, "jmp", S::Reg, Some(F::Indirect)),
    op(Opcode::Bve, "bve", S::RegRegImm8, Some(F::ConditionalPair)),
    op(Opcode::Bvn, "bvn", S::RegRegImm8, Some(F::ConditionalPair)),
    op(Opcode::Cal, "cal", S::Reg, Some(F::Call)),
    op(Opcode::Ret, "ret", S::None, Some(F::Return)),
    op(Opcode::Mul, "mul", S::RegRegReg, None),
    op(Opcode::Div, "div", S::RegRegReg, None),
    op(Opcode::Mod, "mod", S::RegRegReg, None),
    op(Opcode::Sia, "sia", S::RegImm8Imm8, None),
    op(Opcode::Sup, "sup", S::RegImm16, None),
    op(Opcode::Sxt, "sxt", S::RegReg, None),
    op(Opcode::Seq, "seq", S::RegRegImm8, None),
    op(Opcode::Int, "int", S::Imm24, Some(F::Exception)),
    op(Opcode::Snd, "snd", S::RegRegReg, None),
    op(Opcode::Hlt, "hlt", S::None, Some(F::UnconditionalSelf)),
];

const fn build_catalog() -> [Option<OpInfo>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < OP_INFO.len() {
        let info = OP_INFO[i];
        table[info.opcode as usize] = Some(info);
        i += 1;
    }
    table
}

static CATALOG: [Option<OpInfo>; 256] = build_catalog();

/// Catalog entry for an opcode byte; `None` for unmapped bytes.
#[must_use]
pub fn lookup(byte: u8) -> Option<&'static OpInfo> {
    CATALOG[usize::from(byte)].as_ref()
}
