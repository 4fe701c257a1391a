//! Main instruction decoder.

use crate::catalog::{OpInfo, Opcode, OperandShape, lookup};
use crate::{DecodeError, INSTRUCTION_SIZE};

/// Decoded instruction with all fields extracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedInstr {
    /// Address the word was read from.
    pub address: u32,
    /// The raw instruction word.
    pub raw: [u8; INSTRUCTION_SIZE],
    /// Catalog entry; `None` for an unknown opcode.
    pub info: Option<&'static OpInfo>,
    /// Instruction arguments.
    pub args: InstrArgs,
}

/// Instruction argument patterns, one per operand shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrArgs {
    /// No operands (also used for unknown opcodes)
    None,
    /// rA
    R { ra: u8 },
    /// 24-bit immediate
    Imm24 { v0: u32 },
    /// rA, 16-bit immediate
    RImm16 { ra: u8, v0: u16 },
    /// rA, rB
    RR { ra: u8, rb: u8 },
    /// rA, rB, 8-bit immediate (signed only for loads and stores)
    RRImm8 { ra: u8, rb: u8, v0: i32 },
    /// rA, two unsigned 8-bit immediates
    RImm8Imm8 { ra: u8, v0: u8, v1: u8 },
    /// rA, rB, rC
    RRR { ra: u8, rb: u8, rc: u8 },
}

impl InstrArgs {
    /// Extract operand fields from the three bytes after the opcode.
    #[must_use]
    pub fn extract(shape: OperandShape, opcode: Opcode, b: [u8; 3]) -> Self {
        let [b1, b2, b3] = b;
        match shape {
            OperandShape::None => Self::None,
            OperandShape::Reg => Self::R { ra: b1 },
            OperandShape::Imm24 => Self::Imm24 {
                v0: u32::from_le_bytes([b1, b2, b3, 0]),
            },
            OperandShape::RegImm16 => Self::RImm16 {
                ra: b1,
                v0: u16::from_le_bytes([b2, b3]),
            },
            OperandShape::RegReg => Self::RR { ra: b1, rb: b2 },
            OperandShape::RegRegImm8 => {
                let v0 = if opcode.is_memory() {
                    i32::from(i8::from_le_bytes([b3]))
                } else {
                    i32::from(b3)
                };
                Self::RRImm8 { ra: b1, rb: b2, v0 }
            }
            OperandShape::RegImm8Imm8 => Self::RImm8Imm8 {
                ra: b1,
                v0: b2,
                v1: b3,
            },
            OperandShape::RegRegReg => Self::RRR {
                ra: b1,
                rb: b2,
                rc: b3,
            },
        }
    }

    /// Register fields in operand order.
    pub fn registers(&self) -> impl Iterator<Item = u8> {
        let regs = match *self {
            Self::None | Self::Imm24 { .. } => [None, None, None],
            Self::R { ra } | Self::RImm16 { ra, .. } | Self::RImm8Imm8 { ra, .. } => {
                [Some(ra), None, None]
            }
            Self::RR { ra, rb } | Self::RRImm8 { ra, rb, .. } => [Some(ra), Some(rb), None],
            Self::RRR { ra, rb, rc } => [Some(ra), Some(rb), Some(rc)],
        };
        regs.into_iter().flatten()
    }

    /// Named operand fields, for listings.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, i64)> {
        match *self {
            Self::None => vec![],
            Self::R { ra } => vec![("rA", ra.into())],
            Self::Imm24 { v0 } => vec![("v0", v0.into())],
            Self::RImm16 { ra, v0 } => vec![("rA", ra.into()), ("v0", v0.into())],
            Self::RR { ra, rb } => vec![("rA", ra.into()), ("rB", rb.into())],
            Self::RRImm8 { ra, rb, v0 } => {
                vec![("rA", ra.into()), ("rB", rb.into()), ("v0", v0.into())]
            }
            Self::RImm8Imm8 { ra, v0, v1 } => {
                vec![("rA", ra.into()), ("v0", v0.into()), ("v1", v1.into())]
            }
            Self::RRR { ra, rb, rc } => {
                vec![("rA", ra.into()), ("rB", rb.into()), ("rC", rc.into())]
            }
        }
    }
}

impl DecodedInstr {
    #[must_use]
    pub const fn opcode_byte(&self) -> u8 {
        self.raw[0]
    }

    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        self.info.map(|info| info.opcode)
    }

    /// Catalog mnemonic; `None` for an unknown opcode.
    #[must_use]
    pub fn mnemonic(&self) -> Option<&'static str> {
        self.info.map(|info| info.mnemonic)
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.info.is_none()
    }

    /// Address of the next sequential instruction.
    #[must_use]
    pub const fn next_address(&self) -> u32 {
        self.address.wrapping_add(4)
    }

    /// Raw word as a little-endian integer.
    #[must_use]
    pub const fn word(&self) -> u32 {
        u32::from_le_bytes(self.raw)
    }
}

/// Decode the instruction word at the start of `bytes`.
///
/// Only the first four bytes are read. Opcodes missing from the catalog still
/// decode, with `info == None` and no operands.
pub fn decode(bytes: &[u8], address: u32) -> Result<DecodedInstr, DecodeError> {
    let Some(&raw) = bytes.first_chunk::<INSTRUCTION_SIZE>() else {
        return Err(DecodeError::Truncated {
            address,
            available: bytes.len(),
        });
    };
    let info = lookup(raw[0]);
    let args = info.map_or(InstrArgs::None, |info| {
        InstrArgs::extract(info.shape, info.opcode, [raw[1], raw[2], raw[3]])
    });
    Ok(DecodedInstr {
        address,
        raw,
        info,
        args,
    })
}
