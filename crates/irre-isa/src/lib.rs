//! IRRE instruction set definitions and decoder.
//!
//! This crate provides the opcode catalog, instruction decoding, control-flow
//! classification, disassembly tokens and lifting to `irre-ir` for the IRRE
//! architecture: 32-bit little-endian words, one opcode byte followed by
//! three operand bytes.

mod catalog;
mod decode;
mod flow;
mod lift;
mod render;
mod types;

pub use catalog::*;
pub use decode::*;
pub use flow::*;
pub use lift::*;
pub use render::*;
pub use types::*;

use irre_ir::IlSink;
use thiserror::Error;

/// Decoding errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("insufficient data at {address:#x}: need 4 bytes, have {available}")]
    Truncated { address: u32, available: usize },
}

/// Lifting errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LiftError {
    #[error("invalid register index {register:#x} at {address:#x}")]
    InvalidRegister { address: u32, register: u8 },
}

/// Instruction decoding for an analysis host.
///
/// Only `decode` is required; classification and rendering are derived
/// from it.
pub trait Decoder: Send + Sync {
    /// Fixed architecture facts.
    fn arch_info(&self) -> &'static ArchInfo {
        &ARCH_INFO
    }

    /// Decode the instruction at the start of `bytes`.
    fn decode(&self, bytes: &[u8], address: u32) -> Result<DecodedInstr, DecodeError>;

    /// Length and outgoing edges.
    fn instruction_info(&self, bytes: &[u8], address: u32) -> Result<InstrInfo, DecodeError> {
        self.decode(bytes, address).map(|instr| classify(&instr))
    }

    /// Disassembly tokens.
    fn instruction_text(&self, bytes: &[u8], address: u32) -> Result<Vec<Token>, DecodeError> {
        self.decode(bytes, address).map(|instr| render(&instr))
    }
}

/// Translation of decoded instructions to IL.
pub trait Lifter: Send + Sync {
    /// Lift into `sink`, returning the instruction length.
    fn lift(&self, instr: &DecodedInstr, sink: &mut dyn IlSink) -> Result<usize, LiftError>;
}

/// The IRRE architecture.
#[derive(Clone, Copy, Debug, Default)]
pub struct Irre;

impl Decoder for Irre {
    fn decode(&self, bytes: &[u8], address: u32) -> Result<DecodedInstr, DecodeError> {
        decode(bytes, address)
    }
}

impl Lifter for Irre {
    fn lift(&self, instr: &DecodedInstr, sink: &mut dyn IlSink) -> Result<usize, LiftError> {
        lift(instr, sink)
    }
}
