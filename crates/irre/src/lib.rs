//! IRRE - disassembler and IL lifter for REGA executables
//!
//! Loads a REGA container, sweeps its program in parallel, and produces
//! disassembly listings, control-flow edges and lifted IL.
//!
//! # Example
//!
//! ```ignore
//! use irre::{Analysis, AnalysisOptions};
//!
//! let analysis = Analysis::load("program.rega".as_ref(), AnalysisOptions::new())?;
//! for line in analysis.disassemble()? {
//!     println!("{:08x}  {}", line.address, irre::tokens_to_string(&line.tokens));
//! }
//! ```

// Re-export from sub-crates
pub use irre_ir::{ConstEval, EvalError, Expr, Flow, IRBuilder, IlFunction, IlSink, Label, Stmt};
pub use irre_isa::{
    Branch, BranchKind, BranchTarget, DecodeError, DecodedInstr, Decoder, INSTRUCTION_SIZE,
    InstrArgs, InstrInfo, Irre, LiftError, Lifter, Opcode, Token, TokenKind, classify, decode,
    lift, reg_name, registers, render, render_text, tokens_to_string,
};
pub use irre_rega::{ImageLoader, MemoryImage, RegaError, RegaImage, RegaLoader, Symbol};

mod analysis;
mod options;

pub use analysis::*;
pub use options::*;

use thiserror::Error;

/// Analysis errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("REGA error: {0}")]
    Rega(#[from] RegaError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Start address {0:#x} is outside the image")]
    StartOutOfRange(u32),
    #[error("Unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("Invalid instruction word '{0}': expected up to 8 hex digits")]
    InvalidWord(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parse an instruction word written as hex bytes in memory order.
///
/// `01030405` and `0x01 03 04 05` both yield `[0x01, 0x03, 0x04, 0x05]`.
/// Fewer than four bytes are allowed so truncated input can be decoded.
pub fn parse_word(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    let invalid = || Error::InvalidWord(text.to_string());
    if digits.is_empty()
        || digits.len() % 2 != 0
        || digits.len() > 2 * INSTRUCTION_SIZE
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(invalid());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid()))
        .collect()
}
