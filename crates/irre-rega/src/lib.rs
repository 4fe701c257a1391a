//! Loader for the REGA executable container.
//!
//! A REGA file is a 4-byte header (`rg` magic, little-endian u16 program
//! size), the program itself, and an optional symbol table. The program is
//! mapped read+execute at address 0 and entered there.

mod constants;
mod file;
mod header;
mod image;
mod loader;

pub use constants::*;
pub use file::*;
pub use header::*;
pub use image::*;
pub use loader::*;

use thiserror::Error;

/// REGA parsing errors.
#[derive(Error, Debug)]
pub enum RegaError {
    #[error("REGA data too small")]
    TooSmall,
    #[error("Invalid REGA magic number")]
    InvalidMagic,
    #[error("Symbol table truncated at offset {offset:#x}")]
    TruncatedSymbolTable { offset: usize },
    #[error("Symbol name too long at offset {offset:#x}")]
    SymbolNameTooLong { offset: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegaError>;
