//! REGA header structures.

use crate::constants::{PROGRAM_SIZE_OFFSET, REGA_HEADER_SIZE, REGA_MAGIC};
use crate::{RegaError, Result};

/// Fixed 4-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegaHeader {
    /// Declared length of the program that follows the header.
    pub program_size: u16,
}

impl RegaHeader {
    /// Parse and validate the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let Some(header) = data.first_chunk::<REGA_HEADER_SIZE>() else {
            return Err(RegaError::TooSmall);
        };
        if header[..REGA_MAGIC.len()] != REGA_MAGIC {
            return Err(RegaError::InvalidMagic);
        }
        let size = [header[PROGRAM_SIZE_OFFSET], header[PROGRAM_SIZE_OFFSET + 1]];
        Ok(Self {
            program_size: u16::from_le_bytes(size),
        })
    }

    /// File offset of the symbol table, right after the declared program.
    #[must_use]
    pub const fn symbol_table_offset(&self) -> usize {
        REGA_HEADER_SIZE + self.program_size as usize
    }
}

/// Loaded section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedSection {
    pub name: String,
    pub addr: u32,
    pub size: u32,
    /// Segment permission flags (`PF_*`).
    pub flags: u32,
}

/// Symbol table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    /// Signed offset from the load address, as stored in the file.
    pub offset: i32,
    /// Resolved address.
    pub address: u32,
}
