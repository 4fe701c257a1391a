//! REGA file parser.

use tracing::{debug, warn};

use crate::constants::{MAX_SYMBOL_NAME, REGA_HEADER_SIZE, REGA_LOAD_ADDRESS};
use crate::header::{RegaHeader, Symbol};
use crate::{RegaError, Result};

/// Read a little-endian 4-byte field, if fully present.
#[inline]
fn read_le32(data: &[u8], offset: usize) -> Option<[u8; 4]> {
    data.get(offset..)?.first_chunk::<4>().copied()
}

/// Parsed REGA file.
#[derive(Clone, Debug)]
pub struct RegaFile {
    pub header: RegaHeader,
    /// Program bytes present in the file; shorter than declared when the
    /// file is cut off.
    pub program: Vec<u8>,
    pub symbols: Vec<Symbol>,
}

impl RegaFile {
    /// Parse a REGA file from raw bytes.
    ///
    /// Only a bad header is an error. A short program and a malformed symbol
    /// table are logged and loaded as far as they go.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = RegaHeader::parse(data)?;

        let declared = usize::from(header.program_size);
        let body = data.get(REGA_HEADER_SIZE..).unwrap_or_default();
        let present = declared.min(body.len());
        if present < declared {
            warn!(declared, present, "program is shorter than its declared size");
        }
        let program = body[..present].to_vec();
        let symbols = parse_symbols(data, header.symbol_table_offset());

        Ok(Self {
            header,
            program,
            symbols,
        })
    }
}

/// Parse the optional symbol table at `table_offset`.
fn parse_symbols(data: &[u8], table_offset: usize) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    // no table at all
    if table_offset >= data.len() {
        return symbols;
    }
    match read_symbols(data, table_offset, &mut symbols) {
        Ok(()) => debug!(
            count = symbols.len(),
            "found symbol table at {table_offset:#x}"
        ),
        Err(err) => warn!(
            parsed = symbols.len(),
            "failed during symbol table parsing: {err}"
        ),
    }
    symbols
}

fn read_symbols(data: &[u8], table_offset: usize, symbols: &mut Vec<Symbol>) -> Result<()> {
    let count = read_le32(data, table_offset).ok_or(RegaError::TruncatedSymbolTable {
        offset: table_offset,
    })?;
    let count = u32::from_le_bytes(count);

    let mut cursor = table_offset + 4;
    for _ in 0..count {
        let (name, next) = read_name(data, cursor)?;
        let offset = read_le32(data, next)
            .map(i32::from_le_bytes)
            .ok_or(RegaError::TruncatedSymbolTable { offset: next })?;
        cursor = next + 4;
        symbols.push(Symbol {
            name,
            offset,
            address: REGA_LOAD_ADDRESS.wrapping_add_signed(offset),
        });
    }
    Ok(())
}

/// Read a NUL-terminated name; end of data also ends it.
fn read_name(data: &[u8], start: usize) -> Result<(String, usize)> {
    let rest = data.get(start..).unwrap_or_default();
    let len = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    if len > MAX_SYMBOL_NAME {
        return Err(RegaError::SymbolNameTooLong { offset: start });
    }
    let name = String::from_utf8_lossy(&rest[..len]).into_owned();
    Ok((name, start + len + 1))
}
