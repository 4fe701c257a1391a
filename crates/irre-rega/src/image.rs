//! REGA image with memory segments.

use crate::constants::{PF_R, PF_W, PF_X, REGA_LOAD_ADDRESS, TEXT_SECTION};
use crate::file::RegaFile;
use crate::header::{LoadedSection, Symbol};
use crate::Result;

/// Addressable view of a loaded program.
pub trait MemoryImage {
    /// Bytes starting at `address`. A slice shorter than `len` means the
    /// mapping ended first; an empty slice means `address` is unmapped.
    fn read(&self, address: u32, len: usize) -> &[u8];

    fn entry_point(&self) -> u32;
}

/// A memory segment with virtual address and data.
///
/// The `data` field holds the bytes present in the file. The mapped size
/// is `virtual_end - virtual_start` and may be larger when the file is cut
/// off; reads past `data` come back short.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemorySegment {
    pub virtual_start: u32,
    pub virtual_end: u32,
    pub data: Vec<u8>,
    pub flags: u32,
}

impl MemorySegment {
    /// Size of file data.
    #[must_use]
    pub fn filesz(&self) -> usize {
        self.data.len()
    }

    /// Mapped size.
    #[must_use]
    pub const fn memsz(&self) -> u32 {
        self.virtual_end - self.virtual_start
    }

    #[must_use]
    pub const fn contains(&self, address: u32) -> bool {
        address >= self.virtual_start && address < self.virtual_end
    }

    /// Check if segment is read-only (no write flag).
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        (self.flags & PF_W) == 0
    }

    /// Check if segment is executable.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        (self.flags & PF_X) != 0
    }

    fn read(&self, address: u32, len: usize) -> &[u8] {
        if !self.contains(address) {
            return &[];
        }
        let start = (address - self.virtual_start) as usize;
        let available = self.data.get(start..).unwrap_or_default();
        &available[..len.min(available.len())]
    }
}

/// REGA image ready for analysis.
#[derive(Clone, Debug)]
pub struct RegaImage {
    pub entry_point: u32,
    /// Declared program size from the header; `None` for raw images.
    pub program_size: Option<u16>,
    pub memory_segments: Vec<MemorySegment>,
    pub sections: Vec<LoadedSection>,
    /// Symbols sorted by address.
    pub symbols: Vec<Symbol>,
}

impl RegaImage {
    /// Parse a REGA file from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let RegaFile {
            header,
            program,
            mut symbols,
        } = RegaFile::parse(data)?;
        symbols.sort_by_key(|s| s.address);

        let mut image = Self::from_bytecode(program, REGA_LOAD_ADDRESS);
        // the mapping covers the declared size even if the file is short
        if let Some(segment) = image.memory_segments.first_mut() {
            segment.virtual_end = REGA_LOAD_ADDRESS + u32::from(header.program_size);
        }
        if let Some(section) = image.sections.first_mut() {
            section.size = u32::from(header.program_size);
        }
        image.program_size = Some(header.program_size);
        image.symbols = symbols;
        Ok(image)
    }

    /// Create an image from raw bytecode (not an actual REGA file).
    #[must_use]
    pub fn from_bytecode(bytecode: Vec<u8>, base: u32) -> Self {
        let size = u32::try_from(bytecode.len()).unwrap_or(u32::MAX);
        let end = base.saturating_add(size);
        let flags = PF_R | PF_X;
        Self {
            entry_point: base,
            program_size: None,
            sections: vec![LoadedSection {
                name: TEXT_SECTION.to_string(),
                addr: base,
                size: end - base,
                flags,
            }],
            memory_segments: vec![MemorySegment {
                virtual_start: base,
                virtual_end: end,
                data: bytecode,
                flags,
            }],
            symbols: Vec::new(),
        }
    }

    /// Lowest mapped address.
    #[must_use]
    pub fn start(&self) -> u32 {
        self.memory_segments
            .iter()
            .map(|s| s.virtual_start)
            .min()
            .unwrap_or(self.entry_point)
    }

    /// End of file-backed data in the highest segment.
    #[must_use]
    pub fn data_end(&self) -> u32 {
        self.memory_segments
            .iter()
            .map(|s| {
                let len = u32::try_from(s.filesz()).unwrap_or(u32::MAX);
                s.virtual_start.saturating_add(len)
            })
            .max()
            .unwrap_or(self.entry_point)
    }

    /// Get total mapped size.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.memory_segments.iter().map(|s| u64::from(s.memsz())).sum()
    }

    /// Symbol defined exactly at `address`.
    #[must_use]
    pub fn symbol_at(&self, address: u32) -> Option<&Symbol> {
        let idx = self.symbols.partition_point(|s| s.address < address);
        self.symbols.get(idx).filter(|s| s.address == address)
    }

    /// Look up a symbol address by name.
    #[must_use]
    pub fn lookup_symbol(&self, name: &str) -> Option<u32> {
        self.symbols
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.address)
    }
}

impl MemoryImage for RegaImage {
    fn read(&self, address: u32, len: usize) -> &[u8] {
        self.memory_segments
            .iter()
            .find(|s| s.contains(address))
            .map_or(&[][..], |s| s.read(address, len))
    }

    fn entry_point(&self) -> u32 {
        self.entry_point
    }
}
