//! REGA format constants.

// Header layout
pub const REGA_MAGIC: [u8; 2] = *b"rg";
pub const REGA_HEADER_SIZE: usize = 4;
pub const PROGRAM_SIZE_OFFSET: usize = 2;

/// Programs are mapped at address 0 and entered there.
pub const REGA_LOAD_ADDRESS: u32 = 0;

// Segment permission flags
pub const PF_X: u32 = 0x1;
pub const PF_W: u32 = 0x2;
pub const PF_R: u32 = 0x4;

/// Longest symbol name accepted, excluding the terminator.
pub const MAX_SYMBOL_NAME: usize = 256;

pub const TEXT_SECTION: &str = ".text";
