//! Info command.

use std::path::Path;

use irre::{Decoder, ImageLoader, Irre, RegaLoader, reg_name, registers};
use tracing::{error, info};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Handle the `info` command.
pub fn cmd_info(input: &Path) -> i32 {
    info!(input = %input.display(), "reading");

    let image = match RegaLoader.load_file(input) {
        Ok(image) => image,
        Err(e) => {
            error!(error = %e, "failed to load REGA file");
            return EXIT_FAILURE;
        }
    };

    println!("format:       {}", RegaLoader.name());
    let arch = Irre.arch_info();
    println!(
        "arch:         {}, {}-byte {}, {} registers, stack {}, link {}",
        arch.name,
        arch.address_size,
        if arch.little_endian { "little-endian" } else { "big-endian" },
        registers().count(),
        reg_name(arch.stack_pointer).unwrap_or("?"),
        reg_name(arch.link_register).unwrap_or("?"),
    );
    if let Some(size) = image.program_size {
        println!("program size: {size:#06x} ({size} bytes)");
    }
    println!("entry point:  {:#010x}", image.entry_point);
    let mapped = image.total_size();
    println!("mapped size:  {mapped:#x} ({mapped} bytes)");
    for segment in &image.memory_segments {
        let perms = format!(
            "r{}{}",
            if segment.is_readonly() { '-' } else { 'w' },
            if segment.is_executable() { 'x' } else { '-' },
        );
        println!(
            "segment:      {:#010x}-{:#010x} {perms} ({} bytes in file)",
            segment.virtual_start,
            segment.virtual_end,
            segment.filesz()
        );
        if segment.filesz() < segment.memsz() as usize {
            terminal::warning("program is shorter than its declared size");
        }
    }
    for section in &image.sections {
        println!(
            "section:      {} {:#010x} +{:#x}",
            section.name, section.addr, section.size
        );
    }
    println!("symbols:      {}", image.symbols.len());
    for symbol in &image.symbols {
        println!("  {:#010x}  {}", symbol.address, symbol.name);
    }
    EXIT_SUCCESS
}
