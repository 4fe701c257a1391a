//! Command implementations.
//!
//! Each submodule handles a specific CLI command.

mod decode;
mod info;
mod listing;

use irre::{Branch, BranchKind, BranchTarget, reg_name};

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Info { input } => info::cmd_info(input),
        Commands::Disasm {
            input,
            bytes,
            edges,
        } => listing::cmd_disasm(cli, input, *bytes, *edges),
        Commands::Lift { input } => listing::cmd_lift(cli, input),
        Commands::Decode { words, address } => decode::cmd_decode(words, *address),
    }
}

/// Raw bytes as `01 03 04 05`.
fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One edge as `false 0x24` or `call r3`.
fn format_branch(branch: &Branch) -> String {
    let kind = match branch.kind {
        BranchKind::Unconditional => "jump",
        BranchKind::Indirect => "indirect",
        BranchKind::True => "true",
        BranchKind::False => "false",
        BranchKind::Call => "call",
        BranchKind::Return => "return",
        BranchKind::Exception => "exception",
    };
    match branch.target {
        BranchTarget::Address(addr) => format!("{kind} {addr:#x}"),
        BranchTarget::Register(reg) => reg_name(reg).map_or_else(
            || format!("{kind} reg{reg}"),
            |name| format!("{kind} {name}"),
        ),
        BranchTarget::Unknown => kind.to_string(),
    }
}

fn format_branches(branches: &[Branch]) -> String {
    branches
        .iter()
        .map(format_branch)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_branches() {
        let instr = irre::decode(&[0x24, 0x05, 0x01, 0x00], 0x20).unwrap();
        let info = irre::classify(&instr);
        assert_eq!(format_branches(&info.branches), "true r5, false 0x24");

        let instr = irre::decode(&[0xF0, 0x01, 0x00, 0x00], 0).unwrap();
        assert_eq!(format_branches(&irre::classify(&instr).branches), "exception");
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(&[0x01, 0xab]), "01 ab");
        assert_eq!(hex_bytes(&[]), "");
    }
}
