//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "irre")]
#[command(about = "IRRE disassembler and IL lifter for REGA executables")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (irre=debug on top of RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    pub jobs: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show header, entry point and symbols of a REGA file
    Info {
        /// Input REGA file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Disassemble a REGA file
    Disasm {
        #[command(flatten)]
        input: InputArgs,

        /// Show raw instruction bytes
        #[arg(long)]
        bytes: bool,

        /// Show control-flow edges
        #[arg(long)]
        edges: bool,
    },
    /// Lift a REGA file to IL
    Lift {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Decode instruction words given as hex bytes (e.g. 01030405)
    Decode {
        /// Instruction words in memory byte order
        #[arg(value_name = "WORD", required = true)]
        words: Vec<String>,

        /// Address of the first word
        #[arg(long, value_parser = parse_address, default_value = "0")]
        address: u32,
    },
}

/// Input selection shared by the listing commands.
#[derive(Args)]
pub struct InputArgs {
    /// Input file
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Treat the input as a headerless program mapped at 0
    #[arg(long)]
    pub raw: bool,

    /// First address (hex with 0x, or decimal) or symbol name to list from
    #[arg(long, value_parser = parse_start)]
    pub start: Option<StartAt>,

    /// Maximum number of instructions to list
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

/// Where a listing begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartAt {
    Address(u32),
    Symbol(String),
}

/// Parse `--start`: an address, or otherwise a symbol name.
pub fn parse_start(text: &str) -> Result<StartAt, String> {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        parse_address(text).map(StartAt::Address)
    } else if text.is_empty() {
        Err("empty start".to_string())
    } else {
        Ok(StartAt::Symbol(text.to_string()))
    }
}

/// Parse an address given as `0x`-prefixed hex or decimal.
pub fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x10"), Ok(0x10));
        assert_eq!(parse_address("0XfF"), Ok(0xff));
        assert_eq!(parse_address("16"), Ok(16));
        assert!(parse_address("0xg").is_err());
        assert!(parse_address("-4").is_err());
    }

    #[test]
    fn test_parse_disasm_args() {
        let cli = Cli::parse_from([
            "irre", "-j", "4", "disasm", "prog.rega", "--start", "0x8", "-n", "3", "--edges",
        ]);
        assert_eq!(cli.jobs, 4);
        let Commands::Disasm {
            input,
            bytes,
            edges,
        } = cli.command
        else {
            panic!("expected disasm");
        };
        assert_eq!(input.path, PathBuf::from("prog.rega"));
        assert_eq!(input.start, Some(StartAt::Address(8)));
        assert_eq!(input.count, Some(3));
        assert!(!input.raw);
        assert!(!bytes);
        assert!(edges);
    }

    #[test]
    fn test_parse_start() {
        assert_eq!(parse_start("0x8"), Ok(StartAt::Address(8)));
        assert_eq!(parse_start("12"), Ok(StartAt::Address(12)));
        assert_eq!(parse_start("main"), Ok(StartAt::Symbol("main".to_string())));
        assert!(parse_start("0xzz").is_err());
        assert!(parse_start("").is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_silent() {
        assert!(Cli::try_parse_from(["irre", "-v", "-s", "info", "x"]).is_err());
    }
}
