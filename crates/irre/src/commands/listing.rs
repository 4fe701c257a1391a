//! Disassembly and IL listing commands.

use irre::{Analysis, AnalysisOptions, Line, Stmt, reg_name};
use rustc_hash::FxHashMap;
use tracing::{error, info};

use super::{format_branches, hex_bytes};
use crate::cli::{Cli, EXIT_FAILURE, EXIT_SUCCESS, InputArgs, StartAt};
use crate::terminal::{self, Spinner};

fn open(input: &InputArgs, jobs: usize) -> irre::Result<Analysis> {
    let start = match &input.start {
        Some(StartAt::Symbol(name)) => {
            let options = AnalysisOptions::new()
                .with_jobs(jobs)
                .with_range(None, input.count);
            return Analysis::load_from_symbol(&input.path, options, name);
        }
        Some(StartAt::Address(addr)) => Some(*addr),
        None => None,
    };
    let options = AnalysisOptions::new()
        .with_jobs(jobs)
        .with_range(start, input.count);
    if input.raw {
        Analysis::load_raw(&input.path, options)
    } else {
        Analysis::load(&input.path, options)
    }
}

fn print_symbol(analysis: &Analysis, address: u32) {
    if let Some(name) = analysis.symbol_at(address) {
        println!("\n{}", terminal::dim(&format!("{name}:")));
    }
}

fn print_line(line: &Line, bytes: bool, edges: bool) {
    let mut out = format!("{:08x}  ", line.address);
    if bytes {
        out.push_str(&hex_bytes(&line.raw));
        out.push_str("  ");
    }
    out.push_str(&terminal::styled_tokens(&line.tokens));
    if edges && !line.branches.is_empty() {
        out.push_str("  ");
        out.push_str(&terminal::dim(&format!("; {}", format_branches(&line.branches))));
    }
    println!("{out}");
}

/// Handle the `disasm` command.
pub fn cmd_disasm(cli: &Cli, input: &InputArgs, bytes: bool, edges: bool) -> i32 {
    info!(input = %input.path.display(), "disassembling");

    let spinner = Spinner::new("Disassembling", cli.silent);
    let result = open(input, cli.jobs).and_then(|analysis| {
        let lines = analysis.disassemble()?;
        Ok((analysis, lines))
    });
    spinner.finish();

    let (analysis, lines) = match result {
        Ok(done) => done,
        Err(e) => {
            error!(error = %e, "disassembly failed");
            terminal::error("disassembly failed");
            return EXIT_FAILURE;
        }
    };

    for line in &lines {
        print_symbol(&analysis, line.address);
        print_line(line, bytes, edges);
    }
    info!(instructions = lines.len(), "done");
    EXIT_SUCCESS
}

/// Handle the `lift` command.
pub fn cmd_lift(cli: &Cli, input: &InputArgs) -> i32 {
    info!(input = %input.path.display(), "lifting");

    let spinner = Spinner::new("Lifting", cli.silent);
    let result = open(input, cli.jobs).and_then(|analysis| {
        let lines = analysis.disassemble()?;
        let program = analysis.lift()?;
        Ok((analysis, lines, program))
    });
    spinner.finish();

    let (analysis, lines, program) = match result {
        Ok(done) => done,
        Err(e) => {
            error!(error = %e, "lifting failed");
            terminal::error("lifting failed");
            return EXIT_FAILURE;
        }
    };

    let text: FxHashMap<u32, &Line> = lines.iter().map(|l| (l.address, l)).collect();
    for (address, stmts) in program.function.instructions() {
        print_symbol(&analysis, address);
        text.get(&address).map_or_else(
            || println!("{address:08x}"),
            |line| print_line(line, false, false),
        );
        for stmt in stmts {
            let indent = if matches!(stmt, Stmt::Label(_)) { "  " } else { "    " };
            println!("{indent}{}", stmt.display(reg_name));
        }
    }

    info!(
        instructions = program.instructions,
        unknown = program.unknown_opcodes,
        failures = program.failures.len(),
        "done"
    );
    if program.failures.is_empty() {
        terminal::success(&format!("lifted {} instructions", program.instructions));
    } else {
        terminal::warning(&format!(
            "lifted {} instructions, {} failed",
            program.instructions,
            program.failures.len()
        ));
    }
    EXIT_SUCCESS
}
