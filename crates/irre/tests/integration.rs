//! End-to-end tests: REGA file on disk to listings and IL.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use irre::{
    Analysis, AnalysisOptions, Branch, BranchKind, BranchTarget, Error, Label, RegaError, Stmt,
    reg_name, tokens_to_string,
};
use tempfile::NamedTempFile;

const PROGRAM: [u8; 16] = [
    0x01, 0x03, 0x04, 0x05, // add r3, r4, r5
    0x20, 0x0C, 0x00, 0x00, // jmi 0xc
    0x22, 0x00, 0x00, 0x00, // db 0x22
    0xFF, 0x00, 0x00, 0x00, // hlt
];

fn rega(program: &[u8], symbols: &[(&str, i32)]) -> Vec<u8> {
    let mut data = b"rg".to_vec();
    let size = u16::try_from(program.len()).unwrap();
    data.extend_from_slice(&size.to_le_bytes());
    data.extend_from_slice(program);
    let count = u32::try_from(symbols.len()).unwrap();
    data.extend_from_slice(&count.to_le_bytes());
    for (name, offset) in symbols {
        data.extend_from_slice(name.as_bytes());
        data.push(0);
        data.extend_from_slice(&offset.to_le_bytes());
    }
    data
}

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

fn program_file() -> NamedTempFile {
    write_temp(&rega(&PROGRAM, &[("main", 0), ("end", 12)]))
}

fn load(path: &Path) -> Analysis {
    Analysis::load(path, AnalysisOptions::new().with_jobs(2)).unwrap()
}

#[test]
fn test_disassemble_rega_file() {
    let file = program_file();
    let analysis = load(file.path());

    let lines = analysis.disassemble().unwrap();
    let text: Vec<_> = lines.iter().map(|l| tokens_to_string(&l.tokens)).collect();
    assert_eq!(text, ["add r3, r4, r5", "jmi 0xc", "db 0x22", "hlt"]);
    assert_eq!(lines[1].branches[0].kind, BranchKind::Unconditional);
    assert_eq!(
        lines[3].branches,
        [Branch::new(BranchKind::Unconditional, BranchTarget::Address(12))]
    );

    assert_eq!(analysis.symbol_at(0), Some("main"));
    assert_eq!(analysis.symbol_at(12), Some("end"));
    assert_eq!(analysis.symbol_at(4), None);
}

#[test]
fn test_lift_rega_file() {
    let file = program_file();
    let program = load(file.path()).lift().unwrap();

    assert_eq!(program.instructions, 4);
    assert_eq!(program.unknown_opcodes, 1);
    assert!(program.failures.is_empty());

    let add: Vec<_> = program
        .function
        .instruction(0)
        .unwrap()
        .iter()
        .map(|s| s.display(reg_name).to_string())
        .collect();
    assert_eq!(add, ["loc_0:", "r3 = r4 + r5"]);
    assert_eq!(
        program.function.instruction(4),
        Some(&[Stmt::Goto(Label::Address(12))][..])
    );
    // the slot after jmi opens a block
    assert_eq!(
        program.function.instruction(8),
        Some(&[Stmt::Label(Label::Address(8)), Stmt::Unimplemented][..])
    );
    assert_eq!(
        program.function.instruction(12),
        Some(&[Stmt::Label(Label::Address(12)), Stmt::NoRet][..])
    );
}

#[test]
fn test_load_raw_program() {
    let file = write_temp(&PROGRAM);
    let options = AnalysisOptions::new().with_range(Some(4), Some(2));
    let analysis = Analysis::load_raw(file.path(), options).unwrap();

    let lines = analysis.disassemble().unwrap();
    let addresses: Vec<_> = lines.iter().map(|l| l.address).collect();
    assert_eq!(addresses, [4, 8]);
    assert_eq!(analysis.symbol_at(0), None);
}

#[test]
fn test_load_from_symbol() {
    let file = program_file();
    let options = AnalysisOptions::new().with_range(None, Some(1));
    let analysis = Analysis::load_from_symbol(file.path(), options, "end").unwrap();
    let lines = analysis.disassemble().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].address, 12);

    let err = Analysis::load_from_symbol(file.path(), AnalysisOptions::new(), "nope").err();
    assert!(matches!(err, Some(Error::UnknownSymbol(name)) if name == "nope"));
}

#[test]
fn test_load_rejects_bad_magic() {
    let file = write_temp(b"xx\x04\x00\xFF\x00\x00\x00");
    let err = Analysis::load(file.path(), AnalysisOptions::new()).err();
    assert!(matches!(err, Some(Error::Rega(RegaError::InvalidMagic))));
}

#[test]
fn test_cli_decode() {
    let output = Command::new(env!("CARGO_BIN_EXE_irre"))
        .args(["-s", "decode", "01030405", "0x20 01 00 00"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("add r3, r4, r5"));
    assert!(stdout.contains("r3 = r4 + r5"));
    assert!(stdout.contains("jmi 0x1"));
}

#[test]
fn test_cli_disasm() {
    let file = program_file();
    let output = Command::new(env!("CARGO_BIN_EXE_irre"))
        .arg("-s")
        .arg("disasm")
        .arg("--edges")
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("main:"));
    assert!(stdout.contains("00000004  jmi 0xc  ; jump 0xc"));
    assert!(stdout.contains("0000000c  hlt"));
}

#[test]
fn test_cli_info() {
    let file = program_file();
    let output = Command::new(env!("CARGO_BIN_EXE_irre"))
        .arg("-s")
        .arg("info")
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("arch:         IRRE, 4-byte little-endian, 37 registers, stack sp, link lr"));
    assert!(stdout.contains("mapped size:  0x10 (16 bytes)"));
    assert!(stdout.contains("0x0000000c  end"));
}

#[test]
fn test_cli_disasm_from_symbol() {
    let file = program_file();
    let output = Command::new(env!("CARGO_BIN_EXE_irre"))
        .arg("-s")
        .arg("disasm")
        .arg(file.path())
        .args(["--start", "end"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0000000c  hlt"));
    assert!(!stdout.contains("add r3"));
}

#[test]
fn test_cli_missing_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_irre"))
        .args(["-s", "info", "/nonexistent/program.rega"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
