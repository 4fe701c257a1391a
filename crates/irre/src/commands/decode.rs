//! Decode command.

use irre::{DecodedInstr, Stmt, parse_word, reg_name};
use tracing::error;

use super::{format_branches, hex_bytes};
use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Handle the `decode` command.
pub fn cmd_decode(words: &[String], address: u32) -> i32 {
    let mut failed = false;
    let mut addr = address;
    for word in words {
        if let Err(e) = decode_one(word, addr) {
            error!(error = %e, word = %word, "decode failed");
            failed = true;
        }
        addr = addr.wrapping_add(4);
    }
    if failed { EXIT_FAILURE } else { EXIT_SUCCESS }
}

fn decode_one(word: &str, address: u32) -> irre::Result<()> {
    let bytes = parse_word(word)?;
    let instr = irre::decode(&bytes, address)?;

    println!(
        "{address:08x}  {}  {}",
        hex_bytes(&instr.raw),
        terminal::styled_tokens(&irre::render(&instr))
    );
    let opcode = instr.info.map_or_else(
        || format!("{:#04x} unknown", instr.opcode_byte()),
        |info| format!("{:#04x} {} {:?}", info.opcode.byte(), info.mnemonic, info.shape),
    );
    println!("  opcode  {opcode}");
    println!("  word    {:#010x}", instr.word());

    let fields = instr.args.fields();
    if !fields.is_empty() {
        let fields: Vec<_> = fields
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        println!("  fields  {}", fields.join(" "));
    }

    let info = irre::classify(&instr);
    if info.branches.is_empty() {
        println!("  edges   none");
    } else {
        println!("  edges   {}", format_branches(&info.branches));
    }

    for line in il_lines(&instr) {
        println!("  il      {line}");
    }
    Ok(())
}

/// Lifted IL, followed by the lift error when there is one.
fn il_lines(instr: &DecodedInstr) -> Vec<String> {
    let mut stmts: Vec<Stmt> = Vec::new();
    let outcome = irre::lift(instr, &mut stmts);
    let mut lines: Vec<_> = stmts
        .iter()
        .map(|stmt| stmt.display(reg_name).to_string())
        .collect();
    if let Err(e) = outcome {
        lines.push(format!("error: {e}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_words() {
        assert_eq!(cmd_decode(&["01030405".to_string()], 0), EXIT_SUCCESS);
        assert_eq!(
            cmd_decode(&["20010000".to_string(), "xyz".to_string()], 0),
            EXIT_FAILURE
        );
        // three bytes decode as insufficient data
        assert_eq!(cmd_decode(&["010304".to_string()], 0), EXIT_FAILURE);
    }

    #[test]
    fn test_il_lines_report_lift_error() {
        let add = irre::decode(&[0x01, 0x03, 0x04, 0x05], 0).unwrap();
        assert_eq!(il_lines(&add), ["r3 = r4 + r5"]);

        // ldw r1, [UNK_REG_99]
        let bad = irre::decode(&[0x0D, 0x01, 0x99, 0x00], 0x8).unwrap();
        assert_eq!(
            il_lines(&bad),
            ["unimplemented", "error: invalid register index 0x99 at 0x8"]
        );
    }
}
