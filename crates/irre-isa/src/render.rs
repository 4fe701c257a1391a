//! Disassembly text tokens.

use crate::catalog::Opcode;
use crate::decode::{DecodedInstr, InstrArgs};
use crate::reg_name;

/// Token kinds, matching what a disassembly view colors differently.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Mnemonic,
    Text,
    Register,
    Integer,
    SignedInteger,
    PossibleAddress,
    BeginMemoryOperand,
    EndMemoryOperand,
    OperandSeparator,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Numeric value for integer and address tokens.
    pub value: Option<i64>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
        }
    }

    fn with_value(kind: TokenKind, text: String, value: i64) -> Self {
        Self {
            kind,
            text,
            value: Some(value),
        }
    }
}

/// Concatenate token texts.
#[must_use]
pub fn tokens_to_string(tokens: &[Token]) -> String {
    tokens.iter().fold(String::new(), |mut out, t| {
        out.push_str(&t.text);
        out
    })
}

/// Threshold above which 16-bit immediates are hinted as addresses.
const ADDRESS_HINT_MIN: u32 = 0x100;

struct TokenWriter {
    tokens: Vec<Token>,
    first: bool,
}

impl TokenWriter {
    fn push(&mut self, kind: TokenKind, text: impl Into<String>) {
        self.tokens.push(Token::new(kind, text));
    }

    fn separator(&mut self) {
        if !self.first {
            self.push(TokenKind::OperandSeparator, ",");
        }
        self.push(TokenKind::Text, " ");
        self.first = false;
    }

    fn register(&mut self, reg: u8) {
        match reg_name(reg) {
            Some(name) => self.push(TokenKind::Register, name),
            None => self.push(TokenKind::Text, format!("UNK_REG_{reg:02x}")),
        }
    }

    /// Unsigned immediate; `size` is its encoded width in bytes.
    fn immediate(&mut self, value: u32, size: u8, is_addr: bool) {
        let kind = if is_addr || (size >= 2 && value > ADDRESS_HINT_MIN) {
            TokenKind::PossibleAddress
        } else {
            TokenKind::Integer
        };
        self.tokens
            .push(Token::with_value(kind, format!("{value:#x}"), value.into()));
    }

    fn signed(&mut self, value: i32) {
        self.tokens.push(Token::with_value(
            TokenKind::SignedInteger,
            value.to_string(),
            value.into(),
        ));
    }
}

/// Render a decoded instruction as display tokens.
#[must_use]
pub fn render(instr: &DecodedInstr) -> Vec<Token> {
    let Some(info) = instr.info else {
        let op = instr.opcode_byte();
        return vec![
            Token::new(TokenKind::Text, "db "),
            Token::with_value(TokenKind::Integer, format!("{op:#04x}"), op.into()),
        ];
    };

    let mut w = TokenWriter {
        tokens: vec![Token::new(TokenKind::Mnemonic, info.mnemonic)],
        first: true,
    };
    let op = info.opcode;

    match instr.args {
        InstrArgs::None => {}
        InstrArgs::R { ra } => {
            w.separator();
            w.register(ra);
        }
        InstrArgs::Imm24 { v0 } => {
            w.separator();
            w.immediate(v0, 3, matches!(op, Opcode::Jmi | Opcode::Int));
        }
        InstrArgs::RImm16 { ra, v0 } => {
            w.separator();
            w.register(ra);
            w.separator();
            w.immediate(v0.into(), 2, op == Opcode::Set);
        }
        InstrArgs::RR { ra, rb } => {
            w.separator();
            w.register(ra);
            w.separator();
            w.register(rb);
        }
        InstrArgs::RRImm8 { ra, rb, v0 } if op.is_memory() => {
            w.separator();
            w.register(ra);
            w.separator();
            w.push(TokenKind::BeginMemoryOperand, "[");
            w.register(rb);
            if v0 != 0 {
                w.push(TokenKind::OperandSeparator, ",");
                w.push(TokenKind::Text, " ");
                w.signed(v0);
            }
            w.push(TokenKind::EndMemoryOperand, "]");
        }
        InstrArgs::RRImm8 { ra, rb, v0 } if matches!(op, Opcode::Bve | Opcode::Bvn) => {
            // condition first, then the register holding the target
            w.separator();
            w.register(rb);
            w.separator();
            w.immediate(v0.unsigned_abs(), 1, false);
            w.separator();
            let target = reg_name(ra).map_or_else(|| format!("UNK_REG_{ra:02x}"), String::from);
            w.push(TokenKind::PossibleAddress, format!("reg({target})"));
        }
        InstrArgs::RRImm8 { ra, rb, v0 } => {
            w.separator();
            w.register(ra);
            w.separator();
            w.register(rb);
            w.separator();
            w.immediate(v0.unsigned_abs(), 1, false);
        }
        InstrArgs::RImm8Imm8 { ra, v0, v1 } => {
            w.separator();
            w.register(ra);
            w.separator();
            w.immediate(v0.into(), 1, false);
            w.separator();
            w.immediate(v1.into(), 1, false);
        }
        InstrArgs::RRR { ra, rb, rc } => {
            w.separator();
            w.register(ra);
            w.separator();
            w.register(rb);
            w.separator();
            w.register(rc);
        }
    }
    w.tokens
}

/// Render a decoded instruction as one line of text.
#[must_use]
pub fn render_text(instr: &DecodedInstr) -> String {
    tokens_to_string(&render(instr))
}
