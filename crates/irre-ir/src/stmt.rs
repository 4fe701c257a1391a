//! Statement IL.

use std::fmt;

use crate::expr::{Expr, RegNames, Temp, fmt_reg, width_suffix};

/// Branch target inside a sink.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Label {
    /// Label allocated while lifting the instruction at `owner`.
    Local { owner: u32, id: u16 },
    /// Start of the instruction at this address.
    Address(u32),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { owner, id } => write!(f, "@{owner:x}.{id}"),
            Self::Address(addr) => write!(f, "loc_{addr:x}"),
        }
    }
}

/// Statement kinds.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Stmt {
    Nop,
    SetReg {
        reg: u8,
        value: Expr,
    },
    SetTemp {
        temp: Temp,
        value: Expr,
    },
    /// Store the low `width` bytes of `value`, little-endian.
    Store {
        addr: Expr,
        value: Expr,
        width: u8,
    },
    If {
        cond: Expr,
        then_label: Label,
        else_label: Label,
    },
    Goto(Label),
    /// Places a label at this point of the statement stream.
    Label(Label),
    Jump(Expr),
    Call(Expr),
    Ret(Expr),
    NoRet,
    Syscall(u32),
    Unimplemented,
}

impl Stmt {
    #[must_use]
    pub const fn display(&self, names: RegNames) -> StmtDisplay<'_> {
        StmtDisplay { stmt: self, names }
    }
}

/// [`Stmt`] paired with a register naming function.
pub struct StmtDisplay<'a> {
    stmt: &'a Stmt,
    names: RegNames,
}

impl fmt::Display for StmtDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names;
        match self.stmt {
            Stmt::Nop => f.write_str("nop"),
            Stmt::SetReg { reg, value } => {
                fmt_reg(f, names, *reg)?;
                write!(f, " = {}", value.display(names))
            }
            Stmt::SetTemp { temp, value } => write!(f, "{temp} = {}", value.display(names)),
            Stmt::Store { addr, value, width } => write!(
                f,
                "[{}].{} = {}",
                addr.display(names),
                width_suffix(*width),
                value.display(names)
            ),
            Stmt::If {
                cond,
                then_label,
                else_label,
            } => write!(
                f,
                "if ({}) goto {then_label} else {else_label}",
                cond.display(names)
            ),
            Stmt::Goto(label) => write!(f, "goto {label}"),
            Stmt::Label(label) => write!(f, "{label}:"),
            Stmt::Jump(target) => write!(f, "jump({})", target.display(names)),
            Stmt::Call(target) => write!(f, "call({})", target.display(names)),
            Stmt::Ret(target) => write!(f, "return {}", target.display(names)),
            Stmt::NoRet => f.write_str("no_return"),
            Stmt::Syscall(code) => write!(f, "syscall({code:#x})"),
            Stmt::Unimplemented => f.write_str("unimplemented"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(idx: u8) -> Option<&'static str> {
        const GPR: [&str; 4] = ["r0", "r1", "r2", "r3"];
        match idx {
            0x21 => Some("lr"),
            _ => GPR.get(usize::from(idx)).copied(),
        }
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Local { owner: 4, id: 0 }.to_string(), "@4.0");
        assert_eq!(Label::Local { owner: 0x1c, id: 2 }.to_string(), "@1c.2");
        assert_eq!(Label::Address(0x40).to_string(), "loc_40");
    }

    #[test]
    fn test_if_display() {
        let stmt = Stmt::If {
            cond: Expr::eq(Expr::reg(0x21), Expr::imm(0)),
            then_label: Label::Local { owner: 4, id: 0 },
            else_label: Label::Local { owner: 4, id: 1 },
        };
        assert_eq!(
            stmt.display(names).to_string(),
            "if (lr == 0x0) goto @4.0 else @4.1"
        );
    }

    #[test]
    fn test_store_display() {
        let stmt = Stmt::Store {
            addr: Expr::add(Expr::reg(2), Expr::imm(8)),
            value: Expr::reg(1),
            width: 4,
        };
        assert_eq!(stmt.display(names).to_string(), "[r2 + 0x8].d = r1");
    }

    #[test]
    fn test_misc_display() {
        let set = Stmt::SetReg {
            reg: 0x30,
            value: Expr::imm(1),
        };
        assert_eq!(set.display(names).to_string(), "reg48 = 0x1");
        assert_eq!(Stmt::Syscall(0x11).display(names).to_string(), "syscall(0x11)");
        assert_eq!(Stmt::NoRet.display(names).to_string(), "no_return");
        let ret = Stmt::Ret(Expr::temp(Temp(0)));
        assert_eq!(ret.display(names).to_string(), "return t0");
    }
}
