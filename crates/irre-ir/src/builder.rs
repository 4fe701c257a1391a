//! IL builder fluent API.

use crate::expr::{Expr, Temp};
use crate::sink::IlSink;
use crate::stmt::{Label, Stmt};

/// Per-instruction IL builder.
///
/// Created once per lifting call. Labels and temporaries it hands out are
/// qualified by the instruction address, so builders for different
/// instructions never collide inside a shared sink.
pub struct IRBuilder<'a, S: IlSink + ?Sized> {
    sink: &'a mut S,
    address: u32,
    next_label: u16,
    next_temp: u8,
}

impl<'a, S: IlSink + ?Sized> IRBuilder<'a, S> {
    /// Start lifting the instruction at `address` into `sink`.
    pub fn new(sink: &'a mut S, address: u32) -> Self {
        sink.begin_instruction(address);
        Self {
            sink,
            address,
            next_label: 0,
            next_temp: 0,
        }
    }

    #[must_use]
    pub const fn address(&self) -> u32 {
        self.address
    }

    /// Allocate a fresh local label.
    pub const fn label(&mut self) -> Label {
        let id = self.next_label;
        self.next_label += 1;
        Label::Local {
            owner: self.address,
            id,
        }
    }

    /// Allocate a fresh temporary.
    pub const fn temp(&mut self) -> Temp {
        let temp = Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Label for a branch target, when the sink owns that address.
    #[must_use]
    pub fn label_for_address(&self, address: u32) -> Option<Label> {
        self.sink.label_for_address(address)
    }

    /// Add a raw statement.
    pub fn stmt(&mut self, stmt: Stmt) -> &mut Self {
        self.sink.append(stmt);
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.stmt(Stmt::Nop)
    }

    /// Write to a register.
    pub fn write_reg(&mut self, reg: u8, value: Expr) -> &mut Self {
        self.stmt(Stmt::SetReg { reg, value })
    }

    pub fn write_temp(&mut self, temp: Temp, value: Expr) -> &mut Self {
        self.stmt(Stmt::SetTemp { temp, value })
    }

    /// Write the low `width` bytes of `value` to memory.
    pub fn write_mem(&mut self, addr: Expr, value: Expr, width: u8) -> &mut Self {
        self.stmt(Stmt::Store { addr, value, width })
    }

    /// Add a two-way conditional branch.
    pub fn if_goto(&mut self, cond: Expr, then_label: Label, else_label: Label) -> &mut Self {
        self.stmt(Stmt::If {
            cond,
            then_label,
            else_label,
        })
    }

    pub fn goto(&mut self, label: Label) -> &mut Self {
        self.stmt(Stmt::Goto(label))
    }

    /// Place `label` at the current position.
    pub fn mark(&mut self, label: Label) -> &mut Self {
        self.stmt(Stmt::Label(label))
    }

    pub fn jump(&mut self, target: Expr) -> &mut Self {
        self.stmt(Stmt::Jump(target))
    }

    pub fn call(&mut self, target: Expr) -> &mut Self {
        self.stmt(Stmt::Call(target))
    }

    pub fn ret(&mut self, target: Expr) -> &mut Self {
        self.stmt(Stmt::Ret(target))
    }

    pub fn no_ret(&mut self) -> &mut Self {
        self.stmt(Stmt::NoRet)
    }

    pub fn syscall(&mut self, code: u32) -> &mut Self {
        self.stmt(Stmt::Syscall(code))
    }

    pub fn unimplemented(&mut self) -> &mut Self {
        self.stmt(Stmt::Unimplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_qualified_by_address() {
        let mut sink: Vec<Stmt> = Vec::new();
        let mut a = IRBuilder::new(&mut sink, 4);
        let first = a.label();
        let second = a.label();
        assert_eq!(first, Label::Local { owner: 4, id: 0 });
        assert_eq!(second, Label::Local { owner: 4, id: 1 });

        let mut b = IRBuilder::new(&mut sink, 8);
        assert_ne!(b.label(), first);
    }

    #[test]
    fn test_temps_restart_per_builder() {
        let mut sink: Vec<Stmt> = Vec::new();
        let mut a = IRBuilder::new(&mut sink, 0);
        assert_eq!(a.temp(), Temp(0));
        assert_eq!(a.temp(), Temp(1));
        let mut b = IRBuilder::new(&mut sink, 4);
        assert_eq!(b.temp(), Temp(0));
    }

    #[test]
    fn test_fluent_emission_order() {
        let mut sink: Vec<Stmt> = Vec::new();
        let mut b = IRBuilder::new(&mut sink, 0);
        let done = b.label();
        b.write_reg(1, Expr::imm(5)).goto(done).mark(done);
        assert_eq!(
            sink,
            vec![
                Stmt::SetReg {
                    reg: 1,
                    value: Expr::Const(5)
                },
                Stmt::Goto(done),
                Stmt::Label(done),
            ]
        );
    }

    #[test]
    fn test_vec_sink_has_no_address_labels() {
        let mut sink: Vec<Stmt> = Vec::new();
        let b = IRBuilder::new(&mut sink, 0);
        assert_eq!(b.label_for_address(0), None);
    }
}
