//! IL emission target.

use crate::stmt::{Label, Stmt};

/// Receiver of lifted IL.
///
/// Append-only from the lifter's point of view. Sinks that know which
/// addresses belong to the current analysis unit can hand out
/// [`Label::Address`] labels so direct jumps become local gotos.
pub trait IlSink {
    fn append(&mut self, stmt: Stmt);

    /// Label for the instruction at `address`, if it lies in this unit.
    fn label_for_address(&self, _address: u32) -> Option<Label> {
        None
    }

    /// Called once before the statements of each instruction.
    fn begin_instruction(&mut self, _address: u32) {}
}

impl IlSink for Vec<Stmt> {
    fn append(&mut self, stmt: Stmt) {
        self.push(stmt);
    }
}

impl<S: IlSink + ?Sized> IlSink for &mut S {
    fn append(&mut self, stmt: Stmt) {
        (**self).append(stmt);
    }

    fn label_for_address(&self, address: u32) -> Option<Label> {
        (**self).label_for_address(address)
    }

    fn begin_instruction(&mut self, address: u32) {
        (**self).begin_instruction(address);
    }
}
