//! Recording sink.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::sink::IlSink;
use crate::stmt::{Label, Stmt};

/// IL recorded for a run of instructions, grouped by instruction address.
///
/// Knows the set of block-start addresses of the analysis unit. Direct
/// branches to those addresses are lifted as local gotos, and an address
/// label is placed when an instruction at a block start begins.
#[derive(Clone, Debug, Default)]
pub struct IlFunction {
    stmts: Vec<Stmt>,
    /// (address, index of its first statement)
    instrs: Vec<(u32, usize)>,
    block_starts: Arc<FxHashSet<u32>>,
}

impl IlFunction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that resolves branches to the given block starts.
    #[must_use]
    pub fn with_block_starts(block_starts: Arc<FxHashSet<u32>>) -> Self {
        Self {
            block_starts,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn block_starts(&self) -> &FxHashSet<u32> {
        &self.block_starts
    }

    /// All recorded statements in emission order.
    #[must_use]
    pub fn statements(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Number of instructions recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Iterate over `(address, statements)` per recorded instruction.
    pub fn instructions(&self) -> impl Iterator<Item = (u32, &[Stmt])> + '_ {
        self.instrs.iter().enumerate().map(|(i, &(addr, start))| {
            let end = self
                .instrs
                .get(i + 1)
                .map_or(self.stmts.len(), |&(_, next)| next);
            (addr, &self.stmts[start..end])
        })
    }

    /// Statements recorded for the instruction at `address`.
    #[must_use]
    pub fn instruction(&self, address: u32) -> Option<&[Stmt]> {
        self.instructions()
            .find(|&(addr, _)| addr == address)
            .map(|(_, stmts)| stmts)
    }

    /// Append everything recorded in `other` after this function's content.
    pub fn extend(&mut self, other: Self) {
        let base = self.stmts.len();
        self.instrs
            .extend(other.instrs.into_iter().map(|(addr, start)| (addr, start + base)));
        self.stmts.extend(other.stmts);
    }
}

impl IlSink for IlFunction {
    fn append(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    fn label_for_address(&self, address: u32) -> Option<Label> {
        self.block_starts
            .contains(&address)
            .then_some(Label::Address(address))
    }

    fn begin_instruction(&mut self, address: u32) {
        self.instrs.push((address, self.stmts.len()));
        if self.block_starts.contains(&address) {
            self.stmts.push(Stmt::Label(Label::Address(address)));
        }
    }
}
