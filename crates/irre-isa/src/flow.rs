//! Control-flow classification.

use crate::catalog::FlowClass;
use crate::decode::{DecodedInstr, InstrArgs};
use crate::{INSTRUCTION_SIZE, REG_LR};

/// Edge kinds leaving an instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BranchKind {
    Unconditional,
    Indirect,
    True,
    False,
    Call,
    Return,
    Exception,
}

/// Where an edge goes, as far as is statically known.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BranchTarget {
    Address(u32),
    /// Held in this register at run time.
    Register(u8),
    Unknown,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Branch {
    pub kind: BranchKind,
    pub target: BranchTarget,
}

impl Branch {
    #[must_use]
    pub const fn new(kind: BranchKind, target: BranchTarget) -> Self {
        Self { kind, target }
    }

    /// Statically known destination address.
    #[must_use]
    pub const fn address(&self) -> Option<u32> {
        match self.target {
            BranchTarget::Address(addr) => Some(addr),
            _ => None,
        }
    }
}

/// Length and outgoing edges of one instruction.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct InstrInfo {
    pub length: usize,
    pub branches: Vec<Branch>,
}

impl InstrInfo {
    /// True when execution may continue at the next sequential address.
    ///
    /// That is the case with no edges, with a conditional pair (its false edge
    /// is the next address), and when every edge is a call or a trap.
    #[must_use]
    pub fn falls_through(&self) -> bool {
        self.branches.iter().any(|b| b.kind == BranchKind::False)
            || self
                .branches
                .iter()
                .all(|b| matches!(b.kind, BranchKind::Call | BranchKind::Exception))
    }
}

/// Compute length and edges for a decoded instruction.
#[must_use]
pub fn classify(instr: &DecodedInstr) -> InstrInfo {
    let flow = instr.info.and_then(|info| info.flow);
    let reg_a = match instr.args {
        InstrArgs::R { ra } | InstrArgs::RRImm8 { ra, .. } => BranchTarget::Register(ra),
        _ => BranchTarget::Unknown,
    };
    let branches = match flow {
        None => vec![],
        Some(FlowClass::UnconditionalDirect) => {
            let target = match instr.args {
                InstrArgs::Imm24 { v0 } => BranchTarget::Address(v0),
                _ => BranchTarget::Unknown,
            };
            vec![Branch::new(BranchKind::Unconditional, target)]
        }
        Some(FlowClass::UnconditionalSelf) => vec![Branch::new(
            BranchKind::Unconditional,
            BranchTarget::Address(instr.address),
        )],
        Some(FlowClass::Indirect) => vec![Branch::new(BranchKind::Indirect, reg_a)],
        Some(FlowClass::ConditionalPair) => vec![
            Branch::new(BranchKind::True, reg_a),
            Branch::new(
                BranchKind::False,
                BranchTarget::Address(instr.next_address()),
            ),
        ],
        Some(FlowClass::Call) => vec![Branch::new(BranchKind::Call, reg_a)],
        Some(FlowClass::Return) => vec![Branch::new(
            BranchKind::Return,
            BranchTarget::Register(REG_LR),
        )],
        Some(FlowClass::Exception) => {
            vec![Branch::new(BranchKind::Exception, BranchTarget::Unknown)]
        }
    };
    InstrInfo {
        length: INSTRUCTION_SIZE,
        branches,
    }
}
