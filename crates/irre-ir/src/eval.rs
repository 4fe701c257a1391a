//! Constant evaluation of lifted IL.
//!
//! Interprets the statements emitted for a single instruction against a
//! partially known register and memory state. Reads of state that was never
//! set are errors rather than zero, so a test only passes when the lifted IL
//! depends on exactly the inputs it was given.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::expr::{BinaryOp, Expr, UnaryOp, width_mask};
use crate::stmt::{Label, Stmt};

/// Upper bound on executed statements per run.
pub const STEP_LIMIT: usize = 1024;

/// Evaluation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("register {0:#x} has no known value")]
    UnknownRegister(u8),

    #[error("temporary t{0} has no known value")]
    UnknownTemp(u8),

    #[error("memory at {address:#x} has no known value")]
    UnknownMemory { address: u32 },

    #[error("label {0} is not placed")]
    UnknownLabel(Label),

    #[error("division by zero")]
    DivisionByZero,

    #[error("step limit of {STEP_LIMIT} exceeded")]
    StepLimit,
}

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;

/// How control left the evaluated statements.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    /// Ran off the end; continues at the next instruction.
    FallThrough,
    Jump(u32),
    /// Call to the target; the return continues at the next instruction.
    Call(u32),
    Return(u32),
    NoReturn,
    Syscall(u32),
    Unimplemented,
}

/// Partial machine state plus an IL interpreter.
#[derive(Clone, Debug, Default)]
pub struct ConstEval {
    regs: FxHashMap<u8, u32>,
    temps: FxHashMap<u8, u32>,
    memory: FxHashMap<u32, u8>,
}

impl ConstEval {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reg(mut self, reg: u8, value: u32) -> Self {
        self.regs.insert(reg, value);
        self
    }

    #[must_use]
    pub fn with_memory(mut self, address: u32, bytes: &[u8]) -> Self {
        self.write_memory(address, bytes);
        self
    }

    #[must_use]
    pub fn reg(&self, reg: u8) -> Option<u32> {
        self.regs.get(&reg).copied()
    }

    pub fn write_memory(&mut self, address: u32, bytes: &[u8]) {
        let mut addr = address;
        for &b in bytes {
            self.memory.insert(addr, b);
            addr = addr.wrapping_add(1);
        }
    }

    /// Little-endian read of `width` known bytes.
    pub fn read_memory(&self, address: u32, width: u8) -> Result<u32> {
        let mut value = 0u32;
        for i in 0..u32::from(width.min(4)) {
            let addr = address.wrapping_add(i);
            let byte = self
                .memory
                .get(&addr)
                .ok_or(EvalError::UnknownMemory { address: addr })?;
            value |= u32::from(*byte) << (8 * i);
        }
        Ok(value)
    }

    /// Evaluate an expression against the current state.
    pub fn eval(&self, expr: &Expr) -> Result<u32> {
        Ok(match expr {
            Expr::Const(v) | Expr::ConstPtr(v) => *v,
            Expr::Reg(r) => self.reg(*r).ok_or(EvalError::UnknownRegister(*r))?,
            Expr::Temp(t) => *self.temps.get(&t.0).ok_or(EvalError::UnknownTemp(t.0))?,
            Expr::Load { addr, width } => self.read_memory(self.eval(addr)?, *width)?,
            Expr::Unary { op, expr } => {
                let v = self.eval(expr)?;
                match op {
                    UnaryOp::Not => !v,
                    UnaryOp::Neg => v.wrapping_neg(),
                }
            }
            Expr::Binary { op, left, right } => {
                binary(*op, self.eval(left)?, self.eval(right)?)?
            }
            Expr::ZeroExtend { expr, from } => self.eval(expr)? & width_mask(*from),
            Expr::LowPart { expr, width } => self.eval(expr)? & width_mask(*width),
        })
    }

    /// Execute `stmts` until control leaves them.
    ///
    /// Temporaries are cleared first. A goto to an address label that is not
    /// placed in `stmts` leaves as [`Flow::Jump`].
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<Flow> {
        self.temps.clear();
        let labels: FxHashMap<Label, usize> = stmts
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Stmt::Label(label) => Some((*label, i)),
                _ => None,
            })
            .collect();

        let mut pc = 0;
        let mut steps = 0;
        while let Some(stmt) = stmts.get(pc) {
            steps += 1;
            if steps > STEP_LIMIT {
                return Err(EvalError::StepLimit);
            }
            pc += 1;
            let target = match stmt {
                Stmt::Nop | Stmt::Label(_) => continue,
                Stmt::SetReg { reg, value } => {
                    let v = self.eval(value)?;
                    self.regs.insert(*reg, v);
                    continue;
                }
                Stmt::SetTemp { temp, value } => {
                    let v = self.eval(value)?;
                    self.temps.insert(temp.0, v);
                    continue;
                }
                Stmt::Store { addr, value, width } => {
                    let addr = self.eval(addr)?;
                    let bytes = self.eval(value)?.to_le_bytes();
                    let len = usize::from(*width).min(bytes.len());
                    self.write_memory(addr, &bytes[..len]);
                    continue;
                }
                Stmt::If {
                    cond,
                    then_label,
                    else_label,
                } => {
                    if self.eval(cond)? != 0 {
                        *then_label
                    } else {
                        *else_label
                    }
                }
                Stmt::Goto(label) => *label,
                Stmt::Jump(t) => return Ok(Flow::Jump(self.eval(t)?)),
                Stmt::Call(t) => return Ok(Flow::Call(self.eval(t)?)),
                Stmt::Ret(t) => return Ok(Flow::Return(self.eval(t)?)),
                Stmt::NoRet => return Ok(Flow::NoReturn),
                Stmt::Syscall(code) => return Ok(Flow::Syscall(*code)),
                Stmt::Unimplemented => return Ok(Flow::Unimplemented),
            };
            match (labels.get(&target), target) {
                (Some(&idx), _) => pc = idx,
                (None, Label::Address(addr)) => return Ok(Flow::Jump(addr)),
                (None, label) => return Err(EvalError::UnknownLabel(label)),
            }
        }
        Ok(Flow::FallThrough)
    }
}

fn binary(op: BinaryOp, l: u32, r: u32) -> Result<u32> {
    Ok(match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::DivU => l.checked_div(r).ok_or(EvalError::DivisionByZero)?,
        BinaryOp::ModU => l.checked_rem(r).ok_or(EvalError::DivisionByZero)?,
        BinaryOp::And => l & r,
        BinaryOp::Or => l | r,
        BinaryOp::Xor => l ^ r,
        BinaryOp::Shl => l.checked_shl(r).unwrap_or(0),
        BinaryOp::Lsr => l.checked_shr(r).unwrap_or(0),
        BinaryOp::Asr => (l.cast_signed() >> r.min(31)).cast_unsigned(),
        BinaryOp::Eq => u32::from(l == r),
        BinaryOp::Ne => u32::from(l != r),
        BinaryOp::Slt => u32::from(l.cast_signed() < r.cast_signed()),
        BinaryOp::Ult => u32::from(l < r),
    })
}
