//! Expression IL.

use std::fmt;

/// Register naming function used when printing IL.
///
/// Returns `None` for indices the architecture does not define; those print
/// as `reg{n}`.
pub type RegNames = fn(u8) -> Option<&'static str>;

/// Unary operations.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Binary operations.
///
/// All operate on 32-bit values. `DivU`/`ModU` are unsigned; comparisons
/// produce 0 or 1.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    DivU,
    ModU,
    And,
    Or,
    Xor,
    Shl,
    Lsr,
    Asr,
    Eq,
    Ne,
    Slt,
    Ult,
}

impl BinaryOp {
    /// Infix symbol used by the IL printer.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::DivU => "/",
            Self::ModU => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Lsr => ">>",
            Self::Asr => "s>>",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Slt => "<s",
            Self::Ult => "<u",
        }
    }
}

/// IL temporary, local to the lifting of one instruction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Temp(pub u8);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Expression tree node.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Expr {
    Const(u32),
    /// Constant known to be a code or data address.
    ConstPtr(u32),
    Reg(u8),
    Temp(Temp),
    Load {
        addr: Box<Self>,
        width: u8,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Self>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    ZeroExtend {
        expr: Box<Self>,
        from: u8,
    },
    LowPart {
        expr: Box<Self>,
        width: u8,
    },
}

/// Mask selecting the low `width` bytes of a 32-bit value.
#[must_use]
pub const fn width_mask(width: u8) -> u32 {
    match width {
        1 => 0xff,
        2 => 0xffff,
        3 => 0x00ff_ffff,
        _ => u32::MAX,
    }
}

// These are factory methods, not trait implementations
#[allow(clippy::should_implement_trait)]
impl Expr {
    #[must_use]
    pub const fn imm(val: u32) -> Self {
        Self::Const(val)
    }

    #[must_use]
    pub const fn const_ptr(addr: u32) -> Self {
        Self::ConstPtr(addr)
    }

    #[must_use]
    pub const fn reg(idx: u8) -> Self {
        Self::Reg(idx)
    }

    #[must_use]
    pub const fn temp(temp: Temp) -> Self {
        Self::Temp(temp)
    }

    /// Load `width` bytes from `addr`, zero-extended to 32 bits.
    #[must_use]
    pub fn load(addr: Self, width: u8) -> Self {
        Self::Load {
            addr: Box::new(addr),
            width,
        }
    }

    fn unary(op: UnaryOp, expr: Self) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Check if expression is statically known to be zero.
    /// Only literal constants qualify; no register reads as zero.
    const fn is_zero(&self) -> bool {
        matches!(self, Self::Const(0))
    }

    const fn as_const(&self) -> Option<u32> {
        match self {
            Self::Const(v) => Some(*v),
            _ => None,
        }
    }

    fn fold(left: &Self, right: &Self, f: impl Fn(u32, u32) -> Option<u32>) -> Option<Self> {
        match (left.as_const(), right.as_const()) {
            (Some(l), Some(r)) => f(l, r).map(Self::Const),
            _ => None,
        }
    }

    pub fn add(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| Some(l.wrapping_add(r))) {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        if left.is_zero() {
            return right;
        }
        Self::binary(BinaryOp::Add, left, right)
    }

    pub fn sub(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| Some(l.wrapping_sub(r))) {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        Self::binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| Some(l.wrapping_mul(r))) {
            return folded;
        }
        Self::binary(BinaryOp::Mul, left, right)
    }

    pub fn divu(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, u32::checked_div) {
            return folded;
        }
        Self::binary(BinaryOp::DivU, left, right)
    }

    pub fn modu(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, u32::checked_rem) {
            return folded;
        }
        Self::binary(BinaryOp::ModU, left, right)
    }

    pub fn and(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| Some(l & r)) {
            return folded;
        }
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn or(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| Some(l | r)) {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        if left.is_zero() {
            return right;
        }
        Self::binary(BinaryOp::Or, left, right)
    }

    pub fn xor(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| Some(l ^ r)) {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        if left.is_zero() {
            return right;
        }
        Self::binary(BinaryOp::Xor, left, right)
    }

    /// Shift left. Constant shifts of 32 or more fold to zero.
    pub fn shl(left: Self, right: Self) -> Self {
        if let Some(folded) =
            Self::fold(&left, &right, |l, r| Some(l.checked_shl(r).unwrap_or(0)))
        {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        Self::binary(BinaryOp::Shl, left, right)
    }

    pub fn lsr(left: Self, right: Self) -> Self {
        if let Some(folded) =
            Self::fold(&left, &right, |l, r| Some(l.checked_shr(r).unwrap_or(0)))
        {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        Self::binary(BinaryOp::Lsr, left, right)
    }

    pub fn asr(left: Self, right: Self) -> Self {
        if let Some(folded) = Self::fold(&left, &right, |l, r| {
            Some((l.cast_signed() >> r.min(31)).cast_unsigned())
        }) {
            return folded;
        }
        if right.is_zero() {
            return left;
        }
        Self::binary(BinaryOp::Asr, left, right)
    }

    pub fn eq(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    pub fn ne(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Ne, left, right)
    }

    /// Signed less-than.
    pub fn slt(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Slt, left, right)
    }

    /// Unsigned less-than.
    pub fn ult(left: Self, right: Self) -> Self {
        Self::binary(BinaryOp::Ult, left, right)
    }

    pub fn not(val: Self) -> Self {
        if let Some(v) = val.as_const() {
            return Self::Const(!v);
        }
        Self::unary(UnaryOp::Not, val)
    }

    pub fn neg(val: Self) -> Self {
        if let Some(v) = val.as_const() {
            return Self::Const(v.wrapping_neg());
        }
        Self::unary(UnaryOp::Neg, val)
    }

    /// Zero-extend the low `from` bytes of `val` to 32 bits.
    pub fn zero_extend(val: Self, from: u8) -> Self {
        if let Some(v) = val.as_const() {
            return Self::Const(v & width_mask(from));
        }
        Self::ZeroExtend {
            expr: Box::new(val),
            from,
        }
    }

    /// Truncate `val` to its low `width` bytes.
    pub fn low_part(val: Self, width: u8) -> Self {
        if let Some(v) = val.as_const() {
            return Self::Const(v & width_mask(width));
        }
        Self::LowPart {
            expr: Box::new(val),
            width,
        }
    }

    /// Printable view of this expression.
    #[must_use]
    pub const fn display(&self, names: RegNames) -> ExprDisplay<'_> {
        ExprDisplay { expr: self, names }
    }
}

pub(crate) const fn width_suffix(width: u8) -> &'static str {
    match width {
        1 => "b",
        2 => "w",
        _ => "d",
    }
}

pub(crate) fn fmt_reg(f: &mut fmt::Formatter<'_>, names: RegNames, idx: u8) -> fmt::Result {
    match names(idx) {
        Some(name) => f.write_str(name),
        None => write!(f, "reg{idx}"),
    }
}

/// [`Expr`] paired with a register naming function.
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    names: RegNames,
}

impl ExprDisplay<'_> {
    fn nested(&self, f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
        let inner = expr.display(self.names);
        if matches!(expr, Expr::Binary { .. }) {
            write!(f, "({inner})")
        } else {
            write!(f, "{inner}")
        }
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            Expr::Const(v) | Expr::ConstPtr(v) => write!(f, "{v:#x}"),
            Expr::Reg(idx) => fmt_reg(f, self.names, *idx),
            Expr::Temp(t) => write!(f, "{t}"),
            Expr::Load { addr, width } => {
                write!(f, "[{}].{}", addr.display(self.names), width_suffix(*width))
            }
            Expr::Unary { op, expr } => {
                f.write_str(match op {
                    UnaryOp::Not => "~",
                    UnaryOp::Neg => "-",
                })?;
                self.nested(f, expr)
            }
            Expr::Binary { op, left, right } => {
                self.nested(f, left)?;
                write!(f, " {} ", op.symbol())?;
                self.nested(f, right)
            }
            Expr::ZeroExtend { expr, from } => {
                write!(f, "zx.{}({})", width_suffix(*from), expr.display(self.names))
            }
            Expr::LowPart { expr, width } => {
                self.nested(f, expr)?;
                write!(f, ".{}", width_suffix(*width))
            }
        }
    }
}
