//! Intermediate language for the IRRE lifter.
//!
//! This crate provides pure IL types with no IRRE-specific knowledge.
//! Instruction lifting is implemented in `irre-isa`.

mod builder;
mod eval;
mod expr;
mod function;
mod sink;
mod stmt;

pub use builder::*;
pub use eval::*;
pub use expr::*;
pub use function::*;
pub use sink::*;
pub use stmt::*;
