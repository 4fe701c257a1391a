//! Lifting decoded instructions to IL.

use irre_ir::{Expr, IRBuilder, IlSink};
use tracing::warn;

use crate::catalog::Opcode;
use crate::decode::{DecodedInstr, InstrArgs};
use crate::{INSTRUCTION_SIZE, LiftError, REG_LR, is_valid_reg};

type BinFn = fn(Expr, Expr) -> Expr;

/// Lift one instruction into `sink`.
///
/// Returns the instruction length. An out-of-range register index emits a
/// single unimplemented marker and fails for this instruction only.
pub fn lift<S: IlSink + ?Sized>(instr: &DecodedInstr, sink: &mut S) -> Result<usize, LiftError> {
    let mut b = IRBuilder::new(sink, instr.address);
    let Some(op) = instr.opcode() else {
        b.unimplemented();
        return Ok(INSTRUCTION_SIZE);
    };

    if let Some(register) = instr.args.registers().find(|&r| !is_valid_reg(r)) {
        b.unimplemented();
        warn!(
            register,
            "invalid register index in {} at {:#x}",
            op.mnemonic(),
            instr.address
        );
        return Err(LiftError::InvalidRegister {
            address: instr.address,
            register,
        });
    }

    match (op, instr.args) {
        (Opcode::Nop, _) => {
            b.nop();
        }
        (Opcode::Add, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::add),
        (Opcode::Sub, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::sub),
        (Opcode::And, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::and),
        (Opcode::Orr, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::or),
        (Opcode::Xor, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::xor),
        (Opcode::Mul, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::mul),
        (Opcode::Div, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::divu),
        (Opcode::Mod, InstrArgs::RRR { ra, rb, rc }) => lift_r(&mut b, ra, rb, rc, Expr::modu),
        (Opcode::Lsh, InstrArgs::RRR { ra, rb, rc }) => lift_shift(&mut b, ra, rb, rc, Expr::lsr),
        (Opcode::Ash, InstrArgs::RRR { ra, rb, rc }) => lift_shift(&mut b, ra, rb, rc, Expr::asr),
        (Opcode::Tcu, InstrArgs::RRR { ra, rb, rc }) => {
            lift_compare(&mut b, ra, rb, rc, Expr::ult);
        }
        (Opcode::Tcs, InstrArgs::RRR { ra, rb, rc }) => {
            lift_compare(&mut b, ra, rb, rc, Expr::slt);
        }
        (Opcode::Not, InstrArgs::RR { ra, rb }) => {
            b.write_reg(ra, Expr::not(Expr::reg(rb)));
        }
        (Opcode::Mov | Opcode::Sxt, InstrArgs::RR { ra, rb }) => {
            b.write_reg(ra, Expr::reg(rb));
        }
        (Opcode::Set, InstrArgs::RImm16 { ra, v0 }) => {
            b.write_reg(ra, Expr::zero_extend(Expr::imm(v0.into()), 2));
        }
        (Opcode::Sup, InstrArgs::RImm16 { ra, v0 }) => {
            let lower = Expr::and(Expr::reg(ra), Expr::imm(0xffff));
            let upper = Expr::shl(Expr::imm(v0.into()), Expr::imm(16));
            b.write_reg(ra, Expr::or(lower, upper));
        }
        (Opcode::Sia, InstrArgs::RImm8Imm8 { ra, v0, v1 }) => {
            let shifted = Expr::shl(Expr::imm(v0.into()), Expr::imm(v1.into()));
            b.write_reg(ra, Expr::add(Expr::reg(ra), shifted));
        }
        (Opcode::Ldw, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            b.write_reg(ra, Expr::load(mem_addr(rb, v0), 4));
        }
        (Opcode::Stw, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            b.write_mem(mem_addr(rb, v0), Expr::reg(ra), 4);
        }
        (Opcode::Ldb, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            let byte = Expr::load(mem_addr(rb, v0), 1);
            b.write_reg(ra, Expr::zero_extend(byte, 1));
        }
        (Opcode::Stb, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            b.write_mem(mem_addr(rb, v0), Expr::low_part(Expr::reg(ra), 1), 1);
        }
        (Opcode::Jmi, InstrArgs::Imm24 { v0 }) => match b.label_for_address(v0) {
            Some(label) => {
                b.goto(label);
            }
            None => {
                b.jump(Expr::const_ptr(v0));
            }
        },
        (Opcode::Jmp, InstrArgs::R { ra }) => {
            b.jump(Expr::reg(ra));
        }
        (Opcode::Bve, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            lift_branch_value(&mut b, ra, rb, v0, Expr::eq);
        }
        (Opcode::Bvn, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            lift_branch_value(&mut b, ra, rb, v0, Expr::ne);
        }
        (Opcode::Cal, InstrArgs::R { ra }) => lift_call(&mut b, ra, instr.next_address()),
        (Opcode::Ret, _) => lift_ret(&mut b),
        (Opcode::Seq, InstrArgs::RRImm8 { ra, rb, v0 }) => {
            let (t, f, done) = (b.label(), b.label(), b.label());
            b.if_goto(Expr::eq(Expr::reg(rb), imm8(v0)), t, f)
                .mark(t)
                .write_reg(ra, Expr::imm(1))
                .goto(done)
                .mark(f)
                .write_reg(ra, Expr::imm(0))
                .goto(done)
                .mark(done);
        }
        (Opcode::Int, InstrArgs::Imm24 { v0 }) => {
            b.syscall(v0);
        }
        (Opcode::Hlt, _) => {
            b.no_ret();
        }
        // snd, and any defined opcode without semantics here
        _ => {
            b.unimplemented();
        }
    }
    Ok(INSTRUCTION_SIZE)
}

/// Memory operand address: `rB` alone when the offset is zero.
fn mem_addr(rb: u8, offset: i32) -> Expr {
    let base = Expr::reg(rb);
    if offset < 0 {
        Expr::sub(base, Expr::imm(offset.unsigned_abs()))
    } else {
        Expr::add(base, Expr::imm(offset.unsigned_abs()))
    }
}

const fn imm8(v0: i32) -> Expr {
    Expr::imm(v0.cast_unsigned())
}

fn lift_r<S: IlSink + ?Sized>(b: &mut IRBuilder<'_, S>, ra: u8, rb: u8, rc: u8, op: BinFn) {
    b.write_reg(ra, op(Expr::reg(rb), Expr::reg(rc)));
}

/// Shift by a signed count in `rC`: left when non-negative, else right by `-rC`.
fn lift_shift<S: IlSink + ?Sized>(
    b: &mut IRBuilder<'_, S>,
    ra: u8,
    rb: u8,
    rc: u8,
    shift_right: BinFn,
) {
    let (left, right, done) = (b.label(), b.label(), b.label());
    let amount = b.temp();
    b.if_goto(Expr::slt(Expr::reg(rc), Expr::imm(0)), right, left)
        .mark(left)
        .write_reg(ra, Expr::shl(Expr::reg(rb), Expr::reg(rc)))
        .goto(done)
        .mark(right)
        .write_temp(amount, Expr::neg(Expr::reg(rc)))
        .write_reg(ra, shift_right(Expr::reg(rb), Expr::temp(amount)))
        .goto(done)
        .mark(done);
}

/// Three-way compare into `rA`: -1, 0 or 1.
fn lift_compare<S: IlSink + ?Sized>(
    b: &mut IRBuilder<'_, S>,
    ra: u8,
    rb: u8,
    rc: u8,
    less_than: BinFn,
) {
    let (lt, ge, eq, gt, done) = (b.label(), b.label(), b.label(), b.label(), b.label());
    b.if_goto(less_than(Expr::reg(rb), Expr::reg(rc)), lt, ge)
        .mark(lt)
        .write_reg(ra, Expr::imm(u32::MAX))
        .goto(done)
        .mark(ge)
        .if_goto(Expr::eq(Expr::reg(rb), Expr::reg(rc)), eq, gt)
        .mark(eq)
        .write_reg(ra, Expr::imm(0))
        .goto(done)
        .mark(gt)
        .write_reg(ra, Expr::imm(1))
        .goto(done)
        .mark(done);
}

fn lift_branch_value<S: IlSink + ?Sized>(
    b: &mut IRBuilder<'_, S>,
    ra: u8,
    rb: u8,
    v0: i32,
    cond: BinFn,
) {
    let (taken, not_taken) = (b.label(), b.label());
    b.if_goto(cond(Expr::reg(rb), imm8(v0)), taken, not_taken)
        .mark(taken)
        .jump(Expr::reg(ra))
        .mark(not_taken);
}

fn lift_call<S: IlSink + ?Sized>(b: &mut IRBuilder<'_, S>, ra: u8, return_address: u32) {
    // the target is read before lr is overwritten
    let target = if ra == REG_LR {
        let t = b.temp();
        b.write_temp(t, Expr::reg(ra));
        Expr::temp(t)
    } else {
        Expr::reg(ra)
    };
    b.write_reg(REG_LR, Expr::const_ptr(return_address))
        .call(target);
}

/// `ret` halts when `lr` is zero, else clears `lr` and returns to its old value.
fn lift_ret<S: IlSink + ?Sized>(b: &mut IRBuilder<'_, S>) {
    let (halt, ret) = (b.label(), b.label());
    let saved = b.temp();
    b.if_goto(Expr::eq(Expr::reg(REG_LR), Expr::imm(0)), halt, ret)
        .mark(halt)
        .no_ret()
        .mark(ret)
        .write_temp(saved, Expr::reg(REG_LR))
        .write_reg(REG_LR, Expr::imm(0))
        .ret(Expr::temp(saved));
}
