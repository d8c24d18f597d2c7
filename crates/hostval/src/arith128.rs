//! Checked 128-bit arithmetic by way of the host's 256-bit operations.
//!
//! Operands are widened to u256/i256 (sign-extending for i128), the host does
//! the arithmetic, and the result is narrowed back. Anything that does not
//! narrow, and any error the host reports, is returned as an error value.
//! Negative i128 operands are fully supported here, unlike the limb-backed
//! surface in [`crate::val128`].

use tracing::trace;

use crate::error::ErrorVal;
use crate::host::Host;
use crate::limb::U128Limbs;
use crate::num::{self, I256Pieces, U256Pieces};
use crate::val::Val;
use crate::val128::{I128Val, U128Val};

/// Shift amounts at or above this are a domain error.
pub const MAX_SHIFT: u32 = 128;

type BinaryOp<H> = fn(&H, Val, Val) -> Result<Val, ErrorVal>;
type ScalarOp<H> = fn(&H, Val, u32) -> Result<Val, ErrorVal>;

fn widen_u128<H: Host + ?Sized>(host: &H, x: U128Limbs) -> Val {
    num::u256_to_val(
        host,
        U256Pieces {
            hi_hi: 0,
            hi_lo: 0,
            lo_hi: x.hi,
            lo_lo: x.lo,
        },
    )
}

fn narrow_u256<H: Host + ?Sized>(host: &H, op: &'static str, v: Val) -> Result<U128Limbs, ErrorVal> {
    let p = num::u256_from_val(host, v);
    if p.hi_hi != 0 || p.hi_lo != 0 {
        trace!(op, hi_hi = p.hi_hi, hi_lo = p.hi_lo, "u256 result does not narrow to u128");
        return Err(ErrorVal::arith_domain());
    }
    Ok(U128Limbs::new(p.lo_hi, p.lo_lo))
}

fn widen_i128<H: Host + ?Sized>(host: &H, x: U128Limbs) -> Val {
    let ext = if x.is_negative() { u64::MAX } else { 0 };
    num::i256_to_val(
        host,
        I256Pieces {
            hi_hi: ext as i64,
            hi_lo: ext,
            lo_hi: x.hi,
            lo_lo: x.lo,
        },
    )
}

fn narrow_i256<H: Host + ?Sized>(host: &H, op: &'static str, v: Val) -> Result<U128Limbs, ErrorVal> {
    let p = num::i256_from_val(host, v);
    let ext = if (p.lo_hi as i64) < 0 { u64::MAX } else { 0 };
    if p.hi_hi as u64 != ext || p.hi_lo != ext {
        trace!(op, hi_hi = p.hi_hi, hi_lo = p.hi_lo, "i256 result does not narrow to i128");
        return Err(ErrorVal::arith_domain());
    }
    Ok(U128Limbs::new(p.lo_hi, p.lo_lo))
}

fn host_result(op: &'static str, r: Result<Val, ErrorVal>) -> Result<Val, ErrorVal> {
    r.inspect_err(|err| trace!(op, %err, "host 256-bit operation failed"))
}

fn u_binary<H: Host + ?Sized>(
    host: &H,
    op: &'static str,
    a: U128Val,
    b: U128Val,
    f: BinaryOp<H>,
) -> Result<U128Val, ErrorVal> {
    let lhs = widen_u128(host, a.to_limbs(host));
    let rhs = widen_u128(host, b.to_limbs(host));
    let out = host_result(op, f(host, lhs, rhs))?;
    narrow_u256(host, op, out).map(|x| U128Val::from_limbs(host, x))
}

fn u_scalar<H: Host + ?Sized>(
    host: &H,
    op: &'static str,
    a: U128Val,
    rhs: u32,
    f: ScalarOp<H>,
) -> Result<U128Val, ErrorVal> {
    let lhs = widen_u128(host, a.to_limbs(host));
    let out = host_result(op, f(host, lhs, rhs))?;
    narrow_u256(host, op, out).map(|x| U128Val::from_limbs(host, x))
}

fn i_binary<H: Host + ?Sized>(
    host: &H,
    op: &'static str,
    a: I128Val,
    b: I128Val,
    f: BinaryOp<H>,
) -> Result<I128Val, ErrorVal> {
    let lhs = widen_i128(host, a.to_limbs(host));
    let rhs = widen_i128(host, b.to_limbs(host));
    let out = host_result(op, f(host, lhs, rhs))?;
    narrow_i256(host, op, out).map(|x| I128Val::from_limbs(host, x))
}

fn i_scalar<H: Host + ?Sized>(
    host: &H,
    op: &'static str,
    a: I128Val,
    rhs: u32,
    f: ScalarOp<H>,
) -> Result<I128Val, ErrorVal> {
    let lhs = widen_i128(host, a.to_limbs(host));
    let out = host_result(op, f(host, lhs, rhs))?;
    narrow_i256(host, op, out).map(|x| I128Val::from_limbs(host, x))
}

fn check_shift(op: &'static str, amount: u32) -> Result<(), ErrorVal> {
    if amount >= MAX_SHIFT {
        trace!(op, amount, "shift amount out of range");
        return Err(ErrorVal::arith_domain());
    }
    Ok(())
}

pub fn u128_add<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    u_binary(host, "u128_add", a, b, H::u256_add)
}

pub fn u128_sub<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    u_binary(host, "u128_sub", a, b, H::u256_sub)
}

pub fn u128_mul<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    u_binary(host, "u128_mul", a, b, H::u256_mul)
}

pub fn u128_div<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    u_binary(host, "u128_div", a, b, H::u256_div)
}

pub fn u128_rem<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    u_binary(host, "u128_rem", a, b, H::u256_rem_euclid)
}

pub fn u128_pow<H: Host + ?Sized>(host: &H, a: U128Val, exponent: u32) -> Result<U128Val, ErrorVal> {
    u_scalar(host, "u128_pow", a, exponent, H::u256_pow)
}

pub fn u128_shl<H: Host + ?Sized>(host: &H, a: U128Val, amount: u32) -> Result<U128Val, ErrorVal> {
    check_shift("u128_shl", amount)?;
    u_scalar(host, "u128_shl", a, amount, H::u256_shl)
}

pub fn u128_shr<H: Host + ?Sized>(host: &H, a: U128Val, amount: u32) -> Result<U128Val, ErrorVal> {
    check_shift("u128_shr", amount)?;
    u_scalar(host, "u128_shr", a, amount, H::u256_shr)
}

pub fn i128_add<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    i_binary(host, "i128_add", a, b, H::i256_add)
}

pub fn i128_sub<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    i_binary(host, "i128_sub", a, b, H::i256_sub)
}

pub fn i128_mul<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    i_binary(host, "i128_mul", a, b, H::i256_mul)
}

/// Truncating division; `i128::MIN / -1` is a domain error.
pub fn i128_div<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    i_binary(host, "i128_div", a, b, H::i256_div)
}

/// Euclidean remainder, never negative.
pub fn i128_rem<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    i_binary(host, "i128_rem", a, b, H::i256_rem_euclid)
}

pub fn i128_pow<H: Host + ?Sized>(host: &H, a: I128Val, exponent: u32) -> Result<I128Val, ErrorVal> {
    i_scalar(host, "i128_pow", a, exponent, H::i256_pow)
}

pub fn i128_shl<H: Host + ?Sized>(host: &H, a: I128Val, amount: u32) -> Result<I128Val, ErrorVal> {
    check_shift("i128_shl", amount)?;
    i_scalar(host, "i128_shl", a, amount, H::i256_shl)
}

/// Arithmetic shift; negative values stay negative.
pub fn i128_shr<H: Host + ?Sized>(host: &H, a: I128Val, amount: u32) -> Result<I128Val, ErrorVal> {
    check_shift("i128_shr", amount)?;
    i_scalar(host, "i128_shr", a, amount, H::i256_shr)
}
