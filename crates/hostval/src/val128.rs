//! Packed 128-bit values and the limb-backed comparison/arithmetic surface.
//!
//! A [`U128Val`] or [`I128Val`] is inline whenever the value fits the 56-bit
//! body and a host object otherwise; there is exactly one encoding per value.
//!
//! The arithmetic here runs on the local limb engine. Overflow and division by
//! zero come back as [`ErrorVal::arith_domain`]. The signed variants only
//! accept non-negative operands and trap with [`Trap::NegativeOperand`]
//! otherwise; [`crate::arith128`] is the surface that handles negative i128
//! values.

use std::cmp::Ordering;

use crate::error::ErrorVal;
use crate::host::Host;
use crate::limb::{self, U128Limbs};
use crate::tag::{Tag, BODY_MASK, MAX_SMALL_I, MAX_SMALL_U, MIN_SMALL_I};
use crate::trap::{trap, Trap};
use crate::val::Val;

/// True when `x` has an inline u128 form.
pub fn fits_small_u128(x: U128Limbs) -> bool {
    x.hi == 0 && x.lo <= MAX_SMALL_U
}

/// True when `x`, read as two's complement, has an inline i128 form.
pub fn fits_small_i128(x: U128Limbs) -> bool {
    let lo = x.lo as i64;
    let ext = if lo < 0 { u64::MAX } else { 0 };
    x.hi == ext && (MIN_SMALL_I..=MAX_SMALL_I).contains(&lo)
}

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct U128Val(Val);

impl U128Val {
    pub fn try_from_val(v: Val) -> Option<Self> {
        (v.has_tag(Tag::U128Small) || v.has_tag(Tag::U128Object)).then_some(U128Val(v))
    }

    /// Traps with [`Trap::TypeMismatch`] unless `v` is a u128 in either form.
    pub fn from_val(v: Val) -> Self {
        U128Val::try_from_val(v).unwrap_or_else(|| trap(Trap::TypeMismatch))
    }

    pub fn from_limbs<H: Host + ?Sized>(host: &H, x: U128Limbs) -> Self {
        if fits_small_u128(x) {
            U128Val(Val::from_body(Tag::U128Small, x.lo))
        } else {
            U128Val(host.obj_from_u128_pieces(x.hi, x.lo))
        }
    }

    pub fn from_u64<H: Host + ?Sized>(host: &H, v: u64) -> Self {
        U128Val::from_limbs(host, U128Limbs::from_u64(v))
    }

    pub fn to_limbs<H: Host + ?Sized>(self, host: &H) -> U128Limbs {
        if self.0.has_tag(Tag::U128Small) {
            U128Limbs::from_u64(self.0.body())
        } else {
            U128Limbs::new(host.obj_to_u128_hi64(self.0), host.obj_to_u128_lo64(self.0))
        }
    }

    pub fn is_small(self) -> bool {
        self.0.has_tag(Tag::U128Small)
    }

    pub fn to_val(self) -> Val {
        self.0
    }
}

impl From<U128Val> for Val {
    fn from(v: U128Val) -> Val {
        v.0
    }
}

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct I128Val(Val);

impl I128Val {
    pub fn try_from_val(v: Val) -> Option<Self> {
        (v.has_tag(Tag::I128Small) || v.has_tag(Tag::I128Object)).then_some(I128Val(v))
    }

    /// Traps with [`Trap::TypeMismatch`] unless `v` is an i128 in either form.
    pub fn from_val(v: Val) -> Self {
        I128Val::try_from_val(v).unwrap_or_else(|| trap(Trap::TypeMismatch))
    }

    /// `x` is read as two's complement.
    pub fn from_limbs<H: Host + ?Sized>(host: &H, x: U128Limbs) -> Self {
        if fits_small_i128(x) {
            I128Val(Val::from_body(Tag::I128Small, x.lo & BODY_MASK))
        } else {
            I128Val(host.obj_from_i128_pieces(x.hi as i64, x.lo))
        }
    }

    pub fn from_i64<H: Host + ?Sized>(host: &H, v: i64) -> Self {
        I128Val::from_limbs(host, U128Limbs::from_i64(v))
    }

    pub fn to_limbs<H: Host + ?Sized>(self, host: &H) -> U128Limbs {
        if self.0.has_tag(Tag::I128Small) {
            U128Limbs::from_i64(self.0.signed_body())
        } else {
            U128Limbs::new(
                host.obj_to_i128_hi64(self.0) as u64,
                host.obj_to_i128_lo64(self.0),
            )
        }
    }

    pub fn is_small(self) -> bool {
        self.0.has_tag(Tag::I128Small)
    }

    pub fn to_val(self) -> Val {
        self.0
    }
}

impl From<I128Val> for Val {
    fn from(v: I128Val) -> Val {
        v.0
    }
}

fn domain<T>(overflow: bool, value: T) -> Result<T, ErrorVal> {
    if overflow {
        Err(ErrorVal::arith_domain())
    } else {
        Ok(value)
    }
}

// --- u128 ---

pub fn u128_ord<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Ordering {
    a.to_limbs(host).cmp(&b.to_limbs(host))
}

pub fn u128_lt<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> bool {
    u128_ord(host, a, b) == Ordering::Less
}

pub fn u128_le<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> bool {
    u128_ord(host, a, b) != Ordering::Greater
}

pub fn u128_gt<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> bool {
    u128_ord(host, a, b) == Ordering::Greater
}

pub fn u128_ge<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> bool {
    u128_ord(host, a, b) != Ordering::Less
}

pub fn u128_eq<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> bool {
    u128_ord(host, a, b) == Ordering::Equal
}

pub fn u128_add<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    let (sum, overflow) = limb::overflowing_add(a.to_limbs(host), b.to_limbs(host));
    domain(overflow, sum).map(|x| U128Val::from_limbs(host, x))
}

pub fn u128_sub<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    let (diff, overflow) = limb::overflowing_sub(a.to_limbs(host), b.to_limbs(host));
    domain(overflow, diff).map(|x| U128Val::from_limbs(host, x))
}

pub fn u128_mul<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    let (product, overflow) = limb::overflowing_mul(a.to_limbs(host), b.to_limbs(host));
    domain(overflow, product).map(|x| U128Val::from_limbs(host, x))
}

pub fn u128_div<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    let divisor = b.to_limbs(host);
    if divisor.is_zero() {
        return Err(ErrorVal::arith_domain());
    }
    Ok(U128Val::from_limbs(host, limb::div(a.to_limbs(host), divisor)))
}

pub fn u128_rem<H: Host + ?Sized>(host: &H, a: U128Val, b: U128Val) -> Result<U128Val, ErrorVal> {
    let divisor = b.to_limbs(host);
    if divisor.is_zero() {
        return Err(ErrorVal::arith_domain());
    }
    Ok(U128Val::from_limbs(host, limb::rem(a.to_limbs(host), divisor)))
}

/// `floor(number * numerator / denominator)`; the product may exceed 128 bits
/// as long as the quotient does not.
pub fn u128_muldiv<H: Host + ?Sized>(
    host: &H,
    number: U128Val,
    numerator: U128Val,
    denominator: U128Val,
) -> Result<U128Val, ErrorVal> {
    let den = denominator.to_limbs(host);
    if den.is_zero() {
        return Err(ErrorVal::arith_domain());
    }
    let (q, overflow) = limb::muldiv(number.to_limbs(host), numerator.to_limbs(host), den);
    domain(overflow, q).map(|x| U128Val::from_limbs(host, x))
}

pub fn u128_sqrt<H: Host + ?Sized>(host: &H, v: U128Val) -> U128Val {
    U128Val::from_limbs(host, limb::sqrt(v.to_limbs(host)))
}

/// Negative exponents yield zero.
pub fn u128_pow<H: Host + ?Sized>(
    host: &H,
    base: U128Val,
    exponent: i64,
) -> Result<U128Val, ErrorVal> {
    let (p, overflow) = limb::overflowing_pow(base.to_limbs(host), exponent);
    domain(overflow, p).map(|x| U128Val::from_limbs(host, x))
}

// --- i128, non-negative operands only ---

fn non_negative<H: Host + ?Sized>(host: &H, v: I128Val) -> U128Limbs {
    let x = v.to_limbs(host);
    if x.is_negative() {
        trap(Trap::NegativeOperand);
    }
    x
}

/// A result of non-negative inputs that lands in the sign bit overflowed.
fn signed_domain(overflow: bool, x: U128Limbs) -> Result<U128Limbs, ErrorVal> {
    domain(overflow || x.is_negative(), x)
}

pub fn i128_ord<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Ordering {
    non_negative(host, a).cmp(&non_negative(host, b))
}

pub fn i128_lt<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> bool {
    i128_ord(host, a, b) == Ordering::Less
}

pub fn i128_le<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> bool {
    i128_ord(host, a, b) != Ordering::Greater
}

pub fn i128_gt<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> bool {
    i128_ord(host, a, b) == Ordering::Greater
}

pub fn i128_ge<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> bool {
    i128_ord(host, a, b) != Ordering::Less
}

pub fn i128_eq<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> bool {
    i128_ord(host, a, b) == Ordering::Equal
}

pub fn i128_add<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    let (sum, overflow) = limb::overflowing_add(non_negative(host, a), non_negative(host, b));
    signed_domain(overflow, sum).map(|x| I128Val::from_limbs(host, x))
}

/// The difference of two non-negative values always fits; it may be negative.
pub fn i128_sub<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    let diff = limb::sub(non_negative(host, a), non_negative(host, b));
    Ok(I128Val::from_limbs(host, diff))
}

pub fn i128_mul<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    let (product, overflow) = limb::overflowing_mul(non_negative(host, a), non_negative(host, b));
    signed_domain(overflow, product).map(|x| I128Val::from_limbs(host, x))
}

pub fn i128_div<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    let (dividend, divisor) = (non_negative(host, a), non_negative(host, b));
    if divisor.is_zero() {
        return Err(ErrorVal::arith_domain());
    }
    Ok(I128Val::from_limbs(host, limb::div(dividend, divisor)))
}

pub fn i128_rem<H: Host + ?Sized>(host: &H, a: I128Val, b: I128Val) -> Result<I128Val, ErrorVal> {
    let (dividend, divisor) = (non_negative(host, a), non_negative(host, b));
    if divisor.is_zero() {
        return Err(ErrorVal::arith_domain());
    }
    Ok(I128Val::from_limbs(host, limb::rem(dividend, divisor)))
}

pub fn i128_muldiv<H: Host + ?Sized>(
    host: &H,
    number: I128Val,
    numerator: I128Val,
    denominator: I128Val,
) -> Result<I128Val, ErrorVal> {
    let n = non_negative(host, number);
    let num = non_negative(host, numerator);
    let den = non_negative(host, denominator);
    if den.is_zero() {
        return Err(ErrorVal::arith_domain());
    }
    let (q, overflow) = limb::muldiv(n, num, den);
    signed_domain(overflow, q).map(|x| I128Val::from_limbs(host, x))
}

pub fn i128_sqrt<H: Host + ?Sized>(host: &H, v: I128Val) -> I128Val {
    I128Val::from_limbs(host, limb::sqrt(non_negative(host, v)))
}

/// Negative exponents yield zero.
pub fn i128_pow<H: Host + ?Sized>(
    host: &H,
    base: I128Val,
    exponent: i64,
) -> Result<I128Val, ErrorVal> {
    let (p, overflow) = limb::overflowing_pow(non_negative(host, base), exponent);
    signed_domain(overflow, p).map(|x| I128Val::from_limbs(host, x))
}
