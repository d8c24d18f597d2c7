//! The host boundary.
//!
//! Everything the core cannot do on its own: turning wide magnitudes into
//! host objects and back, checked 256-bit arithmetic, and object comparison.
//! Implementations own all object storage; the core only ever holds handles.
//!
//! Accessors trap ([`Trap::TypeMismatch`](crate::Trap::TypeMismatch)) when
//! handed a word of the wrong kind. The 256-bit operations accept both the
//! small and the object form of their operands.

use crate::error::ErrorVal;
use crate::val::Val;

pub trait Host {
    fn obj_from_u64(&self, v: u64) -> Val;
    fn obj_to_u64(&self, obj: Val) -> u64;
    fn obj_from_i64(&self, v: i64) -> Val;
    fn obj_to_i64(&self, obj: Val) -> i64;
    fn timepoint_obj_from_u64(&self, v: u64) -> Val;
    fn timepoint_obj_to_u64(&self, obj: Val) -> u64;
    fn duration_obj_from_u64(&self, v: u64) -> Val;
    fn duration_obj_to_u64(&self, obj: Val) -> u64;

    fn obj_from_u128_pieces(&self, hi: u64, lo: u64) -> Val;
    fn obj_to_u128_lo64(&self, obj: Val) -> u64;
    fn obj_to_u128_hi64(&self, obj: Val) -> u64;
    fn obj_from_i128_pieces(&self, hi: i64, lo: u64) -> Val;
    fn obj_to_i128_lo64(&self, obj: Val) -> u64;
    fn obj_to_i128_hi64(&self, obj: Val) -> i64;

    fn obj_from_u256_pieces(&self, hi_hi: u64, hi_lo: u64, lo_hi: u64, lo_lo: u64) -> Val;
    fn obj_to_u256_hi_hi(&self, obj: Val) -> u64;
    fn obj_to_u256_hi_lo(&self, obj: Val) -> u64;
    fn obj_to_u256_lo_hi(&self, obj: Val) -> u64;
    fn obj_to_u256_lo_lo(&self, obj: Val) -> u64;
    fn obj_from_i256_pieces(&self, hi_hi: i64, hi_lo: u64, lo_hi: u64, lo_lo: u64) -> Val;
    fn obj_to_i256_hi_hi(&self, obj: Val) -> i64;
    fn obj_to_i256_hi_lo(&self, obj: Val) -> u64;
    fn obj_to_i256_lo_hi(&self, obj: Val) -> u64;
    fn obj_to_i256_lo_lo(&self, obj: Val) -> u64;

    fn u256_add(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn u256_sub(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn u256_mul(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn u256_div(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn u256_rem_euclid(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn u256_pow(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal>;
    fn u256_shl(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal>;
    fn u256_shr(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal>;

    fn i256_add(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn i256_sub(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn i256_mul(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn i256_div(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn i256_rem_euclid(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal>;
    fn i256_pow(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal>;
    fn i256_shl(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal>;
    fn i256_shr(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal>;

    /// Total order over any two values, including objects of different kinds.
    /// The only sanctioned way to compare two handles.
    fn obj_cmp(&self, a: Val, b: Val) -> i64;
}
