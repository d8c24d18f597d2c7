#![allow(non_camel_case_types)]
#![allow(clippy::missing_safety_doc)]

use std::panic::{catch_unwind, AssertUnwindSafe};

use hostval::trap::trap_code_of;
use hostval::{arith128, limb, val128};
use hostval::{ErrorVal, Host, I128Val, SymbolSmall, U128Limbs, U128Val, Val};

pub type hv_word = u64;

extern "C" {
    // Provided by the embedding host (module `hv`).
    fn hv_obj_from_u64(v: u64) -> hv_word;
    fn hv_obj_to_u64(obj: hv_word) -> u64;
    fn hv_obj_from_i64(v: i64) -> hv_word;
    fn hv_obj_to_i64(obj: hv_word) -> i64;
    fn hv_timepoint_obj_from_u64(v: u64) -> hv_word;
    fn hv_timepoint_obj_to_u64(obj: hv_word) -> u64;
    fn hv_duration_obj_from_u64(v: u64) -> hv_word;
    fn hv_duration_obj_to_u64(obj: hv_word) -> u64;

    fn hv_obj_from_u128_pieces(hi: u64, lo: u64) -> hv_word;
    fn hv_obj_to_u128_lo64(obj: hv_word) -> u64;
    fn hv_obj_to_u128_hi64(obj: hv_word) -> u64;
    fn hv_obj_from_i128_pieces(hi: i64, lo: u64) -> hv_word;
    fn hv_obj_to_i128_lo64(obj: hv_word) -> u64;
    fn hv_obj_to_i128_hi64(obj: hv_word) -> i64;

    fn hv_obj_from_u256_pieces(hi_hi: u64, hi_lo: u64, lo_hi: u64, lo_lo: u64) -> hv_word;
    fn hv_obj_to_u256_hi_hi(obj: hv_word) -> u64;
    fn hv_obj_to_u256_hi_lo(obj: hv_word) -> u64;
    fn hv_obj_to_u256_lo_hi(obj: hv_word) -> u64;
    fn hv_obj_to_u256_lo_lo(obj: hv_word) -> u64;
    fn hv_obj_from_i256_pieces(hi_hi: i64, hi_lo: u64, lo_hi: u64, lo_lo: u64) -> hv_word;
    fn hv_obj_to_i256_hi_hi(obj: hv_word) -> i64;
    fn hv_obj_to_i256_hi_lo(obj: hv_word) -> u64;
    fn hv_obj_to_i256_lo_hi(obj: hv_word) -> u64;
    fn hv_obj_to_i256_lo_lo(obj: hv_word) -> u64;

    // 256-bit ops answer with either the result or an Error word.
    fn hv_u256_add(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_u256_sub(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_u256_mul(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_u256_div(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_u256_rem_euclid(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_u256_pow(lhs: hv_word, rhs: u32) -> hv_word;
    fn hv_u256_shl(lhs: hv_word, rhs: u32) -> hv_word;
    fn hv_u256_shr(lhs: hv_word, rhs: u32) -> hv_word;
    fn hv_i256_add(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_i256_sub(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_i256_mul(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_i256_div(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_i256_rem_euclid(lhs: hv_word, rhs: hv_word) -> hv_word;
    fn hv_i256_pow(lhs: hv_word, rhs: u32) -> hv_word;
    fn hv_i256_shl(lhs: hv_word, rhs: u32) -> hv_word;
    fn hv_i256_shr(lhs: hv_word, rhs: u32) -> hv_word;

    fn hv_obj_cmp(a: hv_word, b: hv_word) -> i64;

    // Must not return.
    fn hv_trap(code: i32) -> !;
}

/// Runs `f`, turning any trap raised inside it into `hv_trap`.
fn guard<R>(f: impl FnOnce() -> R) -> R {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(r) => r,
        Err(payload) => unsafe { hv_trap(trap_code_of(payload.as_ref())) },
    }
}

fn host_word(raw: hv_word) -> Result<Val, ErrorVal> {
    let v = Val::from_raw(raw);
    match ErrorVal::try_from_val(v) {
        Some(err) => Err(err),
        None => Ok(v),
    }
}

fn result_word<T: Into<Val>>(r: Result<T, ErrorVal>) -> hv_word {
    match r {
        Ok(v) => v.into().to_raw(),
        Err(err) => err.to_val().to_raw(),
    }
}

/// [`Host`] over the `hv_*` imports.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExternHost;

macro_rules! import_word_to_val {
    ($($method:ident => $import:ident($($arg:ident: $ty:ty),*);)*) => {
        $(fn $method(&self, $($arg: $ty),*) -> Val {
            Val::from_raw(unsafe { $import($($arg),*) })
        })*
    };
}

macro_rules! import_val_to_piece {
    ($($method:ident => $import:ident -> $out:ty;)*) => {
        $(fn $method(&self, obj: Val) -> $out {
            unsafe { $import(obj.to_raw()) }
        })*
    };
}

macro_rules! import_checked {
    ($($method:ident => $import:ident;)*) => {
        $(fn $method(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
            host_word(unsafe { $import(lhs.to_raw(), rhs.to_raw()) })
        })*
    };
}

macro_rules! import_checked_scalar {
    ($($method:ident => $import:ident;)*) => {
        $(fn $method(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
            host_word(unsafe { $import(lhs.to_raw(), rhs) })
        })*
    };
}

impl Host for ExternHost {
    import_word_to_val! {
        obj_from_u64 => hv_obj_from_u64(v: u64);
        obj_from_i64 => hv_obj_from_i64(v: i64);
        timepoint_obj_from_u64 => hv_timepoint_obj_from_u64(v: u64);
        duration_obj_from_u64 => hv_duration_obj_from_u64(v: u64);
        obj_from_u128_pieces => hv_obj_from_u128_pieces(hi: u64, lo: u64);
        obj_from_i128_pieces => hv_obj_from_i128_pieces(hi: i64, lo: u64);
        obj_from_u256_pieces => hv_obj_from_u256_pieces(hi_hi: u64, hi_lo: u64, lo_hi: u64, lo_lo: u64);
        obj_from_i256_pieces => hv_obj_from_i256_pieces(hi_hi: i64, hi_lo: u64, lo_hi: u64, lo_lo: u64);
    }

    import_val_to_piece! {
        obj_to_u64 => hv_obj_to_u64 -> u64;
        obj_to_i64 => hv_obj_to_i64 -> i64;
        timepoint_obj_to_u64 => hv_timepoint_obj_to_u64 -> u64;
        duration_obj_to_u64 => hv_duration_obj_to_u64 -> u64;
        obj_to_u128_lo64 => hv_obj_to_u128_lo64 -> u64;
        obj_to_u128_hi64 => hv_obj_to_u128_hi64 -> u64;
        obj_to_i128_lo64 => hv_obj_to_i128_lo64 -> u64;
        obj_to_i128_hi64 => hv_obj_to_i128_hi64 -> i64;
        obj_to_u256_hi_hi => hv_obj_to_u256_hi_hi -> u64;
        obj_to_u256_hi_lo => hv_obj_to_u256_hi_lo -> u64;
        obj_to_u256_lo_hi => hv_obj_to_u256_lo_hi -> u64;
        obj_to_u256_lo_lo => hv_obj_to_u256_lo_lo -> u64;
        obj_to_i256_hi_hi => hv_obj_to_i256_hi_hi -> i64;
        obj_to_i256_hi_lo => hv_obj_to_i256_hi_lo -> u64;
        obj_to_i256_lo_hi => hv_obj_to_i256_lo_hi -> u64;
        obj_to_i256_lo_lo => hv_obj_to_i256_lo_lo -> u64;
    }

    import_checked! {
        u256_add => hv_u256_add;
        u256_sub => hv_u256_sub;
        u256_mul => hv_u256_mul;
        u256_div => hv_u256_div;
        u256_rem_euclid => hv_u256_rem_euclid;
        i256_add => hv_i256_add;
        i256_sub => hv_i256_sub;
        i256_mul => hv_i256_mul;
        i256_div => hv_i256_div;
        i256_rem_euclid => hv_i256_rem_euclid;
    }

    import_checked_scalar! {
        u256_pow => hv_u256_pow;
        u256_shl => hv_u256_shl;
        u256_shr => hv_u256_shr;
        i256_pow => hv_i256_pow;
        i256_shl => hv_i256_shl;
        i256_shr => hv_i256_shr;
    }

    fn obj_cmp(&self, a: Val, b: Val) -> i64 {
        unsafe { hv_obj_cmp(a.to_raw(), b.to_raw()) }
    }
}

fn u128_arg(w: hv_word) -> U128Val {
    U128Val::from_val(Val::from_raw(w))
}

fn i128_arg(w: hv_word) -> I128Val {
    I128Val::from_val(Val::from_raw(w))
}

// --- checked 128-bit surface (host 256-bit delegate) ---

macro_rules! export_checked_binary {
    ($($name:ident => $f:path, $arg:ident;)*) => {
        $(#[no_mangle]
        pub extern "C" fn $name(a: hv_word, b: hv_word) -> hv_word {
            guard(|| result_word($f(&ExternHost, $arg(a), $arg(b))))
        })*
    };
}

macro_rules! export_checked_scalar {
    ($($name:ident => $f:path, $arg:ident;)*) => {
        $(#[no_mangle]
        pub extern "C" fn $name(a: hv_word, n: u32) -> hv_word {
            guard(|| result_word($f(&ExternHost, $arg(a), n)))
        })*
    };
}

export_checked_binary! {
    hv_u128_add_v1 => arith128::u128_add, u128_arg;
    hv_u128_sub_v1 => arith128::u128_sub, u128_arg;
    hv_u128_mul_v1 => arith128::u128_mul, u128_arg;
    hv_u128_div_v1 => arith128::u128_div, u128_arg;
    hv_u128_rem_v1 => arith128::u128_rem, u128_arg;
    hv_i128_add_v1 => arith128::i128_add, i128_arg;
    hv_i128_sub_v1 => arith128::i128_sub, i128_arg;
    hv_i128_mul_v1 => arith128::i128_mul, i128_arg;
    hv_i128_div_v1 => arith128::i128_div, i128_arg;
    hv_i128_rem_v1 => arith128::i128_rem, i128_arg;
}

export_checked_scalar! {
    hv_u128_pow_v1 => arith128::u128_pow, u128_arg;
    hv_u128_shl_v1 => arith128::u128_shl, u128_arg;
    hv_u128_shr_v1 => arith128::u128_shr, u128_arg;
    hv_i128_pow_v1 => arith128::i128_pow, i128_arg;
    hv_i128_shl_v1 => arith128::i128_shl, i128_arg;
    hv_i128_shr_v1 => arith128::i128_shr, i128_arg;
}

// --- limb-backed surface ---

macro_rules! export_val128_cmp {
    ($($name:ident => $f:path, $arg:ident;)*) => {
        $(#[no_mangle]
        pub extern "C" fn $name(a: hv_word, b: hv_word) -> hv_word {
            guard(|| Val::from_bool($f(&ExternHost, $arg(a), $arg(b))).to_raw())
        })*
    };
}

export_val128_cmp! {
    hv_val128_u128_lt_v1 => val128::u128_lt, u128_arg;
    hv_val128_u128_le_v1 => val128::u128_le, u128_arg;
    hv_val128_u128_gt_v1 => val128::u128_gt, u128_arg;
    hv_val128_u128_ge_v1 => val128::u128_ge, u128_arg;
    hv_val128_u128_eq_v1 => val128::u128_eq, u128_arg;
    hv_val128_i128_lt_v1 => val128::i128_lt, i128_arg;
    hv_val128_i128_le_v1 => val128::i128_le, i128_arg;
    hv_val128_i128_gt_v1 => val128::i128_gt, i128_arg;
    hv_val128_i128_ge_v1 => val128::i128_ge, i128_arg;
    hv_val128_i128_eq_v1 => val128::i128_eq, i128_arg;
}

export_checked_binary! {
    hv_val128_u128_add_v1 => val128::u128_add, u128_arg;
    hv_val128_u128_sub_v1 => val128::u128_sub, u128_arg;
    hv_val128_u128_mul_v1 => val128::u128_mul, u128_arg;
    hv_val128_u128_div_v1 => val128::u128_div, u128_arg;
    hv_val128_u128_rem_v1 => val128::u128_rem, u128_arg;
    hv_val128_i128_add_v1 => val128::i128_add, i128_arg;
    hv_val128_i128_sub_v1 => val128::i128_sub, i128_arg;
    hv_val128_i128_mul_v1 => val128::i128_mul, i128_arg;
    hv_val128_i128_div_v1 => val128::i128_div, i128_arg;
    hv_val128_i128_rem_v1 => val128::i128_rem, i128_arg;
}

#[no_mangle]
pub extern "C" fn hv_val128_u128_muldiv_v1(n: hv_word, num: hv_word, den: hv_word) -> hv_word {
    guard(|| {
        result_word(val128::u128_muldiv(
            &ExternHost,
            u128_arg(n),
            u128_arg(num),
            u128_arg(den),
        ))
    })
}

#[no_mangle]
pub extern "C" fn hv_val128_i128_muldiv_v1(n: hv_word, num: hv_word, den: hv_word) -> hv_word {
    guard(|| {
        result_word(val128::i128_muldiv(
            &ExternHost,
            i128_arg(n),
            i128_arg(num),
            i128_arg(den),
        ))
    })
}

#[no_mangle]
pub extern "C" fn hv_val128_u128_sqrt_v1(v: hv_word) -> hv_word {
    guard(|| val128::u128_sqrt(&ExternHost, u128_arg(v)).to_val().to_raw())
}

#[no_mangle]
pub extern "C" fn hv_val128_i128_sqrt_v1(v: hv_word) -> hv_word {
    guard(|| val128::i128_sqrt(&ExternHost, i128_arg(v)).to_val().to_raw())
}

#[no_mangle]
pub extern "C" fn hv_val128_u128_pow_v1(base: hv_word, exponent: i64) -> hv_word {
    guard(|| result_word(val128::u128_pow(&ExternHost, u128_arg(base), exponent)))
}

#[no_mangle]
pub extern "C" fn hv_val128_i128_pow_v1(base: hv_word, exponent: i64) -> hv_word {
    guard(|| result_word(val128::i128_pow(&ExternHost, i128_arg(base), exponent)))
}

// --- raw limbs: low word returned, high word through `out_hi` ---

#[inline]
unsafe fn split(x: U128Limbs, out_hi: *mut u64) -> u64 {
    if out_hi.is_null() {
        hv_trap(hostval::trap::HV_TRAP_INTERNAL);
    }
    *out_hi = x.hi;
    x.lo
}

macro_rules! export_limb_binary {
    ($($name:ident => $f:path;)*) => {
        $(#[no_mangle]
        pub unsafe extern "C" fn $name(
            a_lo: u64,
            a_hi: u64,
            b_lo: u64,
            b_hi: u64,
            out_hi: *mut u64,
        ) -> u64 {
            let r = guard(|| $f(U128Limbs::new(a_hi, a_lo), U128Limbs::new(b_hi, b_lo)));
            split(r, out_hi)
        })*
    };
}

export_limb_binary! {
    hv_limb_add_v1 => limb::add;
    hv_limb_sub_v1 => limb::sub;
    hv_limb_mul_v1 => limb::mul;
    hv_limb_div_v1 => limb::div;
    hv_limb_rem_v1 => limb::rem;
    hv_limb_and_v1 => limb::and;
    hv_limb_or_v1 => limb::or;
    hv_limb_xor_v1 => limb::xor;
}

#[no_mangle]
pub unsafe extern "C" fn hv_limb_mul64_v1(a: u64, b: u64, out_hi: *mut u64) -> u64 {
    split(limb::mul64(a, b), out_hi)
}

#[no_mangle]
pub unsafe extern "C" fn hv_limb_sqrt_v1(lo: u64, hi: u64, out_hi: *mut u64) -> u64 {
    split(limb::sqrt(U128Limbs::new(hi, lo)), out_hi)
}

#[no_mangle]
pub unsafe extern "C" fn hv_limb_pow_v1(lo: u64, hi: u64, exponent: i64, out_hi: *mut u64) -> u64 {
    split(limb::pow(U128Limbs::new(hi, lo), exponent), out_hi)
}

#[no_mangle]
pub unsafe extern "C" fn hv_limb_shl_v1(lo: u64, hi: u64, amount: u32, out_hi: *mut u64) -> u64 {
    split(limb::shl(U128Limbs::new(hi, lo), amount), out_hi)
}

#[no_mangle]
pub unsafe extern "C" fn hv_limb_shr_v1(lo: u64, hi: u64, amount: u32, out_hi: *mut u64) -> u64 {
    split(limb::shr(U128Limbs::new(hi, lo), amount), out_hi)
}

/// Returns 1 and leaves the quotient in (`lo`, `out_hi`) when it fits in 128
/// bits, 0 otherwise. A zero denominator traps.
#[no_mangle]
pub unsafe extern "C" fn hv_limb_muldiv_v1(
    n_lo: u64,
    n_hi: u64,
    num_lo: u64,
    num_hi: u64,
    den_lo: u64,
    den_hi: u64,
    out_lo: *mut u64,
    out_hi: *mut u64,
) -> u32 {
    let (q, overflow) = guard(|| {
        limb::muldiv(
            U128Limbs::new(n_hi, n_lo),
            U128Limbs::new(num_hi, num_lo),
            U128Limbs::new(den_hi, den_lo),
        )
    });
    if out_lo.is_null() {
        hv_trap(hostval::trap::HV_TRAP_INTERNAL);
    }
    *out_lo = split(q, out_hi);
    u32::from(!overflow)
}

// --- symbols ---

/// Encodes `len` bytes at `ptr` as a small symbol word. Traps on bad input.
#[no_mangle]
pub unsafe extern "C" fn hv_symbol_from_bytes_v1(ptr: *const u8, len: u32) -> hv_word {
    if ptr.is_null() && len != 0 {
        hv_trap(hostval::trap::HV_TRAP_INTERNAL);
    }
    let bytes = if len == 0 {
        &[][..]
    } else {
        core::slice::from_raw_parts(ptr, len as usize)
    };
    guard(|| {
        let s = match core::str::from_utf8(bytes) {
            Ok(s) => s,
            Err(_) => hostval::trap(hostval::Trap::InvalidCharacter),
        };
        SymbolSmall::from_str_or_trap(s).to_val().to_raw()
    })
}

/// Writes the symbol's characters to `out` (at least 9 bytes) and returns
/// how many were written.
#[no_mangle]
pub unsafe extern "C" fn hv_symbol_to_bytes_v1(sym: hv_word, out: *mut u8) -> u32 {
    if out.is_null() {
        hv_trap(hostval::trap::HV_TRAP_INTERNAL);
    }
    let text = guard(|| Val::from_raw(sym).to_symbol_small().to_str());
    let bytes = text.as_bytes();
    core::ptr::copy_nonoverlapping(bytes.as_ptr(), out, bytes.len());
    bytes.len() as u32
}
