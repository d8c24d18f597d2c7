//! Unsigned 128-bit arithmetic over two 64-bit limbs.
//!
//! Nothing here uses a native 128-bit type. Every operation hands back both
//! halves as a [`U128Limbs`]; there is no secondary output to read afterwards.
//! Operations are total and truncate modulo 2^128, except division and
//! remainder by zero, which trap.

use std::cmp::Ordering;

use crate::trap::{trap, Trap};

const HALF_BITS: u32 = 32;
const HALF_MASK: u64 = (1 << HALF_BITS) - 1;

/// A 128-bit integer as `hi * 2^64 + lo`. Signed callers read it as two's
/// complement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct U128Limbs {
    pub lo: u64,
    pub hi: u64,
}

impl U128Limbs {
    pub const ZERO: U128Limbs = U128Limbs { lo: 0, hi: 0 };
    pub const ONE: U128Limbs = U128Limbs { lo: 1, hi: 0 };
    pub const MAX: U128Limbs = U128Limbs {
        lo: u64::MAX,
        hi: u64::MAX,
    };
    /// Largest two's complement positive value.
    pub const I128_MAX: U128Limbs = U128Limbs {
        lo: u64::MAX,
        hi: i64::MAX as u64,
    };

    #[inline]
    pub const fn new(hi: u64, lo: u64) -> Self {
        U128Limbs { lo, hi }
    }

    #[inline]
    pub const fn from_u64(v: u64) -> Self {
        U128Limbs { lo: v, hi: 0 }
    }

    /// Sign-extends `v`.
    #[inline]
    pub const fn from_i64(v: i64) -> Self {
        U128Limbs {
            lo: v as u64,
            hi: if v < 0 { u64::MAX } else { 0 },
        }
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    /// Top bit set, i.e. negative when read as two's complement.
    #[inline]
    pub const fn is_negative(self) -> bool {
        (self.hi >> 63) != 0
    }

    #[inline]
    pub fn bit(self, i: u32) -> bool {
        debug_assert!(i < 128);
        if i >= 64 {
            (self.hi >> (i - 64)) & 1 != 0
        } else {
            (self.lo >> i) & 1 != 0
        }
    }

    pub fn leading_zeros(self) -> u32 {
        if self.hi != 0 {
            self.hi.leading_zeros()
        } else {
            64 + self.lo.leading_zeros()
        }
    }

    pub fn trailing_zeros(self) -> u32 {
        if self.lo != 0 {
            self.lo.trailing_zeros()
        } else {
            64 + self.hi.trailing_zeros()
        }
    }

    pub fn count_ones(self) -> u32 {
        self.lo.count_ones() + self.hi.count_ones()
    }

    /// Two's complement ordering.
    pub fn signed_cmp(self, other: Self) -> Ordering {
        (self.hi as i64, self.lo).cmp(&(other.hi as i64, other.lo))
    }
}

impl Ord for U128Limbs {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.hi, self.lo).cmp(&(other.hi, other.lo))
    }
}

impl PartialOrd for U128Limbs {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Full 64x64 product from four 32x32 partial products.
pub fn mul64(a: u64, b: u64) -> U128Limbs {
    let (a0, a1) = (a & HALF_MASK, a >> HALF_BITS);
    let (b0, b1) = (b & HALF_MASK, b >> HALF_BITS);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // At most three 32-bit quantities; cannot overflow.
    let mid = (p00 >> HALF_BITS) + (p01 & HALF_MASK) + (p10 & HALF_MASK);
    U128Limbs {
        lo: (p00 & HALF_MASK) | (mid << HALF_BITS),
        hi: p11 + (p01 >> HALF_BITS) + (p10 >> HALF_BITS) + (mid >> HALF_BITS),
    }
}

pub fn add(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    overflowing_add(a, b).0
}

pub fn overflowing_add(a: U128Limbs, b: U128Limbs) -> (U128Limbs, bool) {
    let lo = a.lo.wrapping_add(b.lo);
    let carry = lo < a.lo;
    let (hi, o1) = a.hi.overflowing_add(b.hi);
    let (hi, o2) = hi.overflowing_add(carry as u64);
    (U128Limbs { lo, hi }, o1 || o2)
}

pub fn sub(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    overflowing_sub(a, b).0
}

pub fn overflowing_sub(a: U128Limbs, b: U128Limbs) -> (U128Limbs, bool) {
    let lo = a.lo.wrapping_sub(b.lo);
    let borrow = lo > a.lo;
    let (hi, o1) = a.hi.overflowing_sub(b.hi);
    let (hi, o2) = hi.overflowing_sub(borrow as u64);
    (U128Limbs { lo, hi }, o1 || o2)
}

/// Truncating product. The cross terms only ever reach the high limb.
pub fn mul(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    let base = mul64(a.lo, b.lo);
    U128Limbs {
        lo: base.lo,
        hi: base
            .hi
            .wrapping_add(a.lo.wrapping_mul(b.hi))
            .wrapping_add(a.hi.wrapping_mul(b.lo)),
    }
}

pub fn overflowing_mul(a: U128Limbs, b: U128Limbs) -> (U128Limbs, bool) {
    let product = mul(a, b);
    if a.hi != 0 && b.hi != 0 {
        return (product, true);
    }
    let base = mul64(a.lo, b.lo);
    let cross_a = mul64(a.lo, b.hi);
    let cross_b = mul64(a.hi, b.lo);
    let (hi, o1) = base.hi.overflowing_add(cross_a.lo);
    let (_, o2) = hi.overflowing_add(cross_b.lo);
    (product, cross_a.hi != 0 || cross_b.hi != 0 || o1 || o2)
}

/// Quotient and remainder by restoring binary long division. Traps on a zero
/// divisor.
pub fn div_rem(a: U128Limbs, b: U128Limbs) -> (U128Limbs, U128Limbs) {
    if b.is_zero() {
        trap(Trap::DivisionByZero);
    }
    if a < b {
        return (U128Limbs::ZERO, a);
    }
    if a.hi == 0 {
        // b <= a, so b.hi == 0 too.
        return (
            U128Limbs::from_u64(a.lo / b.lo),
            U128Limbs::from_u64(a.lo % b.lo),
        );
    }

    let shift = b.leading_zeros() - a.leading_zeros();
    let mut divisor = shl(b, shift);
    let mut mask = shl(U128Limbs::ONE, shift);
    let mut quotient = U128Limbs::ZERO;
    let mut rem = a;
    while !mask.is_zero() {
        if rem >= divisor {
            rem = sub(rem, divisor);
            quotient = or(quotient, mask);
        }
        divisor = shr(divisor, 1);
        mask = shr(mask, 1);
    }
    (quotient, rem)
}

pub fn div(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    div_rem(a, b).0
}

pub fn rem(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    div_rem(a, b).1
}

/// `floor(sqrt(v))`, one result bit per step from the highest power of four
/// not above `v`.
pub fn sqrt(v: U128Limbs) -> U128Limbs {
    if v.is_zero() {
        return U128Limbs::ZERO;
    }
    let top = 127 - v.leading_zeros();
    let mut bit = shl(U128Limbs::ONE, top & !1);
    let mut residual = v;
    let mut root = U128Limbs::ZERO;
    while !bit.is_zero() {
        let trial = add(root, bit);
        if residual >= trial {
            residual = sub(residual, trial);
            root = add(shr(root, 1), bit);
        } else {
            root = shr(root, 1);
        }
        bit = shr(bit, 2);
    }
    root
}

/// `floor(number * numerator / denominator)` without ever holding the full
/// product. The flag is set when the quotient itself does not fit in 128 bits,
/// in which case the value is truncated. Traps on a zero denominator.
pub fn muldiv(
    number: U128Limbs,
    numerator: U128Limbs,
    denominator: U128Limbs,
) -> (U128Limbs, bool) {
    let (whole, part) = div_rem(number, denominator);
    let mut quotient = U128Limbs::ZERO;
    let mut rem = U128Limbs::ZERO;
    let mut overflow = false;

    // Invariant: quotient * denominator + rem == number * (bits of numerator
    // consumed so far), with rem < denominator.
    let bits = 128 - numerator.leading_zeros();
    for i in (0..bits).rev() {
        let (q, o) = overflowing_add(quotient, quotient);
        overflow |= o;
        quotient = q;
        let (r, carry) = overflowing_add(rem, rem);
        rem = if carry || r >= denominator {
            let (q, o) = overflowing_add(quotient, U128Limbs::ONE);
            overflow |= o;
            quotient = q;
            sub(r, denominator)
        } else {
            r
        };

        if numerator.bit(i) {
            let (q, o) = overflowing_add(quotient, whole);
            overflow |= o;
            quotient = q;
            let (r, carry) = overflowing_add(rem, part);
            rem = if carry || r >= denominator {
                let (q, o) = overflowing_add(quotient, U128Limbs::ONE);
                overflow |= o;
                quotient = q;
                sub(r, denominator)
            } else {
                r
            };
        }
    }
    (quotient, overflow)
}

/// Truncating power. Negative exponents yield zero.
pub fn pow(base: U128Limbs, exponent: i64) -> U128Limbs {
    overflowing_pow(base, exponent).0
}

pub fn overflowing_pow(base: U128Limbs, exponent: i64) -> (U128Limbs, bool) {
    if exponent < 0 {
        return (U128Limbs::ZERO, false);
    }
    match exponent {
        0 => return (U128Limbs::ONE, false),
        1 => return (base, false),
        2 => return overflowing_mul(base, base),
        3 => {
            let (sq, o1) = overflowing_mul(base, base);
            let (cube, o2) = overflowing_mul(sq, base);
            return (cube, o1 || o2);
        }
        4 => {
            let (sq, o1) = overflowing_mul(base, base);
            let (quad, o2) = overflowing_mul(sq, sq);
            return (quad, o1 || o2);
        }
        _ => {}
    }

    if base.count_ones() == 1 {
        let log2 = base.trailing_zeros() as u64;
        if log2 == 0 {
            return (U128Limbs::ONE, false);
        }
        // exponent >= 5 here, so log2 * exponent cannot wrap before the check.
        return match log2.checked_mul(exponent as u64) {
            Some(shift) if shift < 128 => (shl(U128Limbs::ONE, shift as u32), false),
            _ => (U128Limbs::ZERO, true),
        };
    }

    let mut result = U128Limbs::ONE;
    let mut square = base;
    let mut square_overflowed = false;
    let mut overflow = false;
    let mut e = exponent as u64;
    while e > 0 {
        if e & 1 == 1 {
            let (r, o) = overflowing_mul(result, square);
            overflow |= o || square_overflowed;
            result = r;
        }
        e >>= 1;
        if e > 0 {
            let (s, o) = overflowing_mul(square, square);
            square_overflowed |= o;
            square = s;
        }
    }
    (result, overflow)
}

pub fn and(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    U128Limbs {
        lo: a.lo & b.lo,
        hi: a.hi & b.hi,
    }
}

pub fn or(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    U128Limbs {
        lo: a.lo | b.lo,
        hi: a.hi | b.hi,
    }
}

pub fn xor(a: U128Limbs, b: U128Limbs) -> U128Limbs {
    U128Limbs {
        lo: a.lo ^ b.lo,
        hi: a.hi ^ b.hi,
    }
}

pub fn not(a: U128Limbs) -> U128Limbs {
    U128Limbs {
        lo: !a.lo,
        hi: !a.hi,
    }
}

/// Two's complement negation.
pub fn neg(a: U128Limbs) -> U128Limbs {
    add(not(a), U128Limbs::ONE)
}

/// Left shift; the amount is taken mod 128.
pub fn shl(a: U128Limbs, amount: u32) -> U128Limbs {
    let n = amount & 127;
    match n {
        0 => a,
        1..=63 => U128Limbs {
            lo: a.lo << n,
            hi: (a.hi << n) | (a.lo >> (64 - n)),
        },
        _ => U128Limbs {
            lo: 0,
            hi: a.lo << (n - 64),
        },
    }
}

/// Logical right shift; the amount is taken mod 128.
pub fn shr(a: U128Limbs, amount: u32) -> U128Limbs {
    let n = amount & 127;
    match n {
        0 => a,
        1..=63 => U128Limbs {
            lo: (a.lo >> n) | (a.hi << (64 - n)),
            hi: a.hi >> n,
        },
        _ => U128Limbs {
            lo: a.hi >> (n - 64),
            hi: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(hi: u64, lo: u64) -> U128Limbs {
        U128Limbs::new(hi, lo)
    }

    fn wide(x: U128Limbs) -> u128 {
        (u128::from(x.hi) << 64) | u128::from(x.lo)
    }

    fn narrow(x: u128) -> U128Limbs {
        l((x >> 64) as u64, x as u64)
    }

    fn trap_of<R>(f: impl FnOnce() -> R + std::panic::UnwindSafe) -> Trap {
        let payload = std::panic::catch_unwind(f).err().expect("expected a trap");
        *payload.downcast_ref::<Trap>().expect("trap payload")
    }

    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        /// Mixes full-width, half-width and tiny values.
        fn limbs(&mut self) -> U128Limbs {
            let v = l(self.next(), self.next());
            match self.next() % 4 {
                0 => v,
                1 => l(0, v.lo),
                2 => l(v.hi >> 40, v.lo),
                _ => l(0, v.lo & 0xff),
            }
        }
    }

    #[test]
    fn add_carries_between_limbs() {
        let got = add(
            U128Limbs { lo: 100, hi: 255 },
            U128Limbs { lo: 255, hi: 100 },
        );
        assert_eq!(got, U128Limbs { lo: 355, hi: 355 });
        assert_eq!(add(l(0, u64::MAX), U128Limbs::ONE), l(1, 0));
        assert_eq!(add(U128Limbs::MAX, U128Limbs::ONE), U128Limbs::ZERO);
        assert!(overflowing_add(U128Limbs::MAX, U128Limbs::ONE).1);
    }

    #[test]
    fn sub_borrows_between_limbs() {
        assert_eq!(sub(l(1, 0), U128Limbs::ONE), l(0, u64::MAX));
        assert_eq!(sub(U128Limbs::ZERO, U128Limbs::ONE), U128Limbs::MAX);
        assert!(overflowing_sub(U128Limbs::ZERO, U128Limbs::ONE).1);
        assert!(!overflowing_sub(l(5, 0), l(4, 9)).1);
    }

    #[test]
    fn mul_32bit_square_is_exact() {
        let got = mul(l(0, 0xFFFF_FFFF), l(0, 0xFFFF_FFFF));
        assert_eq!(got, l(0, 0xFFFF_FFFE_0000_0001));
        assert_eq!(mul64(u64::MAX, u64::MAX), l(u64::MAX - 1, 1));
    }

    #[test]
    fn mul_truncates_and_flags_overflow() {
        let (p, o) = overflowing_mul(l(1, 0), l(1, 0));
        assert_eq!(p, U128Limbs::ZERO);
        assert!(o);
        let (p, o) = overflowing_mul(l(0, u64::MAX), l(0, u64::MAX));
        assert_eq!(wide(p), u128::from(u64::MAX) * u128::from(u64::MAX));
        assert!(!o);
        assert!(overflowing_mul(l(0, 1 << 63), l(2, 0)).1);
    }

    #[test]
    fn div_matches_known_quotient() {
        let got = div(
            U128Limbs {
                lo: 10248516654965971928,
                hi: 5,
            },
            U128Limbs {
                lo: 43545453452,
                hi: 0,
            },
        );
        assert_eq!(
            got,
            U128Limbs {
                lo: 2353454354,
                hi: 0
            }
        );
    }

    #[test]
    fn div_by_zero_traps() {
        assert_eq!(
            trap_of(|| div(U128Limbs::ONE, U128Limbs::ZERO)),
            Trap::DivisionByZero
        );
        assert_eq!(
            trap_of(|| rem(U128Limbs::MAX, U128Limbs::ZERO)),
            Trap::DivisionByZero
        );
        assert_eq!(
            trap_of(|| muldiv(U128Limbs::ONE, U128Limbs::ONE, U128Limbs::ZERO)),
            Trap::DivisionByZero
        );
    }

    #[test]
    fn arithmetic_identities_hold() {
        let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
        for _ in 0..2000 {
            let a = rng.limbs();
            let b = rng.limbs();
            assert_eq!(add(a, U128Limbs::ZERO), a);
            assert_eq!(sub(a, a), U128Limbs::ZERO);
            assert_eq!(mul(a, U128Limbs::ONE), a);
            assert_eq!(div(a, U128Limbs::ONE), a);
            if !b.is_zero() {
                let (q, r) = div_rem(a, b);
                assert!(r < b);
                assert_eq!(add(mul(q, b), r), a);
                assert_eq!(wide(q), wide(a) / wide(b));
            }
        }
    }

    #[test]
    fn ops_agree_with_native_reference() {
        let mut rng = XorShift(0x0123_4567_89ab_cdef);
        for _ in 0..2000 {
            let a = rng.limbs();
            let b = rng.limbs();
            let (wa, wb) = (wide(a), wide(b));
            assert_eq!(add(a, b), narrow(wa.wrapping_add(wb)));
            assert_eq!(sub(a, b), narrow(wa.wrapping_sub(wb)));
            assert_eq!(mul(a, b), narrow(wa.wrapping_mul(wb)));
            assert_eq!(overflowing_mul(a, b).1, wa.checked_mul(wb).is_none());
            assert_eq!(overflowing_add(a, b).1, wa.checked_add(wb).is_none());
            assert_eq!(a.cmp(&b), wa.cmp(&wb));
            assert_eq!(a.signed_cmp(b), (wa as i128).cmp(&(wb as i128)));
            let n = (rng.next() % 200) as u32;
            assert_eq!(shl(a, n), narrow(wa << (n % 128)));
            assert_eq!(shr(a, n), narrow(wa >> (n % 128)));
            assert_eq!(and(a, b), narrow(wa & wb));
            assert_eq!(or(a, b), narrow(wa | wb));
            assert_eq!(xor(a, b), narrow(wa ^ wb));
            assert_eq!(not(a), narrow(!wa));
            assert_eq!(neg(a), narrow(wa.wrapping_neg()));
            assert_eq!(a.leading_zeros(), wa.leading_zeros());
        }
    }

    #[test]
    fn shift_crosses_limb_boundary() {
        assert_eq!(shl(l(0, 1 << 63), 1), l(1, 0));
        assert_eq!(shr(l(1, 0), 1), l(0, 1 << 63));
        assert_eq!(shl(U128Limbs::ONE, 127), l(1 << 63, 0));
        assert_eq!(shl(U128Limbs::ONE, 128), U128Limbs::ONE);
        assert_eq!(shr(l(1 << 63, 0), 127), U128Limbs::ONE);
    }

    #[test]
    fn sqrt_brackets_input() {
        let mut rng = XorShift(0xfeed_face_cafe_beef);
        let mut samples: Vec<U128Limbs> = (0..1000).map(|_| rng.limbs()).collect();
        samples.extend([
            U128Limbs::ZERO,
            U128Limbs::ONE,
            l(0, 2),
            l(0, 3),
            l(0, 4),
            U128Limbs::MAX,
            l(1, 0),
        ]);
        for v in samples {
            let root = sqrt(v);
            let (sq, o) = overflowing_mul(root, root);
            assert!(!o && sq <= v, "sqrt({v:?}) = {root:?} too large");
            let next = add(root, U128Limbs::ONE);
            let (next_sq, o) = overflowing_mul(next, next);
            assert!(o || next_sq > v, "sqrt({v:?}) = {root:?} too small");
        }
        assert_eq!(sqrt(U128Limbs::MAX), l(0, u64::MAX));
    }

    #[test]
    fn muldiv_survives_wide_intermediate() {
        let n = l(u64::MAX, u64::MAX);
        let (q, o) = muldiv(n, l(0, 3), l(0, 4));
        assert!(!o);
        assert_eq!(wide(q), u128::MAX / 4 * 3 + (u128::MAX % 4) * 3 / 4);

        let (q, o) = muldiv(l(1 << 40, 0), l(1 << 40, 0), l(1 << 50, 0));
        assert!(!o);
        assert_eq!(q, l(1 << 30, 0));

        let (_, o) = muldiv(U128Limbs::MAX, l(0, 2), U128Limbs::ONE);
        assert!(o);
    }

    #[test]
    fn muldiv_matches_native_when_product_fits() {
        let mut rng = XorShift(0x5555_aaaa_1234_4321);
        for _ in 0..1000 {
            let a = l(0, rng.next());
            let b = l(0, rng.next() >> 1);
            let c = rng.limbs();
            if c.is_zero() {
                continue;
            }
            let (q, o) = muldiv(a, b, c);
            assert!(!o || wide(a) * wide(b) / wide(c) > u128::MAX);
            assert_eq!(wide(q), wide(a) * wide(b) / wide(c));
        }
    }

    #[test]
    fn pow_conventions() {
        assert_eq!(pow(l(0, 7), 0), U128Limbs::ONE);
        assert_eq!(pow(U128Limbs::ZERO, 0), U128Limbs::ONE);
        assert_eq!(pow(U128Limbs::ZERO, 9), U128Limbs::ZERO);
        assert_eq!(pow(l(0, 7), -1), U128Limbs::ZERO);
        assert_eq!(pow(l(0, 7), 1), l(0, 7));
        assert_eq!(pow(l(0, 3), 4), l(0, 81));
        assert_eq!(pow(l(0, 2), 127), l(1 << 63, 0));
        assert_eq!(overflowing_pow(l(0, 2), 128), (U128Limbs::ZERO, true));
        assert_eq!(overflowing_pow(l(0, 4), i64::MAX), (U128Limbs::ZERO, true));
        assert_eq!(pow(U128Limbs::ONE, i64::MAX), U128Limbs::ONE);
    }

    #[test]
    fn pow_agrees_with_native_reference() {
        for base in [3u128, 5, 7, 10, 12, 255, 1_000_003] {
            for exp in 0..90i64 {
                let want = base.checked_pow(exp as u32);
                let (got, o) = overflowing_pow(narrow(base), exp);
                assert_eq!(o, want.is_none(), "{base}^{exp}");
                assert_eq!(got, narrow(base.wrapping_pow(exp as u32)), "{base}^{exp}");
            }
        }
    }
}
