use std::panic::{catch_unwind, AssertUnwindSafe};

use hostval::arith128;
use hostval::val128;
use hostval::{limb, ErrorVal, I128Val, U128Limbs, U128Val};
use hostval_mem_host::MemHost;

fn limbs(x: u128) -> U128Limbs {
    U128Limbs::new((x >> 64) as u64, x as u64)
}

fn value(x: U128Limbs) -> u128 {
    (u128::from(x.hi) << 64) | u128::from(x.lo)
}

fn u(host: &MemHost, x: u128) -> U128Val {
    U128Val::from_limbs(host, limbs(x))
}

fn i(host: &MemHost, x: i128) -> I128Val {
    I128Val::from_limbs(host, limbs(x as u128))
}

fn read_u(host: &MemHost, r: Result<U128Val, ErrorVal>) -> Result<u128, ErrorVal> {
    r.map(|v| value(v.to_limbs(host)))
}

fn read_i(host: &MemHost, r: Result<I128Val, ErrorVal>) -> Result<i128, ErrorVal> {
    r.map(|v| value(v.to_limbs(host)) as i128)
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

    fn next_u128(&mut self) -> u128 {
        let wide = (u128::from(self.next()) << 64) | u128::from(self.next());
        wide >> (self.next() % 128)
    }
}

#[test]
fn checked_add_at_the_boundary() {
    let host = MemHost::new();
    let max = u(&host, u128::MAX);
    let one = u(&host, 1);
    assert_eq!(arith128::u128_add(&host, max, one), Err(ErrorVal::arith_domain()));

    // The raw limb engine wraps instead.
    assert_eq!(limb::add(limbs(u128::MAX), limbs(1)), U128Limbs::ZERO);
}

#[test]
fn unsigned_ops_match_native_checked_ops() {
    let host = MemHost::new();
    let mut rng = XorShift(0x0DDB_1A5E_5BAD_5EED);
    for _ in 0..300 {
        let (a, b) = (rng.next_u128(), rng.next_u128());
        let (va, vb) = (u(&host, a), u(&host, b));
        let ok = |r: Result<u128, ErrorVal>| r.ok();

        assert_eq!(ok(read_u(&host, arith128::u128_add(&host, va, vb))), a.checked_add(b));
        assert_eq!(ok(read_u(&host, arith128::u128_sub(&host, va, vb))), a.checked_sub(b));
        assert_eq!(ok(read_u(&host, arith128::u128_mul(&host, va, vb))), a.checked_mul(b));
        assert_eq!(ok(read_u(&host, arith128::u128_div(&host, va, vb))), a.checked_div(b));
        assert_eq!(ok(read_u(&host, arith128::u128_rem(&host, va, vb))), a.checked_rem(b));

        let s = (b % 130) as u32;
        let shl = (s < 128 && (a << s) >> s == a).then(|| a << s);
        let shr = (s < 128).then(|| a >> s);
        assert_eq!(ok(read_u(&host, arith128::u128_shl(&host, va, s))), shl);
        assert_eq!(ok(read_u(&host, arith128::u128_shr(&host, va, s))), shr);
    }
}

#[test]
fn shl_past_the_top_bit_is_a_domain_error() {
    let host = MemHost::new();
    let top = u(&host, 1u128 << 127);
    // u256 keeps the bit, so narrowing fails.
    assert_eq!(arith128::u128_shl(&host, top, 1), Err(ErrorVal::arith_domain()));
    assert_eq!(
        read_u(&host, arith128::u128_shr(&host, top, 127)),
        Ok(1)
    );
    assert_eq!(arith128::u128_shl(&host, top, 128), Err(ErrorVal::arith_domain()));
}

#[test]
fn pow_conventions() {
    let host = MemHost::new();
    assert_eq!(read_u(&host, arith128::u128_pow(&host, u(&host, 0), 0)), Ok(1));
    assert_eq!(read_u(&host, arith128::u128_pow(&host, u(&host, 10), 38)), Ok(10u128.pow(38)));
    assert_eq!(
        arith128::u128_pow(&host, u(&host, 10), 39),
        Err(ErrorVal::arith_domain())
    );
    assert_eq!(read_i(&host, arith128::i128_pow(&host, i(&host, -2), 127)), Ok(i128::MIN));
    assert_eq!(
        arith128::i128_pow(&host, i(&host, 2), 127),
        Err(ErrorVal::arith_domain())
    );
}

#[test]
fn signed_ops_match_native_checked_ops() {
    let host = MemHost::new();
    let mut rng = XorShift(0xFEED_FACE_0123_4567);
    for _ in 0..300 {
        let (a, b) = (rng.next_u128() as i128, rng.next_u128() as i128);
        let a = if rng.next() & 1 == 1 { a.wrapping_neg() } else { a };
        let (va, vb) = (i(&host, a), i(&host, b));
        let ok = |r: Result<i128, ErrorVal>| r.ok();

        assert_eq!(ok(read_i(&host, arith128::i128_add(&host, va, vb))), a.checked_add(b));
        assert_eq!(ok(read_i(&host, arith128::i128_sub(&host, va, vb))), a.checked_sub(b));
        assert_eq!(ok(read_i(&host, arith128::i128_mul(&host, va, vb))), a.checked_mul(b));
        assert_eq!(ok(read_i(&host, arith128::i128_div(&host, va, vb))), a.checked_div(b));
        assert_eq!(
            ok(read_i(&host, arith128::i128_rem(&host, va, vb))),
            a.checked_rem_euclid(b)
        );
    }
}

#[test]
fn signed_edge_cases() {
    let host = MemHost::new();
    let min = i(&host, i128::MIN);
    let minus_one = i(&host, -1);
    assert_eq!(arith128::i128_div(&host, min, minus_one), Err(ErrorVal::arith_domain()));
    assert_eq!(arith128::i128_sub(&host, min, i(&host, 1)), Err(ErrorVal::arith_domain()));
    assert_eq!(
        read_i(&host, arith128::i128_rem(&host, i(&host, -7), i(&host, 2))),
        Ok(1)
    );
    assert_eq!(
        read_i(&host, arith128::i128_shr(&host, i(&host, -8), 2)),
        Ok(-2)
    );
    assert_eq!(
        read_i(&host, arith128::i128_shl(&host, i(&host, -1), 127)),
        Ok(i128::MIN)
    );
    assert_eq!(arith128::i128_shr(&host, min, 200), Err(ErrorVal::arith_domain()));
}

#[test]
fn agrees_with_limb_surface_on_non_negative_values() {
    let host = MemHost::new();
    let mut rng = XorShift(0x5151_7E57_0000_0001);
    for _ in 0..200 {
        let (a, b) = (rng.next_u128(), rng.next_u128());
        let (ua, ub) = (u(&host, a), u(&host, b));
        assert_eq!(
            read_u(&host, arith128::u128_mul(&host, ua, ub)),
            read_u(&host, val128::u128_mul(&host, ua, ub))
        );
        assert_eq!(
            read_u(&host, arith128::u128_div(&host, ua, ub)),
            read_u(&host, val128::u128_div(&host, ua, ub))
        );
        assert_eq!(
            read_u(&host, arith128::u128_add(&host, ua, ub)),
            read_u(&host, val128::u128_add(&host, ua, ub))
        );
        assert_eq!(
            read_u(&host, arith128::u128_sub(&host, ua, ub)),
            read_u(&host, val128::u128_sub(&host, ua, ub))
        );
        assert_eq!(
            read_u(&host, arith128::u128_rem(&host, ua, ub)),
            read_u(&host, val128::u128_rem(&host, ua, ub))
        );
        let e = (rng.next() % 70) as u32;
        assert_eq!(
            read_u(&host, arith128::u128_pow(&host, ua, e)),
            read_u(&host, val128::u128_pow(&host, ua, i64::from(e)))
        );

        let (sa, sb) = ((a >> 1) as i128, (b >> 1) as i128);
        let (ia, ib) = (i(&host, sa), i(&host, sb));
        assert_eq!(
            read_i(&host, arith128::i128_add(&host, ia, ib)),
            read_i(&host, val128::i128_add(&host, ia, ib))
        );
        assert_eq!(
            read_i(&host, arith128::i128_sub(&host, ia, ib)),
            read_i(&host, val128::i128_sub(&host, ia, ib))
        );
        assert_eq!(
            read_i(&host, arith128::i128_mul(&host, ia, ib)),
            read_i(&host, val128::i128_mul(&host, ia, ib))
        );
        assert_eq!(
            read_i(&host, arith128::i128_div(&host, ia, ib)),
            read_i(&host, val128::i128_div(&host, ia, ib))
        );
        assert_eq!(
            read_i(&host, arith128::i128_pow(&host, ia, e)),
            read_i(&host, val128::i128_pow(&host, ia, i64::from(e)))
        );
    }
}

#[test]
fn negative_operands_split_the_two_surfaces() {
    let host = MemHost::new();
    let neg = i(&host, -5);
    let pos = i(&host, 3);
    assert_eq!(read_i(&host, arith128::i128_add(&host, neg, pos)), Ok(-2));

    let trapped = catch_unwind(AssertUnwindSafe(|| val128::i128_add(&host, neg, pos)));
    let code = hostval::trap::trap_code_of(trapped.unwrap_err().as_ref());
    assert_eq!(code, hostval::Trap::NegativeOperand.code());
}

#[test]
fn results_are_canonically_packed() {
    let host = MemHost::new();
    let big = u(&host, u128::MAX);
    let diff = arith128::u128_sub(&host, big, u(&host, u128::MAX - 9)).unwrap();
    assert!(diff.is_small());
    let neg = arith128::i128_sub(&host, i(&host, 0), i(&host, i128::MAX)).unwrap();
    assert!(!neg.is_small());
}
