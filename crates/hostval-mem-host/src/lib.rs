//! In-memory reference host.
//!
//! Stores objects in a growable table indexed by handle and performs the
//! 256-bit arithmetic with `alloy-primitives`. Used as the test double for
//! `hostval::Host` and by `hvword` to render object-backed results.

use std::cell::RefCell;
use std::cmp::Ordering;

use alloy_primitives::{I256, U256};
use hostval::num::{self, I256Pieces, U256Pieces};
use hostval::tag::Tag;
use hostval::{trap, ErrorVal, Host, ObjectKind, ProtocolVersion, SymbolSmall, Trap, Val};
use tracing::debug;

/// Largest shift the 256-bit shift operations accept.
const MAX_SHIFT_256: u32 = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostObject {
    U64(u64),
    I64(i64),
    Timepoint(u64),
    Duration(u64),
    U128(u128),
    I128(i128),
    U256(U256),
    I256(I256),
    Bytes(Vec<u8>),
    String(String),
    Symbol(String),
    Vec(Vec<Val>),
}

impl HostObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            HostObject::U64(_) => ObjectKind::U64,
            HostObject::I64(_) => ObjectKind::I64,
            HostObject::Timepoint(_) => ObjectKind::Timepoint,
            HostObject::Duration(_) => ObjectKind::Duration,
            HostObject::U128(_) => ObjectKind::U128,
            HostObject::I128(_) => ObjectKind::I128,
            HostObject::U256(_) => ObjectKind::U256,
            HostObject::I256(_) => ObjectKind::I256,
            HostObject::Bytes(_) => ObjectKind::Bytes,
            HostObject::String(_) => ObjectKind::String,
            HostObject::Symbol(_) => ObjectKind::Symbol,
            HostObject::Vec(_) => ObjectKind::Vec,
        }
    }
}

fn u256_from_pieces(p: U256Pieces) -> U256 {
    U256::from_limbs([p.lo_lo, p.lo_hi, p.hi_lo, p.hi_hi])
}

fn u256_to_pieces(x: U256) -> U256Pieces {
    let [lo_lo, lo_hi, hi_lo, hi_hi] = x.into_limbs();
    U256Pieces {
        hi_hi,
        hi_lo,
        lo_hi,
        lo_lo,
    }
}

fn i256_from_pieces(p: I256Pieces) -> I256 {
    I256::from_raw(U256::from_limbs([p.lo_lo, p.lo_hi, p.hi_lo, p.hi_hi as u64]))
}

fn i256_to_pieces(x: I256) -> I256Pieces {
    let [lo_lo, lo_hi, hi_lo, hi_hi] = x.into_raw().into_limbs();
    I256Pieces {
        hi_hi: hi_hi as i64,
        hi_lo,
        lo_hi,
        lo_lo,
    }
}

fn i256_from_i128(hi: u64, lo: u64) -> I256 {
    let ext = if (hi as i64) < 0 { u64::MAX } else { 0 };
    I256::from_raw(U256::from_limbs([lo, hi, ext, ext]))
}

/// Handles are 32-bit; a full table traps [`Trap::Internal`].
fn next_handle(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| trap(Trap::Internal))
}

/// Ordering key for [`Host::obj_cmp`]: values first compare by family (small
/// and object forms of one kind share a family), then by content.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum CmpKey {
    Unsigned(U256),
    Signed(I256),
    Text(Vec<u8>),
    Seq(Vec<u64>),
    Word(u64),
}

#[derive(Debug, Default)]
pub struct MemHost {
    version: ProtocolVersion,
    objects: RefCell<Vec<HostObject>>,
}

impl MemHost {
    pub fn new() -> Self {
        MemHost::default()
    }

    pub fn with_version(version: ProtocolVersion) -> Self {
        MemHost {
            version,
            objects: RefCell::default(),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn object_count(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn add_object(&self, obj: HostObject) -> Val {
        let kind = obj.kind();
        let mut objects = self.objects.borrow_mut();
        let handle = next_handle(objects.len());
        objects.push(obj);
        debug!(handle, ?kind, "allocated host object");
        Val::from_object(kind, handle)
    }

    /// Traps unless `v` is a live handle to an object of `kind`.
    pub fn object(&self, v: Val, kind: ObjectKind) -> HostObject {
        if !v.is_object_of(kind) {
            trap(Trap::TypeMismatch);
        }
        let objects = self.objects.borrow();
        match objects.get(v.object_handle() as usize) {
            Some(obj) if obj.kind() == kind => obj.clone(),
            _ => trap(Trap::TypeMismatch),
        }
    }

    pub fn bytes_new(&self, bytes: &[u8]) -> Val {
        self.add_object(HostObject::Bytes(bytes.to_vec()))
    }

    pub fn string_new(&self, s: &str) -> Val {
        self.add_object(HostObject::String(s.to_owned()))
    }

    /// Small form when the name fits, object form otherwise. The characters
    /// must still come from the symbol alphabet.
    pub fn symbol_new(&self, s: &str) -> Val {
        match SymbolSmall::try_from_str(s) {
            Ok(sym) => sym.to_val(),
            Err(hostval::CodecError::TooLong { .. }) => {
                if s.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
                    self.add_object(HostObject::Symbol(s.to_owned()))
                } else {
                    trap(Trap::InvalidCharacter)
                }
            }
            Err(err) => trap(err.trap_kind()),
        }
    }

    pub fn vec_new(&self, items: Vec<Val>) -> Val {
        self.add_object(HostObject::Vec(items))
    }

    pub fn u256_value(&self, v: Val) -> U256 {
        u256_from_pieces(num::u256_from_val(self, v))
    }

    pub fn i256_value(&self, v: Val) -> I256 {
        i256_from_pieces(num::i256_from_val(self, v))
    }

    fn u256_val(&self, x: U256) -> Val {
        num::u256_to_val(self, u256_to_pieces(x))
    }

    fn i256_val(&self, x: I256) -> Val {
        num::i256_to_val(self, i256_to_pieces(x))
    }

    fn u256_checked(
        &self,
        lhs: Val,
        rhs: Val,
        f: impl FnOnce(U256, U256) -> Option<U256>,
    ) -> Result<Val, ErrorVal> {
        f(self.u256_value(lhs), self.u256_value(rhs))
            .map(|x| self.u256_val(x))
            .ok_or_else(ErrorVal::arith_domain)
    }

    fn i256_checked(
        &self,
        lhs: Val,
        rhs: Val,
        f: impl FnOnce(I256, I256) -> Option<I256>,
    ) -> Result<Val, ErrorVal> {
        f(self.i256_value(lhs), self.i256_value(rhs))
            .map(|x| self.i256_val(x))
            .ok_or_else(ErrorVal::arith_domain)
    }

    fn cmp_key(&self, v: Val) -> (u8, CmpKey) {
        let family = |small: Tag, object: Tag| v.has_tag(small) || v.has_tag(object);
        if family(Tag::U64Small, Tag::U64Object) {
            let x = num::u64_from_val(self, v);
            return (Tag::U64Object.as_u8(), CmpKey::Unsigned(U256::from(x)));
        }
        if family(Tag::I64Small, Tag::I64Object) {
            let x = num::i64_from_val(self, v);
            let wide = i256_from_i128((x >> 63) as u64, x as u64);
            return (Tag::I64Object.as_u8(), CmpKey::Signed(wide));
        }
        if family(Tag::TimepointSmall, Tag::TimepointObject) {
            let x = num::timepoint_from_val(self, v);
            return (Tag::TimepointObject.as_u8(), CmpKey::Unsigned(U256::from(x)));
        }
        if family(Tag::DurationSmall, Tag::DurationObject) {
            let x = num::duration_from_val(self, v);
            return (Tag::DurationObject.as_u8(), CmpKey::Unsigned(U256::from(x)));
        }
        if family(Tag::U128Small, Tag::U128Object) {
            let x = hostval::U128Val::from_val(v).to_limbs(self);
            let wide = U256::from_limbs([x.lo, x.hi, 0, 0]);
            return (Tag::U128Object.as_u8(), CmpKey::Unsigned(wide));
        }
        if family(Tag::I128Small, Tag::I128Object) {
            let x = hostval::I128Val::from_val(v).to_limbs(self);
            return (Tag::I128Object.as_u8(), CmpKey::Signed(i256_from_i128(x.hi, x.lo)));
        }
        if family(Tag::U256Small, Tag::U256Object) {
            return (Tag::U256Object.as_u8(), CmpKey::Unsigned(self.u256_value(v)));
        }
        if family(Tag::I256Small, Tag::I256Object) {
            return (Tag::I256Object.as_u8(), CmpKey::Signed(self.i256_value(v)));
        }
        if family(Tag::SymbolSmall, Tag::SymbolObject) {
            let text = if v.is_symbol_small() {
                v.to_symbol_small().to_str().as_bytes().to_vec()
            } else {
                match self.object(v, ObjectKind::Symbol) {
                    HostObject::Symbol(s) => s.into_bytes(),
                    _ => trap(Trap::TypeMismatch),
                }
            };
            return (Tag::SymbolObject.as_u8(), CmpKey::Text(text));
        }
        if v.is_object() {
            let key = match v.tag(self.version).and_then(Tag::object_kind) {
                Some(ObjectKind::Bytes) => match self.object(v, ObjectKind::Bytes) {
                    HostObject::Bytes(b) => CmpKey::Text(b),
                    _ => trap(Trap::TypeMismatch),
                },
                Some(ObjectKind::String) => match self.object(v, ObjectKind::String) {
                    HostObject::String(s) => CmpKey::Text(s.into_bytes()),
                    _ => trap(Trap::TypeMismatch),
                },
                Some(ObjectKind::Vec) => match self.object(v, ObjectKind::Vec) {
                    HostObject::Vec(items) => {
                        CmpKey::Seq(items.into_iter().map(Val::to_raw).collect())
                    }
                    _ => trap(Trap::TypeMismatch),
                },
                _ => CmpKey::Word(v.to_raw()),
            };
            return (v.tag_byte(), key);
        }
        (v.tag_byte(), CmpKey::Word(v.to_raw()))
    }
}

macro_rules! unwrap_object {
    ($self:ident, $v:expr, $kind:ident) => {
        match $self.object($v, ObjectKind::$kind) {
            HostObject::$kind(x) => x,
            _ => trap(Trap::TypeMismatch),
        }
    };
}

impl Host for MemHost {
    fn obj_from_u64(&self, v: u64) -> Val {
        self.add_object(HostObject::U64(v))
    }

    fn obj_to_u64(&self, obj: Val) -> u64 {
        unwrap_object!(self, obj, U64)
    }

    fn obj_from_i64(&self, v: i64) -> Val {
        self.add_object(HostObject::I64(v))
    }

    fn obj_to_i64(&self, obj: Val) -> i64 {
        unwrap_object!(self, obj, I64)
    }

    fn timepoint_obj_from_u64(&self, v: u64) -> Val {
        self.add_object(HostObject::Timepoint(v))
    }

    fn timepoint_obj_to_u64(&self, obj: Val) -> u64 {
        unwrap_object!(self, obj, Timepoint)
    }

    fn duration_obj_from_u64(&self, v: u64) -> Val {
        self.add_object(HostObject::Duration(v))
    }

    fn duration_obj_to_u64(&self, obj: Val) -> u64 {
        unwrap_object!(self, obj, Duration)
    }

    fn obj_from_u128_pieces(&self, hi: u64, lo: u64) -> Val {
        self.add_object(HostObject::U128((u128::from(hi) << 64) | u128::from(lo)))
    }

    fn obj_to_u128_lo64(&self, obj: Val) -> u64 {
        unwrap_object!(self, obj, U128) as u64
    }

    fn obj_to_u128_hi64(&self, obj: Val) -> u64 {
        (unwrap_object!(self, obj, U128) >> 64) as u64
    }

    fn obj_from_i128_pieces(&self, hi: i64, lo: u64) -> Val {
        self.add_object(HostObject::I128((i128::from(hi) << 64) | i128::from(lo)))
    }

    fn obj_to_i128_lo64(&self, obj: Val) -> u64 {
        unwrap_object!(self, obj, I128) as u64
    }

    fn obj_to_i128_hi64(&self, obj: Val) -> i64 {
        (unwrap_object!(self, obj, I128) >> 64) as i64
    }

    fn obj_from_u256_pieces(&self, hi_hi: u64, hi_lo: u64, lo_hi: u64, lo_lo: u64) -> Val {
        let x = u256_from_pieces(U256Pieces {
            hi_hi,
            hi_lo,
            lo_hi,
            lo_lo,
        });
        self.add_object(HostObject::U256(x))
    }

    fn obj_to_u256_hi_hi(&self, obj: Val) -> u64 {
        u256_to_pieces(unwrap_object!(self, obj, U256)).hi_hi
    }

    fn obj_to_u256_hi_lo(&self, obj: Val) -> u64 {
        u256_to_pieces(unwrap_object!(self, obj, U256)).hi_lo
    }

    fn obj_to_u256_lo_hi(&self, obj: Val) -> u64 {
        u256_to_pieces(unwrap_object!(self, obj, U256)).lo_hi
    }

    fn obj_to_u256_lo_lo(&self, obj: Val) -> u64 {
        u256_to_pieces(unwrap_object!(self, obj, U256)).lo_lo
    }

    fn obj_from_i256_pieces(&self, hi_hi: i64, hi_lo: u64, lo_hi: u64, lo_lo: u64) -> Val {
        let x = i256_from_pieces(I256Pieces {
            hi_hi,
            hi_lo,
            lo_hi,
            lo_lo,
        });
        self.add_object(HostObject::I256(x))
    }

    fn obj_to_i256_hi_hi(&self, obj: Val) -> i64 {
        i256_to_pieces(unwrap_object!(self, obj, I256)).hi_hi
    }

    fn obj_to_i256_hi_lo(&self, obj: Val) -> u64 {
        i256_to_pieces(unwrap_object!(self, obj, I256)).hi_lo
    }

    fn obj_to_i256_lo_hi(&self, obj: Val) -> u64 {
        i256_to_pieces(unwrap_object!(self, obj, I256)).lo_hi
    }

    fn obj_to_i256_lo_lo(&self, obj: Val) -> u64 {
        i256_to_pieces(unwrap_object!(self, obj, I256)).lo_lo
    }

    fn u256_add(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.u256_checked(lhs, rhs, U256::checked_add)
    }

    fn u256_sub(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.u256_checked(lhs, rhs, U256::checked_sub)
    }

    fn u256_mul(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.u256_checked(lhs, rhs, U256::checked_mul)
    }

    fn u256_div(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.u256_checked(lhs, rhs, U256::checked_div)
    }

    fn u256_rem_euclid(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.u256_checked(lhs, rhs, U256::checked_rem)
    }

    fn u256_pow(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
        self.u256_value(lhs)
            .checked_pow(U256::from(rhs))
            .map(|x| self.u256_val(x))
            .ok_or_else(ErrorVal::arith_domain)
    }

    fn u256_shl(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
        if rhs >= MAX_SHIFT_256 {
            return Err(ErrorVal::arith_domain());
        }
        Ok(self.u256_val(self.u256_value(lhs) << rhs as usize))
    }

    fn u256_shr(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
        if rhs >= MAX_SHIFT_256 {
            return Err(ErrorVal::arith_domain());
        }
        Ok(self.u256_val(self.u256_value(lhs) >> rhs as usize))
    }

    fn i256_add(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.i256_checked(lhs, rhs, I256::checked_add)
    }

    fn i256_sub(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.i256_checked(lhs, rhs, I256::checked_sub)
    }

    fn i256_mul(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.i256_checked(lhs, rhs, I256::checked_mul)
    }

    fn i256_div(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.i256_checked(lhs, rhs, I256::checked_div)
    }

    fn i256_rem_euclid(&self, lhs: Val, rhs: Val) -> Result<Val, ErrorVal> {
        self.i256_checked(lhs, rhs, I256::checked_rem_euclid)
    }

    fn i256_pow(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
        self.i256_value(lhs)
            .checked_pow(U256::from(rhs))
            .map(|x| self.i256_val(x))
            .ok_or_else(ErrorVal::arith_domain)
    }

    fn i256_shl(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
        if rhs >= MAX_SHIFT_256 {
            return Err(ErrorVal::arith_domain());
        }
        let raw = self.i256_value(lhs).into_raw() << rhs as usize;
        Ok(self.i256_val(I256::from_raw(raw)))
    }

    fn i256_shr(&self, lhs: Val, rhs: u32) -> Result<Val, ErrorVal> {
        if rhs >= MAX_SHIFT_256 {
            return Err(ErrorVal::arith_domain());
        }
        Ok(self.i256_val(self.i256_value(lhs).asr(rhs as usize)))
    }

    fn obj_cmp(&self, a: Val, b: Val) -> i64 {
        match self.cmp_key(a).cmp(&self.cmp_key(b)) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostval::trap::trap_code_of;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn trap_code<R>(f: impl FnOnce() -> R) -> i32 {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(_) => panic!("expected a trap"),
            Err(payload) => trap_code_of(payload.as_ref()),
        }
    }

    #[test]
    fn handles_are_allocated_in_order() {
        let host = MemHost::new();
        let a = host.obj_from_u64(u64::MAX);
        let b = host.obj_from_i64(i64::MIN);
        assert_eq!(a.object_handle(), 0);
        assert_eq!(b.object_handle(), 1);
        assert!(a.is_object_of(ObjectKind::U64));
        assert!(b.is_object_of(ObjectKind::I64));
        assert_eq!(host.obj_to_u64(a), u64::MAX);
        assert_eq!(host.obj_to_i64(b), i64::MIN);
        assert_eq!(host.object_count(), 2);
    }

    #[test]
    fn wrong_kind_traps() {
        let host = MemHost::new();
        let a = host.obj_from_u64(u64::MAX);
        let code = trap_code(|| host.obj_to_i64(a));
        assert_eq!(code, Trap::TypeMismatch.code());

        let dangling = Val::from_object(ObjectKind::U64, 7);
        let code = trap_code(|| host.obj_to_u64(dangling));
        assert_eq!(code, Trap::TypeMismatch.code());
    }

    #[test]
    fn u128_and_i128_pieces() {
        let host = MemHost::new();
        let u = host.obj_from_u128_pieces(0xDEAD, 0xBEEF);
        assert_eq!(host.obj_to_u128_hi64(u), 0xDEAD);
        assert_eq!(host.obj_to_u128_lo64(u), 0xBEEF);

        let i = host.obj_from_i128_pieces(-1, 5);
        assert_eq!(host.obj_to_i128_hi64(i), -1);
        assert_eq!(host.obj_to_i128_lo64(i), 5);
    }

    #[test]
    fn u256_results_are_canonical() {
        let host = MemHost::new();
        let two = Val::from_body(Tag::U256Small, 2);
        let three = Val::from_body(Tag::U256Small, 3);
        let sum = host.u256_add(two, three).unwrap();
        assert!(sum.has_tag(Tag::U256Small));
        assert_eq!(sum.body(), 5);
        assert_eq!(host.object_count(), 0);

        let big = host.u256_shl(two, 200).unwrap();
        assert!(big.has_tag(Tag::U256Object));
        assert_eq!(host.u256_value(big), U256::from(2u8) << 200usize);
    }

    #[test]
    fn u256_errors() {
        let host = MemHost::new();
        let zero = Val::from_body(Tag::U256Small, 0);
        let one = Val::from_body(Tag::U256Small, 1);
        assert!(host.u256_div(one, zero).unwrap_err().is_arith_domain());
        assert!(host.u256_sub(zero, one).unwrap_err().is_arith_domain());
        assert!(host.u256_shl(one, 256).unwrap_err().is_arith_domain());

        let max = host.u256_val(U256::MAX);
        assert!(host.u256_add(max, one).unwrap_err().is_arith_domain());
        assert!(host.u256_pow(max, 2).unwrap_err().is_arith_domain());
    }

    #[test]
    fn i256_signed_ops() {
        let host = MemHost::new();
        let minus_seven = Val::from_body(Tag::I256Small, (-7i64 as u64) & hostval::tag::BODY_MASK);
        let two = Val::from_body(Tag::I256Small, 2);

        let q = host.i256_div(minus_seven, two).unwrap();
        assert_eq!(q.signed_body(), -3);
        let r = host.i256_rem_euclid(minus_seven, two).unwrap();
        assert_eq!(r.signed_body(), 1);
        let s = host.i256_shr(minus_seven, 1).unwrap();
        assert_eq!(s.signed_body(), -4);

        let min = host.i256_val(I256::MIN);
        let minus_one = Val::from_body(Tag::I256Small, hostval::tag::BODY_MASK);
        assert!(host.i256_div(min, minus_one).unwrap_err().is_arith_domain());
        assert!(host.i256_sub(min, two).unwrap_err().is_arith_domain());
    }

    #[test]
    fn obj_cmp_orders_within_and_across_families() {
        let host = MemHost::new();
        let small = num::u64_to_val(&host, 5);
        let large = num::u64_to_val(&host, u64::MAX);
        assert_eq!(host.obj_cmp(small, large), -1);
        assert_eq!(host.obj_cmp(large, small), 1);
        assert_eq!(host.obj_cmp(large, host.obj_from_u64(u64::MAX)), 0);

        let neg = num::i64_to_val(&host, i64::MIN);
        let pos = num::i64_to_val(&host, 1);
        assert_eq!(host.obj_cmp(neg, pos), -1);

        assert_eq!(host.obj_cmp(large, neg), -1);
        assert_eq!(host.obj_cmp(Val::FALSE, large), -1);
    }

    #[test]
    fn exhausted_handle_space_is_internal() {
        assert_eq!(next_handle(7), 7);
        assert_eq!(next_handle(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(
            trap_code(|| next_handle(u32::MAX as usize + 1)),
            hostval::trap::HV_TRAP_INTERNAL
        );
    }

    #[test]
    fn obj_cmp_orders_bytes_strings_and_vecs_by_content() {
        let host = MemHost::new();
        let ab = host.bytes_new(b"ab");
        let abc = host.bytes_new(b"abc");
        let b = host.bytes_new(b"b");
        assert!(ab.is_object_of(ObjectKind::Bytes));
        assert_eq!(host.obj_cmp(ab, abc), -1);
        assert_eq!(host.obj_cmp(b, abc), 1);
        assert_eq!(host.obj_cmp(ab, host.bytes_new(b"ab")), 0);

        let hello = host.string_new("hello");
        let help = host.string_new("help");
        assert!(hello.is_object_of(ObjectKind::String));
        assert_eq!(host.obj_cmp(hello, help), -1);
        assert_eq!(host.obj_cmp(hello, host.string_new("hello")), 0);

        let one = Val::from_u32(1);
        let two = Val::from_u32(2);
        let short = host.vec_new(vec![one]);
        let long = host.vec_new(vec![one, two]);
        let other = host.vec_new(vec![two]);
        assert!(short.is_object_of(ObjectKind::Vec));
        assert_eq!(host.obj_cmp(short, long), -1);
        assert_eq!(host.obj_cmp(other, long), 1);
        assert_eq!(host.obj_cmp(long, host.vec_new(vec![one, two])), 0);
    }

    #[test]
    fn obj_cmp_separates_content_families_by_tag() {
        let host = MemHost::new();
        // Same bytes, different kinds: bytes (72) < string (73) < vec (75).
        let bytes = host.bytes_new(b"zz");
        let string = host.string_new("aa");
        let vec = host.vec_new(Vec::new());
        assert_eq!(host.obj_cmp(bytes, string), -1);
        assert_eq!(host.obj_cmp(string, bytes), 1);
        assert_eq!(host.obj_cmp(string, vec), -1);
        assert_eq!(host.obj_cmp(host.bytes_new(b"x"), host.string_new("x")), -1);
    }

    #[test]
    fn symbols_pick_small_form_when_possible() {
        let host = MemHost::new();
        let short = host.symbol_new("transfer");
        assert!(short.is_symbol_small());
        let long = host.symbol_new("a_much_longer_name");
        assert!(long.is_object_of(ObjectKind::Symbol));
        assert_eq!(host.obj_cmp(short, long), 1);

        let code = trap_code(|| host.symbol_new("not valid!"));
        assert_eq!(code, Trap::InvalidCharacter.code());
    }
}
