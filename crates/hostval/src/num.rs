//! Canonical packing for the 64-bit and 256-bit numeric kinds.
//!
//! Each kind has a small tag and an object tag. Packing always picks the small
//! form when the value fits the 56-bit body; unpacking accepts either.

use crate::host::Host;
use crate::tag::Tag;
use crate::trap::{trap, Trap};
use crate::val::Val;

fn small_u_or<H: Host + ?Sized>(
    host: &H,
    small: Tag,
    v: u64,
    make: fn(&H, u64) -> Val,
) -> Val {
    Val::try_small_u64(small, v).unwrap_or_else(|| make(host, v))
}

fn unpack_u<H: Host + ?Sized>(
    host: &H,
    v: Val,
    small: Tag,
    object: Tag,
    read: fn(&H, Val) -> u64,
) -> u64 {
    if v.has_tag(small) {
        v.body()
    } else if v.has_tag(object) {
        read(host, v)
    } else {
        trap(Trap::TypeMismatch)
    }
}

pub fn u64_to_val<H: Host + ?Sized>(host: &H, v: u64) -> Val {
    small_u_or(host, Tag::U64Small, v, H::obj_from_u64)
}

pub fn u64_from_val<H: Host + ?Sized>(host: &H, v: Val) -> u64 {
    unpack_u(host, v, Tag::U64Small, Tag::U64Object, H::obj_to_u64)
}

pub fn timepoint_to_val<H: Host + ?Sized>(host: &H, v: u64) -> Val {
    small_u_or(host, Tag::TimepointSmall, v, H::timepoint_obj_from_u64)
}

pub fn timepoint_from_val<H: Host + ?Sized>(host: &H, v: Val) -> u64 {
    unpack_u(
        host,
        v,
        Tag::TimepointSmall,
        Tag::TimepointObject,
        H::timepoint_obj_to_u64,
    )
}

pub fn duration_to_val<H: Host + ?Sized>(host: &H, v: u64) -> Val {
    small_u_or(host, Tag::DurationSmall, v, H::duration_obj_from_u64)
}

pub fn duration_from_val<H: Host + ?Sized>(host: &H, v: Val) -> u64 {
    unpack_u(
        host,
        v,
        Tag::DurationSmall,
        Tag::DurationObject,
        H::duration_obj_to_u64,
    )
}

pub fn i64_to_val<H: Host + ?Sized>(host: &H, v: i64) -> Val {
    Val::try_small_i64(Tag::I64Small, v).unwrap_or_else(|| host.obj_from_i64(v))
}

pub fn i64_from_val<H: Host + ?Sized>(host: &H, v: Val) -> i64 {
    if v.has_tag(Tag::I64Small) {
        v.signed_body()
    } else if v.has_tag(Tag::I64Object) {
        host.obj_to_i64(v)
    } else {
        trap(Trap::TypeMismatch)
    }
}

/// A 256-bit unsigned value as four 64-bit pieces, most significant first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct U256Pieces {
    pub hi_hi: u64,
    pub hi_lo: u64,
    pub lo_hi: u64,
    pub lo_lo: u64,
}

/// A 256-bit two's complement value; only the top piece carries the sign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct I256Pieces {
    pub hi_hi: i64,
    pub hi_lo: u64,
    pub lo_hi: u64,
    pub lo_lo: u64,
}

impl I256Pieces {
    /// The small body, when every upper piece is a sign extension of `lo_lo`
    /// and `lo_lo` fits the signed 56-bit range.
    fn as_small(self) -> Option<i64> {
        let lo = self.lo_lo as i64;
        let ext = if lo < 0 { u64::MAX } else { 0 };
        let upper_is_ext =
            self.hi_hi as u64 == ext && self.hi_lo == ext && self.lo_hi == ext;
        upper_is_ext.then_some(lo)
    }
}

pub fn u256_to_val<H: Host + ?Sized>(host: &H, p: U256Pieces) -> Val {
    let small = if p.hi_hi == 0 && p.hi_lo == 0 && p.lo_hi == 0 {
        Val::try_small_u64(Tag::U256Small, p.lo_lo)
    } else {
        None
    };
    small.unwrap_or_else(|| host.obj_from_u256_pieces(p.hi_hi, p.hi_lo, p.lo_hi, p.lo_lo))
}

pub fn u256_from_val<H: Host + ?Sized>(host: &H, v: Val) -> U256Pieces {
    if v.has_tag(Tag::U256Small) {
        U256Pieces {
            lo_lo: v.body(),
            ..U256Pieces::default()
        }
    } else if v.has_tag(Tag::U256Object) {
        U256Pieces {
            hi_hi: host.obj_to_u256_hi_hi(v),
            hi_lo: host.obj_to_u256_hi_lo(v),
            lo_hi: host.obj_to_u256_lo_hi(v),
            lo_lo: host.obj_to_u256_lo_lo(v),
        }
    } else {
        trap(Trap::TypeMismatch)
    }
}

pub fn i256_to_val<H: Host + ?Sized>(host: &H, p: I256Pieces) -> Val {
    p.as_small()
        .and_then(|lo| Val::try_small_i64(Tag::I256Small, lo))
        .unwrap_or_else(|| host.obj_from_i256_pieces(p.hi_hi, p.hi_lo, p.lo_hi, p.lo_lo))
}

pub fn i256_from_val<H: Host + ?Sized>(host: &H, v: Val) -> I256Pieces {
    if v.has_tag(Tag::I256Small) {
        let lo = v.signed_body();
        let ext = if lo < 0 { u64::MAX } else { 0 };
        I256Pieces {
            hi_hi: ext as i64,
            hi_lo: ext,
            lo_hi: ext,
            lo_lo: lo as u64,
        }
    } else if v.has_tag(Tag::I256Object) {
        I256Pieces {
            hi_hi: host.obj_to_i256_hi_hi(v),
            hi_lo: host.obj_to_i256_hi_lo(v),
            lo_hi: host.obj_to_i256_lo_hi(v),
            lo_lo: host.obj_to_i256_lo_lo(v),
        }
    } else {
        trap(Trap::TypeMismatch)
    }
}
