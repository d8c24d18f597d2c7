//! The 64-bit tagged word and its decoded form.

use std::fmt;

use hostval_contracts::ProtocolVersion;

use crate::error::{CodecError, ErrorVal};
use crate::symbol::SymbolSmall;
use crate::tag::{
    ObjectKind, Tag, BODY_MASK, MAJOR_BITS, MAX_SMALL_I, MAX_SMALL_U, MINOR_MASK, MIN_SMALL_I,
    OBJECT_TAG_LOWER, TAG_BITS, TAG_MASK,
};
use crate::trap::{trap, Trap};

/// A tagged word. Copyable and immutable; object kinds hold a handle, never a
/// reference into host memory.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Val(u64);

impl Val {
    pub const FALSE: Val = Val::from_body(Tag::False, 0);
    pub const TRUE: Val = Val::from_body(Tag::True, 0);
    pub const VOID: Val = Val::from_body(Tag::Void, 0);
    pub const LEDGER_KEY_CONTRACT_EXECUTABLE: Val =
        Val::from_body(Tag::LedgerKeyContractExecutable, 0);

    #[inline]
    pub const fn from_raw(raw: u64) -> Val {
        Val(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// `body << 8 | tag`. The body must fit in 56 bits.
    #[inline]
    pub const fn from_body(tag: Tag, body: u64) -> Val {
        debug_assert!(body <= BODY_MASK);
        Val((body << TAG_BITS) | tag as u64)
    }

    #[inline]
    pub fn from_major_minor(tag: Tag, major: u32, minor: u32) -> Val {
        debug_assert!(u64::from(minor) <= MINOR_MASK);
        Val((u64::from(major) << MAJOR_BITS) | (u64::from(minor) << TAG_BITS) | tag as u64)
    }

    #[inline]
    pub const fn tag_byte(self) -> u8 {
        (self.0 & TAG_MASK) as u8
    }

    #[inline]
    pub fn tag(self, version: ProtocolVersion) -> Option<Tag> {
        Tag::from_u8(self.tag_byte(), version)
    }

    #[inline]
    pub fn has_tag(self, tag: Tag) -> bool {
        self.tag_byte() == tag.as_u8()
    }

    /// Logical shift: the unsigned body.
    #[inline]
    pub const fn body(self) -> u64 {
        self.0 >> TAG_BITS
    }

    /// Arithmetic shift: the body sign-extended from bit 55.
    #[inline]
    pub const fn signed_body(self) -> i64 {
        (self.0 as i64) >> TAG_BITS
    }

    #[inline]
    pub const fn major(self) -> u32 {
        (self.0 >> MAJOR_BITS) as u32
    }

    #[inline]
    pub const fn minor(self) -> u32 {
        ((self.0 >> TAG_BITS) & MINOR_MASK) as u32
    }

    #[inline]
    pub(crate) fn expect_tag(self, tag: Tag) {
        if !self.has_tag(tag) {
            trap(Trap::TypeMismatch);
        }
    }

    // --- bool / void ---

    #[inline]
    pub const fn from_bool(b: bool) -> Val {
        if b {
            Val::TRUE
        } else {
            Val::FALSE
        }
    }

    pub fn is_bool(self) -> bool {
        self == Val::TRUE || self == Val::FALSE
    }

    pub fn to_bool(self) -> bool {
        match self {
            Val::TRUE => true,
            Val::FALSE => false,
            _ => trap(Trap::TypeMismatch),
        }
    }

    pub fn is_void(self) -> bool {
        self == Val::VOID
    }

    // --- 32-bit ---

    #[inline]
    pub fn from_u32(v: u32) -> Val {
        Val::from_major_minor(Tag::U32Val, v, 0)
    }

    pub fn is_u32(self) -> bool {
        self.has_tag(Tag::U32Val)
    }

    pub fn to_u32(self) -> u32 {
        self.expect_tag(Tag::U32Val);
        self.major()
    }

    #[inline]
    pub fn from_i32(v: i32) -> Val {
        Val::from_major_minor(Tag::I32Val, v as u32, 0)
    }

    pub fn is_i32(self) -> bool {
        self.has_tag(Tag::I32Val)
    }

    pub fn to_i32(self) -> i32 {
        self.expect_tag(Tag::I32Val);
        ((self.0 as i64) >> MAJOR_BITS) as i32
    }

    // --- 56-bit small numerics ---

    /// Small unsigned form of `tag`, or `None` when `v` needs more than 56 bits.
    pub fn try_small_u64(tag: Tag, v: u64) -> Option<Val> {
        debug_assert!(tag.is_small());
        (v <= MAX_SMALL_U).then(|| Val::from_body(tag, v))
    }

    /// Small signed form of `tag`, or `None` outside the 56-bit signed range.
    pub fn try_small_i64(tag: Tag, v: i64) -> Option<Val> {
        debug_assert!(tag.is_small());
        (MIN_SMALL_I..=MAX_SMALL_I)
            .contains(&v)
            .then(|| Val::from_body(tag, (v as u64) & BODY_MASK))
    }

    pub fn small_u64(self, tag: Tag) -> u64 {
        self.expect_tag(tag);
        self.body()
    }

    pub fn small_i64(self, tag: Tag) -> i64 {
        self.expect_tag(tag);
        self.signed_body()
    }

    // --- objects ---

    pub fn from_object(kind: ObjectKind, handle: u32) -> Val {
        Val::from_major_minor(kind.tag(), handle, 0)
    }

    /// True for any word in the object tag range, whatever the protocol.
    pub fn is_object(self) -> bool {
        self.tag_byte() >= OBJECT_TAG_LOWER
    }

    pub fn is_object_of(self, kind: ObjectKind) -> bool {
        self.has_tag(kind.tag())
    }

    pub fn object_handle(self) -> u32 {
        if !self.is_object() {
            trap(Trap::TypeMismatch);
        }
        self.major()
    }

    pub fn decode(self, version: ProtocolVersion) -> Result<ValKind, CodecError> {
        Codec::new(version).decode(self)
    }
}

impl fmt::Debug for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Val({:#018x})", self.0)
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Val {
        Val::from_bool(b)
    }
}

impl From<u32> for Val {
    fn from(v: u32) -> Val {
        Val::from_u32(v)
    }
}

impl From<i32> for Val {
    fn from(v: i32) -> Val {
        Val::from_i32(v)
    }
}

/// Every shape a word can take under some protocol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValKind {
    Bool(bool),
    Void,
    Error(ErrorVal),
    U32(u32),
    I32(i32),
    U64Small(u64),
    I64Small(i64),
    TimepointSmall(u64),
    DurationSmall(u64),
    U128Small(u64),
    I128Small(i64),
    U256Small(u64),
    I256Small(i64),
    Symbol(SymbolSmall),
    LedgerKeyContractExecutable,
    Object { kind: ObjectKind, handle: u32 },
}

impl ValKind {
    pub fn to_val(self) -> Val {
        match self {
            ValKind::Bool(b) => Val::from_bool(b),
            ValKind::Void => Val::VOID,
            ValKind::Error(e) => e.to_val(),
            ValKind::U32(v) => Val::from_u32(v),
            ValKind::I32(v) => Val::from_i32(v),
            ValKind::U64Small(v) => Val::from_body(Tag::U64Small, v),
            ValKind::I64Small(v) => Val::from_body(Tag::I64Small, v as u64 & BODY_MASK),
            ValKind::TimepointSmall(v) => Val::from_body(Tag::TimepointSmall, v),
            ValKind::DurationSmall(v) => Val::from_body(Tag::DurationSmall, v),
            ValKind::U128Small(v) => Val::from_body(Tag::U128Small, v),
            ValKind::I128Small(v) => Val::from_body(Tag::I128Small, v as u64 & BODY_MASK),
            ValKind::U256Small(v) => Val::from_body(Tag::U256Small, v),
            ValKind::I256Small(v) => Val::from_body(Tag::I256Small, v as u64 & BODY_MASK),
            ValKind::Symbol(sym) => sym.to_val(),
            ValKind::LedgerKeyContractExecutable => Val::LEDGER_KEY_CONTRACT_EXECUTABLE,
            ValKind::Object { kind, handle } => Val::from_object(kind, handle),
        }
    }
}

/// Tag codec bound to one protocol version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    version: ProtocolVersion,
}

impl Codec {
    pub const fn new(version: ProtocolVersion) -> Self {
        Codec { version }
    }

    pub fn version(self) -> ProtocolVersion {
        self.version
    }

    pub fn tag_of(self, v: Val) -> Result<Tag, CodecError> {
        v.tag(self.version).ok_or(CodecError::UnknownTag {
            tag: v.tag_byte(),
            version: self.version,
        })
    }

    pub fn is_valid(self, v: Val) -> bool {
        self.decode(v).is_ok()
    }

    pub fn decode(self, v: Val) -> Result<ValKind, CodecError> {
        let tag = self.tag_of(v)?;
        let body = v.body();
        let malformed = || CodecError::MalformedBody { tag, body };
        let require_zero_body = |kind: ValKind| {
            if body == 0 {
                Ok(kind)
            } else {
                Err(malformed())
            }
        };
        let require_zero_minor = |kind: ValKind| {
            if v.minor() == 0 {
                Ok(kind)
            } else {
                Err(malformed())
            }
        };
        match tag {
            Tag::False => require_zero_body(ValKind::Bool(false)),
            Tag::True => require_zero_body(ValKind::Bool(true)),
            Tag::Void => require_zero_body(ValKind::Void),
            Tag::LedgerKeyContractExecutable => {
                require_zero_body(ValKind::LedgerKeyContractExecutable)
            }
            Tag::Error => ErrorVal::try_from_val(v)
                .map(ValKind::Error)
                .ok_or_else(malformed),
            Tag::U32Val => require_zero_minor(ValKind::U32(v.major())),
            Tag::I32Val => require_zero_minor(ValKind::I32(v.major() as i32)),
            Tag::U64Small => Ok(ValKind::U64Small(body)),
            Tag::I64Small => Ok(ValKind::I64Small(v.signed_body())),
            Tag::TimepointSmall => Ok(ValKind::TimepointSmall(body)),
            Tag::DurationSmall => Ok(ValKind::DurationSmall(body)),
            Tag::U128Small => Ok(ValKind::U128Small(body)),
            Tag::I128Small => Ok(ValKind::I128Small(v.signed_body())),
            Tag::U256Small => Ok(ValKind::U256Small(body)),
            Tag::I256Small => Ok(ValKind::I256Small(v.signed_body())),
            Tag::SymbolSmall => SymbolSmall::from_body(body).map(ValKind::Symbol),
            Tag::U64Object
            | Tag::I64Object
            | Tag::TimepointObject
            | Tag::DurationObject
            | Tag::U128Object
            | Tag::I128Object
            | Tag::U256Object
            | Tag::I256Object
            | Tag::BytesObject
            | Tag::StringObject
            | Tag::SymbolObject
            | Tag::VecObject
            | Tag::MapObject
            | Tag::AddressObject
            | Tag::LedgerKeyNonceObject => {
                let kind = tag.object_kind().ok_or_else(malformed)?;
                require_zero_minor(ValKind::Object {
                    kind,
                    handle: v.major(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trap_of<R>(f: impl FnOnce() -> R + std::panic::UnwindSafe) -> Trap {
        let payload = std::panic::catch_unwind(f).err().expect("expected a trap");
        *payload.downcast_ref::<Trap>().expect("trap payload")
    }

    #[test]
    fn encode_is_body_shift_or_tag() {
        let v = Val::from_body(Tag::U64Small, 0x1234);
        assert_eq!(v.to_raw(), 0x1234_06);
        assert_eq!(v.tag_byte(), 6);
        assert_eq!(v.body(), 0x1234);
    }

    #[test]
    fn bool_void_constants() {
        assert_eq!(Val::FALSE.to_raw(), 0);
        assert_eq!(Val::TRUE.to_raw(), 1);
        assert_eq!(Val::VOID.to_raw(), 2);
        assert!(Val::from(true).to_bool());
        assert!(!Val::from_bool(false).to_bool());
        assert!(Val::VOID.is_void());
        assert_eq!(trap_of(|| Val::VOID.to_bool()), Trap::TypeMismatch);
    }

    #[test]
    fn u32_i32_live_in_major() {
        let v = Val::from_u32(0xdead_beef);
        assert_eq!(v.to_raw(), 0xdead_beef_0000_0004);
        assert_eq!(v.to_u32(), 0xdead_beef);
        let v = Val::from_i32(-5);
        assert_eq!(v.to_i32(), -5);
        assert_eq!(Val::from_i32(i32::MIN).to_i32(), i32::MIN);
        assert_eq!(trap_of(|| Val::from_u32(1).to_i32()), Trap::TypeMismatch);
    }

    #[test]
    fn signed_small_decode_sign_extends() {
        let v = Val::try_small_i64(Tag::I64Small, -1).unwrap();
        assert_eq!(v.to_raw(), 0xffff_ffff_ffff_ff07);
        assert_eq!(v.small_i64(Tag::I64Small), -1);
        let v = Val::try_small_i64(Tag::I128Small, MIN_SMALL_I).unwrap();
        assert_eq!(v.small_i64(Tag::I128Small), MIN_SMALL_I);
        assert!(Val::try_small_i64(Tag::I64Small, MAX_SMALL_I + 1).is_none());
        assert!(Val::try_small_i64(Tag::I64Small, MIN_SMALL_I - 1).is_none());
    }

    #[test]
    fn unsigned_small_limit_is_56_bits() {
        assert!(Val::try_small_u64(Tag::U64Small, MAX_SMALL_U).is_some());
        assert!(Val::try_small_u64(Tag::U64Small, MAX_SMALL_U + 1).is_none());
        assert_eq!(
            Val::try_small_u64(Tag::TimepointSmall, 7)
                .unwrap()
                .small_u64(Tag::TimepointSmall),
            7
        );
    }

    #[test]
    fn object_handles_are_major() {
        let v = Val::from_object(ObjectKind::Vec, 42);
        assert!(v.is_object());
        assert!(v.is_object_of(ObjectKind::Vec));
        assert_eq!(v.object_handle(), 42);
        assert_eq!(trap_of(|| Val::VOID.object_handle()), Trap::TypeMismatch);
    }

    #[test]
    fn decode_is_exhaustive_and_round_trips() {
        let codec = Codec::new(ProtocolVersion::V1);
        let samples = [
            ValKind::Bool(true),
            ValKind::Bool(false),
            ValKind::Void,
            ValKind::Error(ErrorVal::arith_domain()),
            ValKind::U32(9),
            ValKind::I32(-9),
            ValKind::U64Small(MAX_SMALL_U),
            ValKind::I64Small(MIN_SMALL_I),
            ValKind::TimepointSmall(1),
            ValKind::DurationSmall(2),
            ValKind::U128Small(3),
            ValKind::I128Small(-4),
            ValKind::U256Small(5),
            ValKind::I256Small(-6),
            ValKind::Symbol(SymbolSmall::try_from_str("transfer").unwrap()),
            ValKind::LedgerKeyContractExecutable,
            ValKind::Object {
                kind: ObjectKind::LedgerKeyNonce,
                handle: 11,
            },
        ];
        for kind in samples {
            assert_eq!(codec.decode(kind.to_val()), Ok(kind));
        }
    }

    #[test]
    fn decode_rejects_unknown_and_malformed() {
        let v2 = Codec::new(ProtocolVersion::V2);
        let nonce = Val::from_object(ObjectKind::LedgerKeyNonce, 1);
        assert!(matches!(
            v2.decode(nonce),
            Err(CodecError::UnknownTag { tag: 78, .. })
        ));
        assert!(Codec::new(ProtocolVersion::V1).is_valid(nonce));

        assert!(v2.decode(Val::from_raw(0x20)).is_err());
        assert!(v2.decode(Val::from_raw(0x1_00)).is_err());
        assert!(v2.decode(Val::from_raw(0x1_04)).is_err());
        assert!(v2.decode(Val::from_raw(0x1_48)).is_err());
        for raw in 0..=u8::MAX {
            let v = Val::from_raw(u64::from(raw));
            assert_eq!(v2.is_valid(v), Tag::from_u8(raw, ProtocolVersion::V2).is_some());
        }
    }
}
