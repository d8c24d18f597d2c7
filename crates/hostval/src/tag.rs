//! Tag table and word layout constants.
//!
//! A word is `body << TAG_BITS | tag`. The body is 56 bits and is further split
//! into a 32-bit `major` (high) and 24-bit `minor` (low) half for kinds that
//! carry two fields.

use hostval_contracts::ProtocolVersion;
use serde::{Deserialize, Serialize};

pub const TAG_BITS: u32 = 8;
pub const TAG_MASK: u64 = (1 << TAG_BITS) - 1;
pub const BODY_BITS: u32 = 64 - TAG_BITS;
pub const BODY_MASK: u64 = (1 << BODY_BITS) - 1;
pub const MINOR_BITS: u32 = 24;
pub const MINOR_MASK: u64 = (1 << MINOR_BITS) - 1;
pub const MAJOR_BITS: u32 = 32;

/// Largest body an unsigned small kind can carry.
pub const MAX_SMALL_U: u64 = BODY_MASK;
/// Signed small kinds carry a 56-bit two's complement body.
pub const MAX_SMALL_I: i64 = (1 << (BODY_BITS - 1)) - 1;
pub const MIN_SMALL_I: i64 = -(1 << (BODY_BITS - 1));

/// First tag value reserved for host objects.
pub const OBJECT_TAG_LOWER: u8 = 64;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    False = 0,
    True = 1,
    Void = 2,
    Error = 3,
    U32Val = 4,
    I32Val = 5,
    U64Small = 6,
    I64Small = 7,
    TimepointSmall = 8,
    DurationSmall = 9,
    U128Small = 10,
    I128Small = 11,
    U256Small = 12,
    I256Small = 13,
    SymbolSmall = 14,
    LedgerKeyContractExecutable = 15,

    U64Object = 64,
    I64Object = 65,
    TimepointObject = 66,
    DurationObject = 67,
    U128Object = 68,
    I128Object = 69,
    U256Object = 70,
    I256Object = 71,
    BytesObject = 72,
    StringObject = 73,
    SymbolObject = 74,
    VecObject = 75,
    MapObject = 76,
    AddressObject = 77,
    LedgerKeyNonceObject = 78,
}

impl Tag {
    /// Maps a raw tag byte to a tag known to `version`.
    pub fn from_u8(raw: u8, version: ProtocolVersion) -> Option<Tag> {
        let features = version.features();
        let tag = match raw {
            0 => Tag::False,
            1 => Tag::True,
            2 => Tag::Void,
            3 => Tag::Error,
            4 => Tag::U32Val,
            5 => Tag::I32Val,
            6 => Tag::U64Small,
            7 => Tag::I64Small,
            8 => Tag::TimepointSmall,
            9 => Tag::DurationSmall,
            10 => Tag::U128Small,
            11 => Tag::I128Small,
            12 => Tag::U256Small,
            13 => Tag::I256Small,
            14 => Tag::SymbolSmall,
            15 => Tag::LedgerKeyContractExecutable,
            64 => Tag::U64Object,
            65 => Tag::I64Object,
            66 => Tag::TimepointObject,
            67 => Tag::DurationObject,
            68 => Tag::U128Object,
            69 => Tag::I128Object,
            70 => Tag::U256Object,
            71 => Tag::I256Object,
            72 => Tag::BytesObject,
            73 => Tag::StringObject,
            74 => Tag::SymbolObject,
            75 => Tag::VecObject,
            76 => Tag::MapObject,
            77 => Tag::AddressObject,
            78 if features.ledger_key_nonce => Tag::LedgerKeyNonceObject,
            _ => return None,
        };
        Some(tag)
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_object(self) -> bool {
        self.as_u8() >= OBJECT_TAG_LOWER
    }

    #[inline]
    pub fn is_small(self) -> bool {
        !self.is_object()
    }

    pub fn object_kind(self) -> Option<ObjectKind> {
        let kind = match self {
            Tag::U64Object => ObjectKind::U64,
            Tag::I64Object => ObjectKind::I64,
            Tag::TimepointObject => ObjectKind::Timepoint,
            Tag::DurationObject => ObjectKind::Duration,
            Tag::U128Object => ObjectKind::U128,
            Tag::I128Object => ObjectKind::I128,
            Tag::U256Object => ObjectKind::U256,
            Tag::I256Object => ObjectKind::I256,
            Tag::BytesObject => ObjectKind::Bytes,
            Tag::StringObject => ObjectKind::String,
            Tag::SymbolObject => ObjectKind::Symbol,
            Tag::VecObject => ObjectKind::Vec,
            Tag::MapObject => ObjectKind::Map,
            Tag::AddressObject => ObjectKind::Address,
            Tag::LedgerKeyNonceObject => ObjectKind::LedgerKeyNonce,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::False => "false",
            Tag::True => "true",
            Tag::Void => "void",
            Tag::Error => "error",
            Tag::U32Val => "u32",
            Tag::I32Val => "i32",
            Tag::U64Small => "u64_small",
            Tag::I64Small => "i64_small",
            Tag::TimepointSmall => "timepoint_small",
            Tag::DurationSmall => "duration_small",
            Tag::U128Small => "u128_small",
            Tag::I128Small => "i128_small",
            Tag::U256Small => "u256_small",
            Tag::I256Small => "i256_small",
            Tag::SymbolSmall => "symbol_small",
            Tag::LedgerKeyContractExecutable => "ledger_key_contract_executable",
            Tag::U64Object => "u64_object",
            Tag::I64Object => "i64_object",
            Tag::TimepointObject => "timepoint_object",
            Tag::DurationObject => "duration_object",
            Tag::U128Object => "u128_object",
            Tag::I128Object => "i128_object",
            Tag::U256Object => "u256_object",
            Tag::I256Object => "i256_object",
            Tag::BytesObject => "bytes_object",
            Tag::StringObject => "string_object",
            Tag::SymbolObject => "symbol_object",
            Tag::VecObject => "vec_object",
            Tag::MapObject => "map_object",
            Tag::AddressObject => "address_object",
            Tag::LedgerKeyNonceObject => "ledger_key_nonce_object",
        }
    }
}

/// Kinds of host-resident objects a handle can denote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    U64,
    I64,
    Timepoint,
    Duration,
    U128,
    I128,
    U256,
    I256,
    Bytes,
    String,
    Symbol,
    Vec,
    Map,
    Address,
    LedgerKeyNonce,
}

impl ObjectKind {
    pub fn tag(self) -> Tag {
        match self {
            ObjectKind::U64 => Tag::U64Object,
            ObjectKind::I64 => Tag::I64Object,
            ObjectKind::Timepoint => Tag::TimepointObject,
            ObjectKind::Duration => Tag::DurationObject,
            ObjectKind::U128 => Tag::U128Object,
            ObjectKind::I128 => Tag::I128Object,
            ObjectKind::U256 => Tag::U256Object,
            ObjectKind::I256 => Tag::I256Object,
            ObjectKind::Bytes => Tag::BytesObject,
            ObjectKind::String => Tag::StringObject,
            ObjectKind::Symbol => Tag::SymbolObject,
            ObjectKind::Vec => Tag::VecObject,
            ObjectKind::Map => Tag::MapObject,
            ObjectKind::Address => Tag::AddressObject,
            ObjectKind::LedgerKeyNonce => Tag::LedgerKeyNonceObject,
        }
    }
}
