use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tag::{Tag, MINOR_MASK};
use crate::trap::{trap, Trap};
use crate::val::Val;

/// Subsystem an error value is attributed to. Occupies the low nibble of the
/// minor half of the body.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Contract = 0,
    WasmVm = 1,
    Context = 2,
    Storage = 3,
    Object = 4,
    Crypto = 5,
    Events = 6,
    Budget = 7,
    Value = 8,
    Auth = 9,
}

impl ErrorType {
    pub fn from_u8(raw: u8) -> Option<Self> {
        let ty = match raw {
            0 => ErrorType::Contract,
            1 => ErrorType::WasmVm,
            2 => ErrorType::Context,
            3 => ErrorType::Storage,
            4 => ErrorType::Object,
            5 => ErrorType::Crypto,
            6 => ErrorType::Events,
            7 => ErrorType::Budget,
            8 => ErrorType::Value,
            9 => ErrorType::Auth,
            _ => return None,
        };
        Some(ty)
    }
}

/// Host-defined error codes. Contract errors use arbitrary `u32` codes instead.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ArithDomain = 0,
    IndexBounds = 1,
    InvalidInput = 2,
    MissingValue = 3,
    ExistingValue = 4,
    ExceededLimit = 5,
    InvalidAction = 6,
    InternalError = 7,
    UnexpectedType = 8,
    UnexpectedSize = 9,
}

impl ErrorCode {
    pub fn from_u32(raw: u32) -> Option<Self> {
        let code = match raw {
            0 => ErrorCode::ArithDomain,
            1 => ErrorCode::IndexBounds,
            2 => ErrorCode::InvalidInput,
            3 => ErrorCode::MissingValue,
            4 => ErrorCode::ExistingValue,
            5 => ErrorCode::ExceededLimit,
            6 => ErrorCode::InvalidAction,
            7 => ErrorCode::InternalError,
            8 => ErrorCode::UnexpectedType,
            9 => ErrorCode::UnexpectedSize,
            _ => return None,
        };
        Some(code)
    }
}

/// An error value: a word tagged [`Tag::Error`] whose major half is the code
/// and whose minor half is the type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorVal {
    ty: ErrorType,
    code: u32,
}

impl ErrorVal {
    pub const fn new(ty: ErrorType, code: u32) -> Self {
        ErrorVal { ty, code }
    }

    pub const fn from_code(ty: ErrorType, code: ErrorCode) -> Self {
        ErrorVal::new(ty, code as u32)
    }

    /// The error every checked 128-bit operation reports on overflow.
    pub const fn arith_domain() -> Self {
        ErrorVal::from_code(ErrorType::Object, ErrorCode::ArithDomain)
    }

    pub fn error_type(self) -> ErrorType {
        self.ty
    }

    pub fn code(self) -> u32 {
        self.code
    }

    /// The host error code, when the type is not [`ErrorType::Contract`].
    pub fn host_code(self) -> Option<ErrorCode> {
        match self.ty {
            ErrorType::Contract => None,
            _ => ErrorCode::from_u32(self.code),
        }
    }

    pub fn is_arith_domain(self) -> bool {
        self == ErrorVal::arith_domain()
    }

    pub fn to_val(self) -> Val {
        Val::from_major_minor(Tag::Error, self.code, u32::from(self.ty as u8))
    }

    /// Decodes an error word. Traps on any other tag or an unknown type nibble.
    pub fn from_val(v: Val) -> Self {
        match ErrorVal::try_from_val(v) {
            Some(e) => e,
            None => trap(Trap::TypeMismatch),
        }
    }

    pub fn try_from_val(v: Val) -> Option<Self> {
        if v.tag_byte() != Tag::Error.as_u8() {
            return None;
        }
        let minor = v.minor() as u64 & MINOR_MASK;
        let ty = ErrorType::from_u8(u8::try_from(minor).ok()?)?;
        Some(ErrorVal::new(ty, v.major()))
    }
}

impl From<ErrorVal> for Val {
    fn from(e: ErrorVal) -> Val {
        e.to_val()
    }
}

impl fmt::Display for ErrorVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host_code() {
            Some(code) => write!(f, "Error({:?}, {:?})", self.ty, code),
            None => write!(f, "Error({:?}, #{})", self.ty, self.code),
        }
    }
}

impl std::error::Error for ErrorVal {}

/// Recoverable decoding failures, for callers that want to branch instead of
/// trapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unknown tag {tag:#04x} for protocol {version}")]
    UnknownTag { tag: u8, version: hostval_contracts::ProtocolVersion },
    #[error("invalid symbol character {ch:?}")]
    InvalidCharacter { ch: char },
    #[error("symbol is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("malformed body {body:#x} for {tag:?}")]
    MalformedBody { tag: Tag, body: u64 },
}

impl CodecError {
    /// The trap a fatal caller raises for this error.
    pub fn trap_kind(&self) -> Trap {
        match self {
            CodecError::InvalidCharacter { .. } => Trap::InvalidCharacter,
            CodecError::TooLong { .. } => Trap::TooLong,
            CodecError::UnknownTag { .. } | CodecError::MalformedBody { .. } => {
                Trap::TypeMismatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_word_layout() {
        let e = ErrorVal::new(ErrorType::Object, 7);
        let w = e.to_val().to_raw();
        assert_eq!(w & 0xff, 3);
        assert_eq!(w >> 32, 7);
        assert_eq!((w >> 8) & 0xff_ffff, 4);
        assert_eq!(ErrorVal::from_val(e.to_val()), e);
    }

    #[test]
    fn contract_codes_use_full_major() {
        let e = ErrorVal::new(ErrorType::Contract, u32::MAX);
        assert_eq!(ErrorVal::from_val(e.to_val()).code(), u32::MAX);
        assert_eq!(e.host_code(), None);
    }

    #[test]
    fn arith_domain_is_object_type() {
        let e = ErrorVal::arith_domain();
        assert_eq!(e.error_type(), ErrorType::Object);
        assert_eq!(e.host_code(), Some(ErrorCode::ArithDomain));
        assert!(e.is_arith_domain());
        assert_eq!(e.to_string(), "Error(Object, ArithDomain)");
    }

    #[test]
    fn non_error_word_is_rejected() {
        assert_eq!(ErrorVal::try_from_val(Val::VOID), None);
        let caught = std::panic::catch_unwind(|| ErrorVal::from_val(Val::from_u32(3)));
        let payload = caught.unwrap_err();
        assert_eq!(payload.downcast_ref::<Trap>(), Some(&Trap::TypeMismatch));
    }

    #[test]
    fn codec_errors_pick_their_trap() {
        let unknown = CodecError::UnknownTag {
            tag: 78,
            version: hostval_contracts::ProtocolVersion::V2,
        };
        assert_eq!(unknown.trap_kind(), Trap::TypeMismatch);
        let malformed = CodecError::MalformedBody { tag: Tag::True, body: 1 };
        assert_eq!(malformed.trap_kind(), Trap::TypeMismatch);
        assert_eq!(CodecError::TooLong { len: 10, max: 9 }.trap_kind(), Trap::TooLong);
        assert_eq!(CodecError::InvalidCharacter { ch: '!' }.trap_kind(), Trap::InvalidCharacter);
    }

    #[test]
    fn unknown_type_nibble_is_rejected() {
        let w = Val::from_major_minor(Tag::Error, 0, 0xf);
        assert_eq!(ErrorVal::try_from_val(w), None);
    }
}
