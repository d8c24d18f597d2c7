//! Fatal preconditions.
//!
//! A trap ends the current invocation; nothing after it runs and no partial
//! result is observable. In-process this is a panic whose payload is the
//! [`Trap`] itself, so a boundary layer can recover the code with
//! `downcast_ref::<Trap>()` and forward it to the host.

use std::fmt;

// Keep these in sync with the host's trap table.
pub const HV_TRAP_TYPE_MISMATCH: i32 = 9200;
pub const HV_TRAP_INVALID_CHARACTER: i32 = 9201;
pub const HV_TRAP_TOO_LONG: i32 = 9202;
pub const HV_TRAP_DIVISION_BY_ZERO: i32 = 9203;
pub const HV_TRAP_NEGATIVE_OPERAND: i32 = 9204;
pub const HV_TRAP_INTERNAL: i32 = 9299;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trap {
    /// A word did not carry the tag the operation requires.
    TypeMismatch,
    /// A symbol contained a character outside `[0-9A-Za-z_]`.
    InvalidCharacter,
    /// A symbol was longer than the small form allows.
    TooLong,
    /// Raw limb division or remainder with a zero divisor.
    DivisionByZero,
    /// A positive-only signed operation was handed a negative value.
    NegativeOperand,
    /// The host ran out of a resource it cannot report as an error value.
    Internal,
}

impl Trap {
    pub fn code(self) -> i32 {
        match self {
            Trap::TypeMismatch => HV_TRAP_TYPE_MISMATCH,
            Trap::InvalidCharacter => HV_TRAP_INVALID_CHARACTER,
            Trap::TooLong => HV_TRAP_TOO_LONG,
            Trap::DivisionByZero => HV_TRAP_DIVISION_BY_ZERO,
            Trap::NegativeOperand => HV_TRAP_NEGATIVE_OPERAND,
            Trap::Internal => HV_TRAP_INTERNAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trap::TypeMismatch => "type mismatch",
            Trap::InvalidCharacter => "invalid character",
            Trap::TooLong => "too long",
            Trap::DivisionByZero => "division by zero",
            Trap::NegativeOperand => "negative operand",
            Trap::Internal => "internal error",
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trap {}: {}", self.code(), self.as_str())
    }
}

impl std::error::Error for Trap {}

/// Aborts the invocation with `t`.
#[cold]
#[track_caller]
pub fn trap(t: Trap) -> ! {
    std::panic::panic_any(t)
}

/// Recovers the trap code from a panic payload; anything that is not a
/// [`Trap`] maps to [`HV_TRAP_INTERNAL`].
pub fn trap_code_of(payload: &(dyn std::any::Any + Send)) -> i32 {
    payload
        .downcast_ref::<Trap>()
        .map(|t| t.code())
        .unwrap_or(HV_TRAP_INTERNAL)
}
