//! Compact symbols: up to nine characters from `[0-9A-Za-z_]`, six bits each,
//! packed into the body with the first character in the most significant
//! position. Read from the low end, a zero code terminates the name.

use std::fmt;
use std::ops::Deref;

use crate::error::CodecError;
use crate::tag::{Tag, BODY_BITS};
use crate::trap::trap;
use crate::val::Val;

pub const MAX_SMALL_CHARS: usize = 9;
const CODE_BITS: u32 = 6;
const CODE_MASK: u64 = (1 << CODE_BITS) - 1;
/// Bits above the nine character slots must stay clear.
const SPARE_BITS: u32 = BODY_BITS - CODE_BITS * MAX_SMALL_CHARS as u32;

fn encode_char(ch: char) -> Result<u64, CodecError> {
    let code = match ch {
        '_' => 1,
        '0'..='9' => 2 + (ch as u64 - '0' as u64),
        'A'..='Z' => 12 + (ch as u64 - 'A' as u64),
        'a'..='z' => 38 + (ch as u64 - 'a' as u64),
        _ => return Err(CodecError::InvalidCharacter { ch }),
    };
    Ok(code)
}

fn decode_char(code: u64) -> Option<u8> {
    let ch = match code {
        1 => b'_',
        2..=11 => b'0' + (code - 2) as u8,
        12..=37 => b'A' + (code - 12) as u8,
        38..=63 => b'a' + (code - 38) as u8,
        _ => return None,
    };
    Some(ch)
}

/// Body of a [`Tag::SymbolSmall`] word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolSmall(u64);

impl SymbolSmall {
    pub fn try_from_str(s: &str) -> Result<Self, CodecError> {
        let len = s.chars().count();
        if len > MAX_SMALL_CHARS {
            return Err(CodecError::TooLong {
                len,
                max: MAX_SMALL_CHARS,
            });
        }
        let mut body = 0u64;
        for ch in s.chars() {
            body = (body << CODE_BITS) | encode_char(ch)?;
        }
        Ok(SymbolSmall(body))
    }

    /// Like [`SymbolSmall::try_from_str`] but traps on bad input.
    pub fn from_str_or_trap(s: &str) -> Self {
        match SymbolSmall::try_from_str(s) {
            Ok(sym) => sym,
            Err(err) => trap(err.trap_kind()),
        }
    }

    /// Validates a raw body taken from a word.
    pub fn from_body(body: u64) -> Result<Self, CodecError> {
        let malformed = CodecError::MalformedBody {
            tag: Tag::SymbolSmall,
            body,
        };
        if body >> (BODY_BITS - SPARE_BITS) != 0 {
            return Err(malformed);
        }
        let mut rest = body;
        while rest != 0 {
            if decode_char(rest & CODE_MASK).is_none() {
                return Err(malformed);
            }
            rest >>= CODE_BITS;
        }
        Ok(SymbolSmall(body))
    }

    pub fn body(self) -> u64 {
        self.0
    }

    pub fn to_val(self) -> Val {
        Val::from_body(Tag::SymbolSmall, self.0)
    }

    pub fn to_str(self) -> SymbolStr {
        let mut buf = [0u8; MAX_SMALL_CHARS];
        let mut len = 0;
        let mut rest = self.0;
        while rest != 0 {
            // from_body and try_from_str never admit a zero code mid-name.
            let Some(ch) = decode_char(rest & CODE_MASK) else {
                break;
            };
            buf[len] = ch;
            len += 1;
            rest >>= CODE_BITS;
        }
        buf[..len].reverse();
        SymbolStr { buf, len }
    }
}

/// A decoded small symbol, borrowed as `&str` without allocating.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolStr {
    buf: [u8; MAX_SMALL_CHARS],
    len: usize,
}

impl Deref for SymbolStr {
    type Target = str;

    fn deref(&self) -> &str {
        // Only ASCII from the symbol alphabet is ever written into buf.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl fmt::Display for SymbolStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl fmt::Debug for SymbolStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl Val {
    pub fn try_from_symbol_str(s: &str) -> Result<Val, CodecError> {
        SymbolSmall::try_from_str(s).map(SymbolSmall::to_val)
    }

    /// Traps with [`Trap::InvalidCharacter`](crate::Trap::InvalidCharacter) or
    /// [`Trap::TooLong`](crate::Trap::TooLong) on bad input.
    pub fn from_symbol_str(s: &str) -> Val {
        SymbolSmall::from_str_or_trap(s).to_val()
    }

    pub fn is_symbol_small(self) -> bool {
        self.has_tag(Tag::SymbolSmall)
    }

    pub fn to_symbol_small(self) -> SymbolSmall {
        self.expect_tag(Tag::SymbolSmall);
        match SymbolSmall::from_body(self.body()) {
            Ok(sym) => sym,
            Err(err) => trap(err.trap_kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Trap;

    #[test]
    fn encodes_right_aligned_six_bit_codes() {
        let sym = SymbolSmall::try_from_str("a").unwrap();
        assert_eq!(sym.body(), 38);
        let sym = SymbolSmall::try_from_str("_0").unwrap();
        assert_eq!(sym.body(), (1 << 6) | 2);
        assert_eq!(SymbolSmall::try_from_str("").unwrap().body(), 0);
    }

    #[test]
    fn round_trips_every_alphabet_char() {
        let alphabet = "_0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
        for ch in alphabet.chars() {
            let s = ch.to_string();
            let sym = SymbolSmall::try_from_str(&s).unwrap();
            assert_eq!(&*sym.to_str(), s.as_str());
        }
        let chars: Vec<char> = alphabet.chars().collect();
        for window in chars.chunks(MAX_SMALL_CHARS) {
            let s: String = window.iter().collect();
            let v = Val::try_from_symbol_str(&s).unwrap();
            assert_eq!(&*v.to_symbol_small().to_str(), s.as_str());
        }
    }

    #[test]
    fn nine_chars_fit_ten_do_not() {
        assert!(SymbolSmall::try_from_str("zzzzzzzzz").is_ok());
        assert_eq!(
            SymbolSmall::try_from_str("zzzzzzzzzz"),
            Err(CodecError::TooLong { len: 10, max: 9 })
        );
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        for bad in ["a-b", "sp ace", "é", "x.y", "$"] {
            let err = SymbolSmall::try_from_str(bad).unwrap_err();
            assert!(matches!(err, CodecError::InvalidCharacter { .. }), "{bad}");
        }
    }

    #[test]
    fn trapping_constructor_reports_kind() {
        let payload = std::panic::catch_unwind(|| Val::from_symbol_str("0123456789")).unwrap_err();
        assert_eq!(payload.downcast_ref::<Trap>(), Some(&Trap::TooLong));
        let payload = std::panic::catch_unwind(|| Val::from_symbol_str("a!")).unwrap_err();
        assert_eq!(payload.downcast_ref::<Trap>(), Some(&Trap::InvalidCharacter));
    }

    #[test]
    fn body_with_interior_zero_is_malformed() {
        let body = (38 << 12) | 38;
        assert!(SymbolSmall::from_body(body).is_err());
        assert!(SymbolSmall::from_body(1 << 54).is_err());
    }

    #[test]
    fn symbol_str_debug_is_quoted() {
        let sym = SymbolSmall::try_from_str("hello").unwrap();
        assert_eq!(format!("{:?}", sym.to_str()), "\"hello\"");
        assert_eq!(sym.to_str().to_string(), "hello");
    }
}
