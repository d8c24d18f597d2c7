//! Tagged host values and 128-bit arithmetic for sandboxed contract code.
//!
//! Contract code and its host exchange single 64-bit words. A word carries an
//! 8-bit tag and a 56-bit body; small values live in the body, everything else
//! is a handle to an object the host owns.
//!
//! - [`tag`], [`val`], [`symbol`], [`error`]: the word codec.
//! - [`limb`]: unsigned 128-bit arithmetic on two 64-bit limbs.
//! - [`num`], [`val128`]: canonical small/object packing and the limb-backed
//!   checked surface.
//! - [`arith128`]: checked 128-bit arithmetic delegated to the host's 256-bit
//!   operations.
//! - [`host`]: the boundary trait.
//!
//! Recoverable failures are [`ErrorVal`]s. Broken preconditions [`trap`].

pub mod arith128;
pub mod error;
pub mod host;
pub mod limb;
pub mod num;
pub mod symbol;
pub mod tag;
pub mod trap;
pub mod val;
pub mod val128;

pub use error::{CodecError, ErrorCode, ErrorType, ErrorVal};
pub use host::Host;
pub use hostval_contracts::ProtocolVersion;
pub use limb::U128Limbs;
pub use symbol::{SymbolSmall, SymbolStr};
pub use tag::{ObjectKind, Tag};
pub use trap::{trap, Trap};
pub use val::{Codec, Val, ValKind};
pub use val128::{I128Val, U128Val};
