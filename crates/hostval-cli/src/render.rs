use anyhow::{Context, Result};
use hostval::{U128Limbs, ValKind};
use serde_json::{json, Value};

/// Accepts `0x`-prefixed hex or decimal; `_` separators are ignored.
fn parse_radix(s: &str) -> (String, u32) {
    let s = s.trim().replace('_', "");
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex.to_string(), 16),
        None => (s, 10),
    }
}

pub fn parse_word(s: &str) -> Result<u64> {
    let (digits, radix) = parse_radix(s);
    u64::from_str_radix(&digits, radix).with_context(|| format!("invalid word {s:?}"))
}

pub fn parse_u128(s: &str) -> Result<u128> {
    let (digits, radix) = parse_radix(s);
    u128::from_str_radix(&digits, radix).with_context(|| format!("invalid u128 {s:?}"))
}

pub fn parse_i128(s: &str) -> Result<i128> {
    let t = s.trim();
    match t.strip_prefix('-') {
        Some(rest) => {
            let magnitude = parse_u128(rest)?;
            0i128
                .checked_sub_unsigned(magnitude)
                .with_context(|| format!("i128 out of range: {s:?}"))
        }
        None => {
            let v = parse_u128(t)?;
            i128::try_from(v).with_context(|| format!("i128 out of range: {s:?}"))
        }
    }
}

pub fn limbs(x: u128) -> U128Limbs {
    U128Limbs::new((x >> 64) as u64, x as u64)
}

pub fn limbs_value(x: U128Limbs) -> u128 {
    (u128::from(x.hi) << 64) | u128::from(x.lo)
}

pub fn hex64(x: u64) -> String {
    format!("{x:#018x}")
}

/// Short kind name and a JSON rendering of the decoded payload.
pub fn describe(kind: ValKind) -> (&'static str, Value) {
    match kind {
        ValKind::Bool(b) => ("bool", json!(b)),
        ValKind::Void => ("void", Value::Null),
        ValKind::Error(e) => (
            "error",
            json!({
                "type": e.error_type(),
                "code": e.code(),
                "host_code": e.host_code(),
            }),
        ),
        ValKind::U32(v) => ("u32", json!(v)),
        ValKind::I32(v) => ("i32", json!(v)),
        ValKind::U64Small(v) => ("u64", json!(v)),
        ValKind::I64Small(v) => ("i64", json!(v)),
        ValKind::TimepointSmall(v) => ("timepoint", json!(v)),
        ValKind::DurationSmall(v) => ("duration", json!(v)),
        ValKind::U128Small(v) => ("u128", json!(v)),
        ValKind::I128Small(v) => ("i128", json!(v)),
        ValKind::U256Small(v) => ("u256", json!(v)),
        ValKind::I256Small(v) => ("i256", json!(v)),
        ValKind::Symbol(sym) => ("symbol", json!(sym.to_str().to_string())),
        ValKind::LedgerKeyContractExecutable => ("ledger_key_contract_executable", Value::Null),
        ValKind::Object { kind, handle } => (
            "object",
            json!({
                "kind": kind,
                "handle": handle,
            }),
        ),
    }
}
