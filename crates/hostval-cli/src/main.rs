use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hostval::{limb, num, Codec, I128Val, ProtocolVersion, SymbolSmall, U128Val, Val};
use hostval_contracts::{
    resolve_protocol_version, HVWORD_DECODE_REPORT_SCHEMA_VERSION,
    HVWORD_ENCODE_REPORT_SCHEMA_VERSION, HVWORD_LIMB_REPORT_SCHEMA_VERSION,
};
use hostval_mem_host::MemHost;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod render;

use render::{describe, hex64, limbs, limbs_value, parse_i128, parse_u128, parse_word};

const ENV_LOG: &str = "HOSTVAL_LOG";

#[derive(Parser)]
#[command(name = "hvword")]
#[command(about = "Inspect and build 64-bit host value words.", long_about = None)]
struct Cli {
    /// Tag table to use. Falls back to HOSTVAL_PROTOCOL, then v2.
    #[arg(long, value_enum, global = true)]
    protocol: Option<ProtocolVersion>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a raw word (hex with 0x, or decimal).
    Decode { word: String },
    /// Build the canonical word for a value.
    Encode {
        #[arg(value_enum)]
        kind: EncodeKind,
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
    },
    /// Run a raw limb operation on unsigned 128-bit operands.
    Limb {
        #[arg(value_enum)]
        op: LimbOp,
        a: String,
        b: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum EncodeKind {
    Bool,
    Void,
    U32,
    I32,
    U64,
    I64,
    Timepoint,
    Duration,
    U128,
    I128,
    Symbol,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum LimbOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Shl,
    Shr,
    And,
    Or,
    Xor,
    Sqrt,
    Not,
    Neg,
}

#[derive(Serialize)]
struct DecodeReport {
    schema_version: &'static str,
    command: &'static str,
    protocol: ProtocolVersion,
    word: String,
    ok: bool,
    tag_byte: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'static str>,
    body: String,
    major: u32,
    minor: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    exit_code: u8,
}

#[derive(Serialize)]
struct EncodeReport {
    schema_version: &'static str,
    command: &'static str,
    protocol: ProtocolVersion,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'static str>,
    small: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_handle: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    exit_code: u8,
}

#[derive(Serialize)]
struct LimbReport {
    schema_version: &'static str,
    command: &'static str,
    op: LimbOp,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lo: Option<String>,
    overflow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    exit_code: u8,
}

fn main() -> ExitCode {
    init_tracing();
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let protocol = resolve_protocol_version(cli.protocol)?;
    tracing::debug!(%protocol, "resolved protocol version");

    let exit_code = match cli.command {
        Command::Decode { word } => emit(&decode(protocol, &word)?)?,
        Command::Encode { kind, value } => emit(&encode(protocol, kind, value.as_deref())?)?,
        Command::Limb { op, a, b } => emit(&limb_op(op, &a, b.as_deref())?)?,
    };
    Ok(ExitCode::from(exit_code))
}

trait Report: Serialize {
    fn exit_code(&self) -> u8;
}

impl Report for DecodeReport {
    fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl Report for EncodeReport {
    fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl Report for LimbReport {
    fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

fn emit<R: Report>(report: &R) -> Result<u8> {
    println!("{}", serde_json::to_string(report)?);
    Ok(report.exit_code())
}

fn decode(protocol: ProtocolVersion, word: &str) -> Result<DecodeReport> {
    let v = Val::from_raw(parse_word(word)?);
    let tag = v.tag(protocol).map(|t| t.as_str());
    let mut report = DecodeReport {
        schema_version: HVWORD_DECODE_REPORT_SCHEMA_VERSION,
        command: "decode",
        protocol,
        word: hex64(v.to_raw()),
        ok: true,
        tag_byte: v.tag_byte(),
        tag,
        body: format!("{:#x}", v.body()),
        major: v.major(),
        minor: v.minor(),
        kind: None,
        value: serde_json::Value::Null,
        error: None,
        exit_code: 0,
    };
    match Codec::new(protocol).decode(v) {
        Ok(kind) => {
            let (name, value) = describe(kind);
            report.kind = Some(name);
            report.value = value;
        }
        Err(err) => {
            tracing::debug!(%err, "word does not decode");
            report.ok = false;
            report.error = Some(err.to_string());
            report.exit_code = 1;
        }
    }
    Ok(report)
}

fn required<'a>(kind: EncodeKind, value: Option<&'a str>) -> Result<&'a str> {
    value.with_context(|| format!("encode {kind:?} needs a value"))
}

fn encode(protocol: ProtocolVersion, kind: EncodeKind, value: Option<&str>) -> Result<EncodeReport> {
    let host = MemHost::with_version(protocol);
    let mut report = EncodeReport {
        schema_version: HVWORD_ENCODE_REPORT_SCHEMA_VERSION,
        command: "encode",
        protocol,
        ok: true,
        word: None,
        tag: None,
        small: true,
        object_handle: None,
        error: None,
        exit_code: 0,
    };

    let v = match kind {
        EncodeKind::Void => {
            if value.is_some() {
                bail!("encode void takes no value");
            }
            Val::VOID
        }
        EncodeKind::Bool => match required(kind, value)? {
            "true" => Val::TRUE,
            "false" => Val::FALSE,
            other => bail!("invalid bool {other:?}"),
        },
        EncodeKind::U32 => {
            let s = required(kind, value)?;
            Val::from_u32(s.parse().with_context(|| format!("invalid u32 {s:?}"))?)
        }
        EncodeKind::I32 => {
            let s = required(kind, value)?;
            Val::from_i32(s.parse().with_context(|| format!("invalid i32 {s:?}"))?)
        }
        EncodeKind::U64 | EncodeKind::Timepoint | EncodeKind::Duration => {
            let s = required(kind, value)?;
            let x: u64 = s.parse().with_context(|| format!("invalid u64 {s:?}"))?;
            match kind {
                EncodeKind::U64 => num::u64_to_val(&host, x),
                EncodeKind::Timepoint => num::timepoint_to_val(&host, x),
                _ => num::duration_to_val(&host, x),
            }
        }
        EncodeKind::I64 => {
            let s = required(kind, value)?;
            num::i64_to_val(&host, s.parse().with_context(|| format!("invalid i64 {s:?}"))?)
        }
        EncodeKind::U128 => {
            let x = parse_u128(required(kind, value)?)?;
            U128Val::from_limbs(&host, limbs(x)).to_val()
        }
        EncodeKind::I128 => {
            let x = parse_i128(required(kind, value)?)?;
            I128Val::from_limbs(&host, limbs(x as u128)).to_val()
        }
        EncodeKind::Symbol => match SymbolSmall::try_from_str(required(kind, value)?) {
            Ok(sym) => sym.to_val(),
            Err(err) => {
                report.ok = false;
                report.error = Some(err.to_string());
                report.exit_code = 1;
                return Ok(report);
            }
        },
    };

    report.word = Some(hex64(v.to_raw()));
    report.tag = v.tag(protocol).map(|t| t.as_str());
    if v.is_object() {
        report.small = false;
        report.object_handle = Some(v.object_handle());
    }
    Ok(report)
}

fn limb_op(op: LimbOp, a: &str, b: Option<&str>) -> Result<LimbReport> {
    let x = limbs(parse_u128(a)?);
    let rhs = || b.with_context(|| format!("limb {op:?} needs two operands"));
    let unary = matches!(op, LimbOp::Sqrt | LimbOp::Not | LimbOp::Neg);
    if unary && b.is_some() {
        bail!("limb {op:?} takes one operand");
    }

    let mut report = LimbReport {
        schema_version: HVWORD_LIMB_REPORT_SCHEMA_VERSION,
        command: "limb",
        op,
        ok: true,
        result: None,
        hi: None,
        lo: None,
        overflow: false,
        error: None,
        exit_code: 0,
    };

    let (r, overflow) = match op {
        LimbOp::Add => limb::overflowing_add(x, limbs(parse_u128(rhs()?)?)),
        LimbOp::Sub => limb::overflowing_sub(x, limbs(parse_u128(rhs()?)?)),
        LimbOp::Mul => limb::overflowing_mul(x, limbs(parse_u128(rhs()?)?)),
        LimbOp::Div | LimbOp::Rem => {
            let y = limbs(parse_u128(rhs()?)?);
            if y.is_zero() {
                report.ok = false;
                report.error = Some("division by zero".to_string());
                report.exit_code = 1;
                return Ok(report);
            }
            let (q, rem) = limb::div_rem(x, y);
            (if op == LimbOp::Div { q } else { rem }, false)
        }
        LimbOp::Pow => {
            let s = rhs()?;
            let e: i64 = s.parse().with_context(|| format!("invalid exponent {s:?}"))?;
            limb::overflowing_pow(x, e)
        }
        LimbOp::Shl | LimbOp::Shr => {
            let s = rhs()?;
            let n: u32 = s.parse().with_context(|| format!("invalid shift {s:?}"))?;
            let f = if op == LimbOp::Shl { limb::shl } else { limb::shr };
            (f(x, n), false)
        }
        LimbOp::And => (limb::and(x, limbs(parse_u128(rhs()?)?)), false),
        LimbOp::Or => (limb::or(x, limbs(parse_u128(rhs()?)?)), false),
        LimbOp::Xor => (limb::xor(x, limbs(parse_u128(rhs()?)?)), false),
        LimbOp::Sqrt => (limb::sqrt(x), false),
        LimbOp::Not => (limb::not(x), false),
        LimbOp::Neg => (limb::neg(x), false),
    };

    report.result = Some(limbs_value(r).to_string());
    report.hi = Some(hex64(r.hi));
    report.lo = Some(hex64(r.lo));
    report.overflow = overflow;
    Ok(report)
}
