use std::fmt;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const ENV_PROTOCOL: &str = "HOSTVAL_PROTOCOL";

/// Host interface generation. Each generation fixes the tag table the codec
/// accepts; everything else about the word layout is shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    V1,
    #[default]
    V2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProtocolFeatures {
    /// Object tag for nonce ledger keys.
    pub ledger_key_nonce: bool,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 2] = [ProtocolVersion::V1, ProtocolVersion::V2];

    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolVersion::V1 => "v1",
            ProtocolVersion::V2 => "v2",
        }
    }

    pub fn number(self) -> u32 {
        match self {
            ProtocolVersion::V1 => 1,
            ProtocolVersion::V2 => 2,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "v1" | "1" => Some(ProtocolVersion::V1),
            "v2" | "2" => Some(ProtocolVersion::V2),
            _ => None,
        }
    }

    pub fn features(self) -> ProtocolFeatures {
        match self {
            ProtocolVersion::V1 => ProtocolFeatures {
                ledger_key_nonce: true,
            },
            ProtocolVersion::V2 => ProtocolFeatures {
                ledger_key_nonce: false,
            },
        }
    }

    /// Reads [`ENV_PROTOCOL`]; `Ok(None)` when unset.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        let Ok(raw) = std::env::var(ENV_PROTOCOL) else {
            return Ok(None);
        };
        let version = ProtocolVersion::from_str(&raw)
            .with_context(|| format!("invalid environment variable {ENV_PROTOCOL}={raw:?}"))?;
        Ok(Some(version))
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ProtocolVersionParseError {
    value: String,
}

impl fmt::Display for ProtocolVersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid protocol version {:?} (expected one of: v1, v2)",
            self.value
        )
    }
}

impl std::error::Error for ProtocolVersionParseError {}

impl FromStr for ProtocolVersion {
    type Err = ProtocolVersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        ProtocolVersion::parse(&s).ok_or(ProtocolVersionParseError { value: s })
    }
}

#[cfg(feature = "clap")]
impl clap::ValueEnum for ProtocolVersion {
    fn value_variants<'a>() -> &'a [Self] {
        &ProtocolVersion::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            ProtocolVersion::V1 => Some(clap::builder::PossibleValue::new("v1").alias("1")),
            ProtocolVersion::V2 => Some(clap::builder::PossibleValue::new("v2").alias("2")),
        }
    }
}

fn resolve_protocol_version_with_env(
    cli: Option<ProtocolVersion>,
    env: Option<ProtocolVersion>,
) -> ProtocolVersion {
    cli.or(env).unwrap_or_default()
}

/// Command line wins over [`ENV_PROTOCOL`], which wins over the default.
pub fn resolve_protocol_version(cli: Option<ProtocolVersion>) -> anyhow::Result<ProtocolVersion> {
    let env = ProtocolVersion::from_env()?;
    Ok(resolve_protocol_version_with_env(cli, env))
}
