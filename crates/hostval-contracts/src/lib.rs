//! Shared, version-pinned protocol identifiers.
//!
//! These constants are the single source of truth for the protocol versions the
//! tag codec understands and for the schema strings that appear in
//! machine-readable `hvword` output.

mod protocol;

pub use protocol::{
    resolve_protocol_version, ProtocolFeatures, ProtocolVersion, ProtocolVersionParseError,
    ENV_PROTOCOL,
};

pub const HVWORD_DECODE_REPORT_SCHEMA_VERSION: &str = "hostval.hvword.decode@0.1.0";
pub const HVWORD_ENCODE_REPORT_SCHEMA_VERSION: &str = "hostval.hvword.encode@0.1.0";
pub const HVWORD_LIMB_REPORT_SCHEMA_VERSION: &str = "hostval.hvword.limb@0.1.0";

pub const SDK_VERSION_MAJOR: u8 = 0;
pub const SDK_VERSION_MINOR: u8 = 1;
pub const SDK_VERSION_PATCH: u8 = 0;

/// `(major << 16) | (minor << 8) | patch`
pub const SDK_VERSION: u32 = ((SDK_VERSION_MAJOR as u32) << 16)
    | ((SDK_VERSION_MINOR as u32) << 8)
    | (SDK_VERSION_PATCH as u32);

/// Host interface versions this SDK can talk to.
pub const MIN_PROTOCOL: u32 = 1;
pub const MAX_PROTOCOL: u32 = 2;

#[inline]
pub fn is_protocol_supported(version: u32) -> bool {
    (MIN_PROTOCOL..=MAX_PROTOCOL).contains(&version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_version_packs_fields() {
        assert_eq!(SDK_VERSION, 0x00_01_00);
    }

    #[test]
    fn supported_protocols_match_enum() {
        assert!(!is_protocol_supported(0));
        for v in [ProtocolVersion::V1, ProtocolVersion::V2] {
            assert!(is_protocol_supported(v.number()));
        }
        assert!(!is_protocol_supported(3));
    }
}
